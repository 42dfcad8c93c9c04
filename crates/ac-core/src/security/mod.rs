//! Input validation for values that end up inside account-store records.

pub mod input;
