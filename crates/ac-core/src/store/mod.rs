pub mod models;
pub mod parser;

pub use models::{GroupRecord, PasswdRecord, ShadowRecord, StoreKind};
