//! Orchestration for account-store mutations: the transaction engine that
//! runs the read-decide-write passes, and the dispatcher that maps
//! operation names onto them.

pub mod dispatch;
pub mod paths;
pub mod transaction;

pub use dispatch::{DispatchError, Operation};
pub use paths::StorePaths;
pub use transaction::{AccountEngine, EngineError};
