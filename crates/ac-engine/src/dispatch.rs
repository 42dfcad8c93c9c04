use std::str::FromStr;

use ac_core::security::input::{self, ValidationError};
use thiserror::Error;
use tracing::debug;

use crate::transaction::{AccountEngine, EngineError};

/// Account attributes the update operation knows how to rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Re-hash and replace the shadow password field.
    Password,
    /// Rename the account across all three stores and move its home.
    Username,
}

impl FromStr for Operation {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "password" => Ok(Self::Password),
            "username" => Ok(Self::Username),
            other => Err(DispatchError::UnsupportedOperation(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown account attribute {0:?} (expected \"password\" or \"username\")")]
    UnsupportedOperation(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Map an operation name onto the engine transaction it requires, after
/// checking the operation-specific preconditions. Nothing is read from
/// disk until every precondition has passed.
pub fn run(
    engine: &AccountEngine,
    attribute: &str,
    target: &str,
    value: &str,
) -> Result<(), DispatchError> {
    let operation = attribute.parse::<Operation>()?;
    input::validate_username(target)?;

    match operation {
        Operation::Password => {
            input::validate_plaintext_len(value)?;
            debug!(account = target, "dispatching password change");
            engine.change_password(target, value)?;
        }
        Operation::Username => {
            input::validate_username(value)?;
            debug!(from = target, to = value, "dispatching account rename");
            engine.rename_user(target, value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::StorePaths;
    use std::path::PathBuf;

    /// Engine pointed at paths that do not exist: any attempt to touch
    /// the store would surface as a read error, so a validation error
    /// proves the dispatcher rejected the request before any I/O.
    fn unreachable_engine() -> AccountEngine {
        AccountEngine::new(StorePaths {
            shadow: PathBuf::from("/nonexistent/shadow"),
            passwd: PathBuf::from("/nonexistent/passwd"),
            group: PathBuf::from("/nonexistent/group"),
        })
    }

    #[test]
    fn test_unknown_attribute_rejected_without_io() {
        match run(&unreachable_engine(), "shell", "alice", "/bin/zsh") {
            Err(DispatchError::UnsupportedOperation(name)) => assert_eq!(name, "shell"),
            other => panic!("expected unsupported operation, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_target_rejected_without_io() {
        match run(&unreachable_engine(), "password", "not a name", "secret") {
            Err(DispatchError::Validation(ValidationError::InvalidUsername(_))) => {}
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_overlong_plaintext_rejected_without_io() {
        let long = "p".repeat(input::MAX_PLAINTEXT_LEN + 1);
        match run(&unreachable_engine(), "password", "alice", &long) {
            Err(DispatchError::Validation(ValidationError::PlaintextTooLong(_))) => {}
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_replacement_username_rejected_without_io() {
        match run(&unreachable_engine(), "username", "alice", "Bob!") {
            Err(DispatchError::Validation(ValidationError::InvalidUsername(_))) => {}
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_operation_parse() {
        assert_eq!("password".parse::<Operation>().unwrap(), Operation::Password);
        assert_eq!("username".parse::<Operation>().unwrap(), Operation::Username);
        assert!("updateConfig".parse::<Operation>().is_err());
    }
}
