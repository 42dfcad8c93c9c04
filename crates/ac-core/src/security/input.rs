//! Strict allowlist-based validation for account names and password
//! plaintexts. Every external value that flows into a store line must
//! pass through here first; a rejected value never reaches the record
//! codec or the hasher.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Longest plaintext the password operation accepts, in bytes.
pub const MAX_PLAINTEXT_LEN: usize = 511;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid account name: {0:?}")]
    InvalidUsername(String),
    #[error("password too long: {0} bytes (limit {MAX_PLAINTEXT_LEN})")]
    PlaintextTooLong(usize),
}

/// Unix account name: lowercase letter or underscore first, then
/// lowercase alphanumerics, underscore or hyphen, 32 characters at most.
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_-]{0,31}$").unwrap());

pub fn validate_username(name: &str) -> Result<&str, ValidationError> {
    if !USERNAME_RE.is_match(name) {
        return Err(ValidationError::InvalidUsername(name.to_string()));
    }
    Ok(name)
}

pub fn validate_plaintext_len(plaintext: &str) -> Result<(), ValidationError> {
    if plaintext.len() > MAX_PLAINTEXT_LEN {
        return Err(ValidationError::PlaintextTooLong(plaintext.len()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("_daemon").is_ok());
        assert!(validate_username("build-agent").is_ok());
        assert!(validate_username("user_2").is_ok());
    }

    #[test]
    fn test_invalid_usernames() {
        assert!(validate_username("").is_err());
        assert!(validate_username("Alice").is_err());
        assert!(validate_username("2user").is_err());
        assert!(validate_username("user name").is_err());
        assert!(validate_username("user:colon").is_err());
        assert!(validate_username("user\nnewline").is_err());
        assert!(validate_username("../etc").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
    }

    #[test]
    fn test_username_length_boundary() {
        assert!(validate_username(&"a".repeat(32)).is_ok());
    }

    #[test]
    fn test_plaintext_length_ceiling() {
        assert!(validate_plaintext_len(&"p".repeat(MAX_PLAINTEXT_LEN)).is_ok());
        match validate_plaintext_len(&"p".repeat(MAX_PLAINTEXT_LEN + 1)) {
            Err(ValidationError::PlaintextTooLong(len)) => {
                assert_eq!(len, MAX_PLAINTEXT_LEN + 1)
            }
            other => panic!("expected length error, got {other:?}"),
        }
    }
}
