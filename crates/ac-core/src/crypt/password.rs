use chrono::Utc;
use rand::Rng;
use sha_crypt::{sha512_check, sha512_crypt_b64, Sha512Params};
use thiserror::Error;

/// SHA-512-crypt cost. 5000 is the scheme default, so serialized hashes
/// carry no `rounds=` prefix and stay `$6$<salt>$<digest>`.
const ROUNDS: usize = 5_000;

/// Crypt salts are capped at 16 characters.
const SALT_LEN: usize = 16;

const SALT_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    HashFailed(String),
    #[error("password contains a character that cannot appear in a shadow field: {0:?}")]
    ForbiddenCharacter(char),
}

/// Characters that would corrupt the colon-delimited shadow line or the
/// crypt setting string if they reached the hasher.
const FORBIDDEN_PLAINTEXT: [char; 4] = [':', '\n', '\r', '\0'];

/// Build a fresh crypt salt: the current Unix timestamp, padded with
/// random alphanumerics up to the salt cap. The timestamp prefix keeps
/// salts monotonically distinct across invocations; the padding keeps two
/// calls within the same second apart. Uniqueness is all that is needed
/// here, not unpredictability.
fn generate_salt() -> String {
    let mut salt = Utc::now().timestamp().to_string();
    let mut rng = rand::thread_rng();
    while salt.len() < SALT_LEN {
        salt.push(SALT_CHARS[rng.gen_range(0..SALT_CHARS.len())] as char);
    }
    salt
}

/// Hash a plaintext password into a `$6$<salt>$<digest>` shadow hash with
/// a freshly generated salt.
pub fn hash_password(plaintext: &str) -> Result<String, PasswordError> {
    for forbidden in FORBIDDEN_PLAINTEXT {
        if plaintext.contains(forbidden) {
            return Err(PasswordError::ForbiddenCharacter(forbidden));
        }
    }

    let params = Sha512Params::new(ROUNDS)
        .map_err(|e| PasswordError::HashFailed(format!("invalid params: {e:?}")))?;
    let salt = generate_salt();
    let digest = sha512_crypt_b64(plaintext.as_bytes(), salt.as_bytes(), &params)
        .map_err(|e| PasswordError::HashFailed(format!("{e:?}")))?;

    Ok(format!("$6${salt}${digest}"))
}

/// Check a plaintext against a `$6$` shadow hash.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    sha512_check(plaintext, hash).is_ok()
}
