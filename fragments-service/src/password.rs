//! Salted password hashing (PBKDF2-HMAC-SHA256).
//!
//! Hashes are stored as PHC strings:
//! `$pbkdf2-sha256$i=<rounds>,l=32$<salt>$<hash>`.

use pbkdf2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::{Params, Pbkdf2};
use rand::RngCore;

const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

pub const DEFAULT_ROUNDS: u32 = 100_000;

pub fn hash_password(password: &str, rounds: u32) -> Result<String, password_hash::Error> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt)?;

    let params = Params {
        rounds: rounds.max(1),
        output_length: HASH_LEN,
    };
    let hash = Pbkdf2.hash_password_customized(password.as_bytes(), None, None, params, &salt)?;
    Ok(hash.to_string())
}

/// Check a candidate password against a stored hash. Malformed stored
/// hashes never verify.
pub fn verify_password(candidate: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Pbkdf2.verify_password(candidate.as_bytes(), &parsed).is_ok()
}
