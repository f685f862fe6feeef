//! Cryptographic helpers for authentication.
//!
//! - PBKDF2-SHA256 password hashing, stored as a self-describing PHC string
//!   (`$pbkdf2-sha256$i=<rounds>,l=32$<salt>$<hash>`)
//! - Random session tokens and their SHA-256 storage hashes
//!
//! Uses pure Rust crates only.

use pbkdf2::{
    Params, Pbkdf2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use sha2::{Digest, Sha256};

use crate::ServiceError;

/// Default PBKDF2 iteration count. Fixed for the lifetime of a process.
pub const DEFAULT_PBKDF2_ROUNDS: u32 = 600_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;
const TOKEN_LEN: usize = 32;

// ── Password hashing ────────────────────────────────────────────────────────

/// Hash a password with a fresh random salt. Returns the PHC string.
pub fn hash_password(password: &str, rounds: u32) -> Result<String, ServiceError> {
    let mut salt = [0u8; SALT_LEN];
    getrandom::getrandom(&mut salt)
        .map_err(|e| ServiceError::Internal(format!("RNG failure: {e}")))?;
    let salt = SaltString::encode_b64(&salt)
        .map_err(|e| ServiceError::Internal(format!("salt encoding: {e}")))?;

    let params = Params {
        rounds,
        output_length: HASH_LEN,
    };
    let hash = Pbkdf2
        .hash_password_customized(password.as_bytes(), None, None, params, &salt)
        .map_err(|e| ServiceError::Internal(format!("password hashing: {e}")))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored PHC string.
///
/// The round count and salt come from the stored string, so hashes made
/// under an older cost setting keep verifying. Malformed input is a mismatch.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok()
}

// ── Tokens ──────────────────────────────────────────────────────────────────

/// Generate a secure random token (for session cookies). Returns hex-encoded.
pub fn generate_token() -> Result<String, ServiceError> {
    let mut bytes = [0u8; TOKEN_LEN];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| ServiceError::Internal(format!("RNG failure: {e}")))?;
    Ok(hex::encode(bytes))
}

/// Hash a token with SHA-256 for storage. Returns hex-encoded.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// 8-char uppercase alphanumeric invite code.
pub fn generate_invite_code() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..8].to_ascii_uppercase()
}
