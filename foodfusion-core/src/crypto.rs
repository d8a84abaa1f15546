//! Password hashing
//!
//! Hashes are produced by `password-auth`, which encodes the algorithm and
//! parameters in the PHC string so stored hashes stay verifiable if the
//! defaults change.

use crate::{Error, error::CryptoError};

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let hash = password_auth::generate_hash(password);
    if hash.is_empty() {
        return Err(CryptoError::PasswordHash("empty hash produced".to_string()).into());
    }
    Ok(hash)
}

/// Check a password against a stored hash.
///
/// A malformed stored hash is treated as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match password_auth::verify_password(password, hash) {
        Ok(()) => true,
        Err(password_auth::VerifyError::PasswordInvalid) => false,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be parsed");
            false
        }
    }
}
