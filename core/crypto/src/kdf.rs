//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! The vault file format stores no salt or key identifier, so the key
//! must be reproducible from the password alone. Derivation therefore
//! uses a fixed, built-in salt and round count: the same password always
//! yields the same key bytes, which is what lets a vault re-open.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::keys::{MasterKey, KEY_LENGTH};
use keyfold_common::{Error, Result};

/// Built-in derivation salt.
///
/// Fixed by the file format: no per-vault salt is written to disk.
pub const KDF_SALT: &[u8; 16] = b"keyfold.kdf.salt";

/// PBKDF2 iteration count.
pub const KDF_ROUNDS: u32 = 65_536;

/// Derive the vault master key from a password.
///
/// # Preconditions
/// - `password` must not be empty
///
/// # Postconditions
/// - Returns a MasterKey of KEY_LENGTH bytes
/// - The derived key is deterministic given the same password
///
/// # Errors
/// - Returns a configuration error if the password is empty
///
/// # Security
/// - The password is not stored or logged
/// - Derivation is intentionally slow (multi-round) to resist brute force
pub fn derive_key(password: &str) -> Result<MasterKey> {
    if password.is_empty() {
        return Err(Error::Config("Password cannot be empty".to_string()));
    }

    let mut key_bytes = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), KDF_SALT, KDF_ROUNDS, &mut key_bytes);

    Ok(MasterKey::from_bytes(key_bytes))
}
