//! Key types with secure memory handling.
//!
//! Key material automatically zeroizes its memory on drop to prevent
//! sensitive data from persisting in memory.

use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of encryption keys in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// Master key derived from the vault password.
///
/// One master key exists per vault session. It is created when a vault
/// is opened or first saved, held only in memory, and never persisted.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    key: [u8; KEY_LENGTH],
}

impl MasterKey {
    /// Create a master key from raw bytes.
    ///
    /// # Postconditions
    /// - Returns a MasterKey that will zeroize on drop
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl PartialEq for MasterKey {
    /// Constant-time comparison to prevent timing attacks.
    fn eq(&self, other: &Self) -> bool {
        self.key.ct_eq(&other.key).into()
    }
}

impl Eq for MasterKey {}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasterKey([REDACTED])")
    }
}
