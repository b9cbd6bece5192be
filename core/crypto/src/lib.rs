//! Cryptographic primitives for Keyfold.
//!
//! This module provides:
//! - Key derivation using PBKDF2-HMAC-SHA256
//! - A streaming CBC block-cipher engine over AES-256
//! - Stream adapters that encrypt on write and decrypt on read
//! - Secure key management with automatic zeroization
//!
//! # Security Guarantees
//! - All key material is automatically zeroized on drop
//! - No plaintext or key material is ever logged
//! - Constant-time comparison for key equality
//!
//! # Limitations
//! - CBC mode provides confidentiality only. There is no authentication
//!   tag; tampering is detected only incidentally, via padding or
//!   downstream parse failures.

pub mod cbc;
pub mod kdf;
pub mod keys;
pub mod stream;

pub use cbc::{CbcDecryptor, CbcEncryptor, BLOCK_SIZE};
pub use kdf::derive_key;
pub use keys::{MasterKey, KEY_LENGTH};
pub use stream::{DecryptingReader, EncryptingWriter, IV_SIZE};
