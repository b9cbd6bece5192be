//! Common error types for Keyfold.

use thiserror::Error;

/// Top-level error type for Keyfold operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Cipher engine construction or misuse (bad key/IV length, missing IV).
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// Final-block padding check failed: wrong key, or truncated or
    /// corrupted ciphertext.
    #[error("Decryption failed: {0}")]
    Decrypt(String),

    /// Failure inside the serialize/compress/encrypt chain (or its
    /// inverse), normalized to the cause's message.
    #[error("Document processing error: {0}")]
    Document(String),

    /// Vault operation failed.
    #[error("Vault error: {0}")]
    Vault(String),

    /// Invalid configuration input: file path, password, backend name.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for std::io::Error {
    /// Surface a Keyfold error through `std::io` trait impls.
    ///
    /// The stream adapters implement `std::io::Read`/`Write`, whose
    /// signatures only admit `std::io::Error`; the typed cause is kept
    /// as the error's source.
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_roundtrip_preserves_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::from(io);
        let back = std::io::Error::from(err);
        assert_eq!(back.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_decrypt_error_becomes_invalid_data() {
        let err = Error::Decrypt("invalid padding".to_string());
        let io = std::io::Error::from(err);
        assert_eq!(io.kind(), std::io::ErrorKind::InvalidData);
        assert!(io.to_string().contains("invalid padding"));
    }
}
