//! The document codec pipeline.
//!
//! Composes the three stream transforms in their fixed order: on the
//! write path an Entries collection is serialized to JSON, the JSON is
//! gzip-compressed, and the compressed bytes are CBC-encrypted into the
//! destination (IV first). The read path is the exact inverse.
//!
//! The layer order is security-relevant: compression runs before
//! encryption, since ciphertext does not compress.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::entry::Entries;
use keyfold_common::{Error, Result};
use keyfold_crypto::{DecryptingReader, EncryptingWriter, MasterKey};

/// Write an Entries document to `dest`.
///
/// With a key, the bytes written are the vault file format: a 16-byte
/// random IV followed by ciphertext. Without a key, the JSON document is
/// written as-is: the deliberate, explicitly-insecure plaintext export
/// mode used for interoperability.
///
/// # Postconditions
/// - The full adapter chain is finished inner-to-outer before returning,
///   so the final cipher block is always flushed
///
/// # Errors
/// - Any serialization, compression, encryption or I/O failure, raised
///   uniformly as a document-processing error carrying the cause's
///   message
pub fn write_document<W: Write>(
    entries: &Entries,
    dest: W,
    key: Option<&MasterKey>,
) -> Result<()> {
    write_inner(entries, dest, key).map_err(into_document_error)
}

fn write_inner<W: Write>(entries: &Entries, dest: W, key: Option<&MasterKey>) -> Result<()> {
    match key {
        None => {
            serde_json::to_writer_pretty(dest, entries)
                .map_err(|e| Error::Document(e.to_string()))?;
        }
        Some(key) => {
            let encryptor = EncryptingWriter::new(key.as_bytes(), dest)?;
            let mut compressor = GzEncoder::new(encryptor, Compression::default());

            serde_json::to_writer(&mut compressor, entries)
                .map_err(|e| Error::Document(e.to_string()))?;

            // Inner-to-outer: the compressor must emit its trailer into
            // the encryptor before the final cipher block is padded.
            let encryptor = compressor.finish()?;
            encryptor.finish()?;
        }
    }
    Ok(())
}

/// Read an Entries document from `source`.
///
/// Mirror of [`write_document`]: with a key the source must be in the
/// vault file format; without one it must be the plaintext JSON export.
///
/// # Errors
/// - Any failure (wrong key, truncated file, corrupt compression
///   stream, malformed JSON), raised uniformly as a document-processing
///   error. Callers must not assume the failing stage is identifiable.
pub fn read_document<R: Read>(source: R, key: Option<&MasterKey>) -> Result<Entries> {
    read_inner(source, key).map_err(into_document_error)
}

fn read_inner<R: Read>(source: R, key: Option<&MasterKey>) -> Result<Entries> {
    match key {
        None => {
            serde_json::from_reader(source).map_err(|e| Error::Document(e.to_string()))
        }
        Some(key) => {
            let decryptor = DecryptingReader::new(key.as_bytes(), source)?;
            let decompressor = GzDecoder::new(decryptor);
            serde_json::from_reader(decompressor).map_err(|e| Error::Document(e.to_string()))
        }
    }
}

/// Normalize every failure at the pipeline boundary to one error kind,
/// keeping the cause's message but not its type.
fn into_document_error(err: Error) -> Error {
    match err {
        Error::Document(_) => err,
        other => Error::Document(other.to_string()),
    }
}
