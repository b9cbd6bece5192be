//! Vault engine for Keyfold.
//!
//! This module provides:
//! - The Entry/Entries secrets data model
//! - The document codec pipeline (serialize, compress, encrypt)
//! - The Vault backend abstraction and its implementations
//! - A registry resolving backend names to instances
//!
//! # Architecture
//! The vault module sits between the user interface and the crypto
//! primitives, handling all encryption/decryption transparently: an
//! in-memory Entries collection is serialized to JSON, gzip-compressed
//! and CBC-encrypted on save, and the exact inverse runs on open.

pub mod backend;
pub mod document;
pub mod entry;
pub mod file;
pub mod null;
pub mod registry;

pub use backend::Vault;
pub use document::{read_document, write_document};
pub use entry::{Entries, Entry};
pub use file::FileVault;
pub use null::NullVault;
pub use registry::{create_default_registry, BackendFactory, BackendRegistry};
