//! The Vault backend trait.

use std::path::Path;

use crate::entry::Entry;
use keyfold_common::Result;

/// Capability contract for a secrets store backend.
///
/// A backend is configured (`set_filename`, `set_password`), opened,
/// queried, optionally mutated and saved, then closed. Configuration is
/// validated eagerly: a bad path or password fails at configuration
/// time, not at `open`/`save` time.
///
/// Implementations hold mutable sequential state and are meant for one
/// logical session at a time; nothing here is safe to share across
/// threads without external synchronization.
pub trait Vault {
    /// Backend identifier (e.g. "file", "null").
    fn name(&self) -> &str;

    /// Whether this backend can persist changes.
    ///
    /// Read-only backends answer lookups but refuse mutation, and their
    /// `save`/`close` are no-ops.
    fn is_read_only(&self) -> bool;

    /// Configure the backing file path.
    ///
    /// # Preconditions
    /// - The path must exist and be readable; both are checked here,
    ///   before any cryptographic work
    ///
    /// # Errors
    /// - Configuration error for a missing or unreadable path
    fn set_filename(&mut self, path: &Path) -> Result<()>;

    /// Configure the vault password.
    ///
    /// Key bytes are derived immediately, so an unusable password fails
    /// fast here rather than surfacing later from `open` or `save`.
    ///
    /// # Errors
    /// - Configuration error for an empty password
    fn set_password(&mut self, password: &str) -> Result<()>;

    /// Load and decrypt the backing document into memory.
    ///
    /// # Errors
    /// - Vault error wrapping I/O or document-processing failures; a
    ///   failed open is terminal for the call and must be retried by
    ///   the caller (typically after prompting for another password)
    fn open(&mut self) -> Result<()>;

    /// Persist the in-memory entries to the backing store.
    ///
    /// # Errors
    /// - Vault error on I/O or codec failure
    fn save(&mut self) -> Result<()>;

    /// Release session resources: key material and decrypted entries.
    fn close(&mut self) -> Result<()>;

    /// Owned copy of the first entry whose name matches exactly
    /// (case-sensitive). Absence is not an error.
    fn entry(&self, name: &str) -> Option<Entry>;

    /// All present entry names, in collection order. Never errors,
    /// possibly empty.
    fn keys(&self) -> Vec<String>;

    /// Append an entry.
    ///
    /// # Errors
    /// - Vault error if the backend is read-only
    fn add_entry(&mut self, entry: Entry) -> Result<()>;

    /// Remove the first entry whose name matches exactly, returning it.
    ///
    /// # Errors
    /// - Vault error if the backend is read-only
    fn remove_entry(&mut self, name: &str) -> Result<Option<Entry>>;
}
