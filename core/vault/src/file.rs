//! Encrypted-file vault backend.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::backend::Vault;
use crate::document::{read_document, write_document};
use crate::entry::{Entries, Entry};
use keyfold_common::{Error, Result};
use keyfold_crypto::{derive_key, MasterKey};

/// Vault backed by an encrypted file on the local filesystem.
///
/// The file layout is a 16-byte random IV followed by CBC ciphertext
/// that decrypts to a gzip stream containing the JSON entries document.
/// The master key lives only for the session: it is derived when the
/// password is configured and dropped (zeroized) on `close`.
#[derive(Default)]
pub struct FileVault {
    path: Option<PathBuf>,
    key: Option<MasterKey>,
    entries: Entries,
}

impl FileVault {
    /// Create an unconfigured file vault.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the entries as plaintext JSON, with no encryption or
    /// compression.
    ///
    /// # Security
    /// Explicitly unsafe: everything in the vault, passwords included,
    /// leaves in the clear. Only for deliberate interoperability
    /// export.
    pub fn export_plaintext<W: Write>(&self, dest: W) -> Result<()> {
        write_document(&self.entries, dest, None)
    }

    /// Replace the in-memory entries from a plaintext JSON document.
    ///
    /// Counterpart of [`FileVault::export_plaintext`]; the imported
    /// entries are not persisted until `save`.
    pub fn import_plaintext<R: Read>(&mut self, source: R) -> Result<()> {
        self.entries = read_document(source, None)?;
        Ok(())
    }
}

impl Vault for FileVault {
    fn name(&self) -> &str {
        "file"
    }

    fn is_read_only(&self) -> bool {
        false
    }

    fn set_filename(&mut self, path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(Error::Config(format!(
                "Vault file does not exist: {}",
                path.display()
            )));
        }
        // Readability check up front; open() must not be the first to
        // discover a permission problem.
        File::open(path).map_err(|e| {
            Error::Config(format!("Vault file is not readable: {}: {}", path.display(), e))
        })?;

        self.path = Some(path.to_path_buf());
        Ok(())
    }

    fn set_password(&mut self, password: &str) -> Result<()> {
        self.key = Some(derive_key(password)?);
        Ok(())
    }

    fn open(&mut self) -> Result<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| Error::Config("No vault file configured".to_string()))?;
        let key = self
            .key
            .as_ref()
            .ok_or_else(|| Error::Config("No password configured".to_string()))?;

        debug!(path = %path.display(), "opening vault");

        let file = File::open(&path)
            .map_err(|e| Error::Vault(format!("Could not open vault file: {}", e)))?;

        // Wrong password, truncation and corruption all surface from the
        // codec as one document error; fold them into a single message
        // so the failing stage is not observable.
        self.entries = read_document(BufReader::new(file), Some(key))
            .map_err(|_| Error::Vault("Could not open vault: check password".to_string()))?;

        debug!(entries = self.entries.len(), "vault opened");
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| Error::Config("No vault file configured".to_string()))?;
        let key = self
            .key
            .as_ref()
            .ok_or_else(|| Error::Config("No password configured".to_string()))?;

        debug!(path = %path.display(), entries = self.entries.len(), "saving vault");

        let file = File::create(&path)
            .map_err(|e| Error::Vault(format!("Could not write vault file: {}", e)))?;

        write_document(&self.entries, BufWriter::new(file), Some(key))
            .map_err(|e| Error::Vault(format!("Could not save vault: {}", e)))
    }

    fn close(&mut self) -> Result<()> {
        // Dropping the key zeroizes it.
        self.key = None;
        self.entries.clear();
        Ok(())
    }

    fn entry(&self, name: &str) -> Option<Entry> {
        self.entries.get(name)
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys()
    }

    fn add_entry(&mut self, entry: Entry) -> Result<()> {
        self.entries.add(entry);
        Ok(())
    }

    fn remove_entry(&mut self, name: &str) -> Result<Option<Entry>> {
        Ok(self.entries.remove(name))
    }
}
