//! Read-only null vault backend for testing.

use std::path::Path;

use crate::backend::Vault;
use crate::entry::Entry;
use keyfold_common::{Error, Result};

/// Backend with no storage at all.
///
/// Accepts any configuration, opens to an empty collection, refuses
/// mutation, and persists nothing. Useful as a stand-in where a Vault
/// is required but no real secrets should be touched.
#[derive(Debug, Default)]
pub struct NullVault;

impl NullVault {
    pub fn new() -> Self {
        Self
    }
}

impl Vault for NullVault {
    fn name(&self) -> &str {
        "null"
    }

    fn is_read_only(&self) -> bool {
        true
    }

    fn set_filename(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn set_password(&mut self, _password: &str) -> Result<()> {
        Ok(())
    }

    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn entry(&self, _name: &str) -> Option<Entry> {
        None
    }

    fn keys(&self) -> Vec<String> {
        Vec::new()
    }

    fn add_entry(&mut self, _entry: Entry) -> Result<()> {
        Err(Error::Vault("Null backend is read-only".to_string()))
    }

    fn remove_entry(&mut self, _name: &str) -> Result<Option<Entry>> {
        Err(Error::Vault("Null backend is read-only".to_string()))
    }
}
