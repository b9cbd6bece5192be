//! The vault data model: named secret records and their collection.

use serde::{Deserialize, Serialize};

/// A single named secret record: site login, API token, key pair, note.
///
/// Every field is optional. The `name` acts as the lookup key within a
/// vault; an entry without a name is kept but cannot be retrieved by
/// key. Entries are value-like: editing is expected to clone, modify
/// the copy, and swap it back into the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Entry {
    /// Create an empty entry with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Ordered collection of entries.
///
/// Insertion order is preserved for stable display but carries no other
/// meaning. Name uniqueness is NOT enforced: lookups return the first
/// match. The inner vector is private; mutation goes through explicit
/// methods and lookups hand out owned copies, so callers never alias
/// the collection's own storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entries {
    entries: Vec<Entry>,
}

impl Entries {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, named or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry, preserving insertion order.
    ///
    /// Duplicate names are permitted; the earlier entry keeps winning
    /// lookups.
    pub fn add(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Owned copy of the first entry whose name matches exactly.
    ///
    /// Case-sensitive. Absence is not an error.
    pub fn get(&self, name: &str) -> Option<Entry> {
        self.entries
            .iter()
            .find(|e| e.name.as_deref() == Some(name))
            .cloned()
    }

    /// Remove and return the first entry whose name matches exactly.
    pub fn remove(&mut self, name: &str) -> Option<Entry> {
        let index = self
            .entries
            .iter()
            .position(|e| e.name.as_deref() == Some(name))?;
        Some(self.entries.remove(index))
    }

    /// All present names, in collection order. Never errors, possibly
    /// empty; unnamed entries are skipped.
    pub fn keys(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|e| e.name.clone())
            .collect()
    }

    /// Iterate entries in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl From<Vec<Entry>> for Entries {
    fn from(entries: Vec<Entry>) -> Self {
        Self { entries }
    }
}

impl FromIterator<Entry> for Entries {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Entries {
        let mut entries = Entries::new();
        entries.add(Entry {
            name: Some("github".to_string()),
            user: Some("alice".to_string()),
            password: Some("s3cr3t".to_string()),
            ..Entry::default()
        });
        entries.add(Entry::named("mail"));
        entries
    }

    #[test]
    fn test_get_returns_owned_copy() {
        let entries = sample();

        let mut copy = entries.get("github").unwrap();
        copy.password = Some("changed".to_string());

        // Mutating the copy leaves the collection untouched.
        assert_eq!(
            entries.get("github").unwrap().password.as_deref(),
            Some("s3cr3t")
        );
    }

    #[test]
    fn test_get_is_case_sensitive() {
        let entries = sample();

        assert!(entries.get("GitHub").is_none());
        assert!(entries.get("github").is_some());
    }

    #[test]
    fn test_duplicate_names_first_match_wins() {
        let mut entries = sample();
        let mut duplicate = Entry::named("github");
        duplicate.user = Some("bob".to_string());
        entries.add(duplicate);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries.get("github").unwrap().user.as_deref(), Some("alice"));

        // Removing peels off the first match only.
        entries.remove("github");
        assert_eq!(entries.get("github").unwrap().user.as_deref(), Some("bob"));
    }

    #[test]
    fn test_keys_skip_unnamed_entries() {
        let mut entries = sample();
        entries.add(Entry::default());

        assert_eq!(entries.keys(), vec!["github", "mail"]);
    }

    #[test]
    fn test_unnamed_entry_not_retrievable() {
        let mut entries = Entries::new();
        let mut entry = Entry::default();
        entry.notes = Some("orphan".to_string());
        entries.add(entry);

        assert_eq!(entries.len(), 1);
        assert!(entries.keys().is_empty());
    }

    #[test]
    fn test_json_shape() {
        let entries = sample();
        let json = serde_json::to_string(&entries).unwrap();

        // Absent fields are omitted entirely.
        assert!(json.contains("\"name\":\"github\""));
        assert!(!json.contains("token"));

        let back: Entries = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entries);
    }
}
