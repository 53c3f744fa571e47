use crate::error::Result;
use crate::types::ContactRecord;
use serde::Deserialize;
use std::fs;
use tracing::debug;

pub const PLACEHOLDER_MANAGER: &str = "Unknown manager";
pub const PLACEHOLDER_EMAIL: &str = "unknown@example.com";
pub const PLACEHOLDER_PHONE: &str = "N/A";

/// Single-capability contact lookup. The host injects the implementation;
/// the pipeline never assumes where contact data comes from.
pub trait ContactSource: Send + Sync {
    /// Best-effort lookup by artist name. Never fails: a miss yields a
    /// placeholder record so composition can always proceed.
    fn resolve(&self, artist: &str) -> ContactRecord;
}

impl ContactRecord {
    /// Sentinel record returned when no contact is on file.
    pub fn placeholder(artist: &str) -> Self {
        Self {
            artist: artist.to_string(),
            manager: PLACEHOLDER_MANAGER.to_string(),
            email: PLACEHOLDER_EMAIL.to_string(),
            phone: PLACEHOLDER_PHONE.to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.manager == PLACEHOLDER_MANAGER
            && self.email == PLACEHOLDER_EMAIL
            && self.phone == PLACEHOLDER_PHONE
    }
}

/// Locally held contact table with case-insensitive exact matching.
#[derive(Debug, Default)]
pub struct InMemoryContactBook {
    contacts: Vec<ContactRecord>,
}

#[derive(Debug, Deserialize)]
struct ContactBookFile {
    #[serde(default)]
    contacts: Vec<ContactRecord>,
}

impl InMemoryContactBook {
    pub fn new(contacts: Vec<ContactRecord>) -> Self {
        Self { contacts }
    }

    /// Load a contact table from a TOML file with `[[contacts]]` entries.
    pub fn load_from(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let file: ContactBookFile = toml::from_str(&content)?;
        debug!(path, count = file.contacts.len(), "loaded contact book");
        Ok(Self::new(file.contacts))
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

impl ContactSource for InMemoryContactBook {
    fn resolve(&self, artist: &str) -> ContactRecord {
        self.contacts
            .iter()
            .find(|c| c.artist.eq_ignore_ascii_case(artist))
            .cloned()
            .unwrap_or_else(|| ContactRecord::placeholder(artist))
    }
}
