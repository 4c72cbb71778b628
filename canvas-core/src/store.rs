//! Design persistence keyed by owner.
//!
//! Signed-in users own one saved design; anonymous visitors are keyed by
//! their session id. [`MemoryDesignStore`] keeps designs in process and
//! [`FileDesignStore`] writes one JSON file per owner.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::DesignDocument;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No design is saved for the owner.
    #[error("Design not found for {0}")]
    NotFound(String),
    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Who a saved design belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Owner {
    /// A signed-in user.
    User(String),
    /// An anonymous browser session.
    Session(String),
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user-{id}"),
            Self::Session(id) => write!(f, "session-{id}"),
        }
    }
}

/// Storage for in-progress designs.
pub trait DesignStore {
    /// Save (overwrite) the owner's design.
    ///
    /// # Errors
    ///
    /// Returns an error if the design cannot be written.
    fn save(&self, owner: &Owner, doc: &DesignDocument) -> Result<(), StoreError>;

    /// Load the owner's design.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if nothing is saved for the owner.
    fn load(&self, owner: &Owner) -> Result<DesignDocument, StoreError>;

    /// Delete the owner's design. Deleting a missing design is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the design exists but cannot be removed.
    fn delete(&self, owner: &Owner) -> Result<(), StoreError>;
}

/// Thread-safe in-memory design storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryDesignStore {
    designs: Arc<RwLock<HashMap<Owner, DesignDocument>>>,
}

impl MemoryDesignStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Owners with a saved design.
    #[must_use]
    pub fn owners(&self) -> Vec<Owner> {
        let designs = self
            .designs
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        designs.keys().cloned().collect()
    }
}

impl DesignStore for MemoryDesignStore {
    fn save(&self, owner: &Owner, doc: &DesignDocument) -> Result<(), StoreError> {
        let mut designs = self
            .designs
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        designs.insert(owner.clone(), doc.clone());
        Ok(())
    }

    fn load(&self, owner: &Owner) -> Result<DesignDocument, StoreError> {
        let designs = self
            .designs
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        designs
            .get(owner)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(owner.to_string()))
    }

    fn delete(&self, owner: &Owner) -> Result<(), StoreError> {
        let mut designs = self
            .designs
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        designs.remove(owner);
        Ok(())
    }
}

/// Filesystem design storage: one JSON file per owner.
#[derive(Debug, Clone)]
pub struct FileDesignStore {
    data_dir: PathBuf,
}

impl FileDesignStore {
    /// Create a store under `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    fn path_for(&self, owner: &Owner) -> PathBuf {
        self.data_dir
            .join(format!("{}.json", encode_filename(&owner.to_string())))
    }
}

impl DesignStore for FileDesignStore {
    fn save(&self, owner: &Owner, doc: &DesignDocument) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(doc)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let path = self.path_for(owner);
        std::fs::write(&path, json)?;
        tracing::debug!(%owner, path = %path.display(), "design saved");
        Ok(())
    }

    fn load(&self, owner: &Owner) -> Result<DesignDocument, StoreError> {
        let path = self.path_for(owner);
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(owner.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        DesignDocument::from_json(&contents).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn delete(&self, owner: &Owner) -> Result<(), StoreError> {
        let path = self.path_for(owner);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                tracing::warn!("Failed to delete design file {}: {e}", path.display());
                Err(e.into())
            }
        }
    }
}

/// Encode an owner key as a filename.
///
/// ASCII alphanumerics and `-` are kept; every other byte, `_` included,
/// becomes `_` plus two hex digits, so distinct keys never share a file.
fn encode_filename(key: &str) -> String {
    use std::fmt::Write as _;

    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' {
            out.push(char::from(b));
        } else {
            let _ = write!(out, "_{b:02x}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Canvas, Element};

    fn sample() -> DesignDocument {
        let mut doc = DesignDocument::new(Canvas::new(36.0, 24.0));
        doc.add_element(Element::text("Hello", "Arial", 0.5)).expect("add");
        doc
    }

    #[test]
    fn test_memory_save_load_delete() {
        let store = MemoryDesignStore::new();
        let owner = Owner::User("42".into());
        assert!(matches!(store.load(&owner), Err(StoreError::NotFound(_))));

        store.save(&owner, &sample()).expect("save");
        assert_eq!(store.load(&owner).expect("load").len(), 1);
        assert_eq!(store.owners(), vec![owner.clone()]);

        store.delete(&owner).expect("delete");
        assert!(store.load(&owner).is_err());
    }

    #[test]
    fn test_owners_are_distinct() {
        let store = MemoryDesignStore::new();
        store.save(&Owner::User("a".into()), &sample()).expect("save");
        assert!(store.load(&Owner::Session("a".into())).is_err());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileDesignStore::new(dir.path()).expect("store");
        let owner = Owner::Session("abc/../def".into());
        let doc = sample();

        store.save(&owner, &doc).expect("save");
        let loaded = store.load(&owner).expect("load");
        assert_eq!(loaded, doc);

        let files: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(Result::ok)
            .collect();
        assert_eq!(files.len(), 1);
        assert_eq!(
            files[0].file_name().to_string_lossy(),
            "session-abc_2f_2e_2e_2fdef.json"
        );

        store.delete(&owner).expect("delete");
        store.delete(&owner).expect("delete twice");
        assert!(matches!(store.load(&owner), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_encode_filename() {
        assert_eq!(encode_filename("user-1"), "user-1");
        assert_eq!(encode_filename("a b/c"), "a_20b_2fc");
        assert_eq!(encode_filename("a_b"), "a_5fb");
        assert_eq!(encode_filename("é"), "_c3_a9");
    }

    #[test]
    fn test_file_store_keeps_punctuation_owners_apart() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileDesignStore::new(dir.path()).expect("store");
        let spaced = Owner::Session("a b".into());
        let underscored = Owner::Session("a_b".into());

        let mut other = DesignDocument::new(Canvas::new(99.0, 1.0));
        other.add_element(Element::text("Other", "Arial", 0.5)).expect("add");
        store.save(&spaced, &other).expect("save");
        assert!(matches!(store.load(&underscored), Err(StoreError::NotFound(_))));

        store.save(&underscored, &sample()).expect("save");
        assert_eq!(store.load(&spaced).expect("load").canvas, Canvas::new(99.0, 1.0));
        assert_eq!(store.load(&underscored).expect("load").canvas, Canvas::new(36.0, 24.0));
    }
}
