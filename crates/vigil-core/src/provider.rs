//! Content retrieval at the revision boundary.
//!
//! The engine never talks to git or HTTP itself; it asks a
//! [`ContentProvider`] for `(revision, path)` pairs and treats absence as
//! data, not as an error.

use std::collections::HashMap;

use crate::errors::VigilError;

/// The sentinel revision meaning "working tree" for filesystem-backed
/// providers. An empty revision string means the same thing.
pub const WORKING_TREE: &str = ".";

/// The revision pair a run operates on.
#[derive(Debug, Clone)]
pub struct Refs {
    /// The old side of the comparison.
    pub base: String,
    /// The new side of the comparison.
    pub head: String,
}

impl Refs {
    pub fn new(base: impl Into<String>, head: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            head: head.into(),
        }
    }
}

/// Byte retrieval per `(revision, path)`.
///
/// Returns the content of `path` at `revision`, or `Ok(None)` if the file
/// does not exist at that revision. Absence must never be an error; only
/// I/O or authorization failures raise.
pub trait ContentProvider: Sync {
    fn fetch(&self, revision: &str, path: &str) -> Result<Option<String>, VigilError>;
}

/// Old/new content of one file. Either side may be absent (add/delete).
#[derive(Debug, Clone, Default)]
pub struct FileVersions {
    pub old: Option<String>,
    pub new: Option<String>,
}

impl FileVersions {
    pub fn new(old: Option<String>, new: Option<String>) -> Self {
        Self { old, new }
    }

    /// Both sides absent — always a no-op for every watch.
    pub fn is_empty(&self) -> bool {
        self.old.is_none() && self.new.is_none()
    }
}

/// In-memory provider for hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MapProvider {
    entries: HashMap<(String, String), String>,
}

impl MapProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register content for a `(revision, path)` pair.
    pub fn insert(
        &mut self,
        revision: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<String>,
    ) -> &mut Self {
        self.entries
            .insert((revision.into(), path.into()), content.into());
        self
    }
}

impl ContentProvider for MapProvider {
    fn fetch(&self, revision: &str, path: &str) -> Result<Option<String>, VigilError> {
        Ok(self
            .entries
            .get(&(revision.to_string(), path.to_string()))
            .cloned())
    }
}
