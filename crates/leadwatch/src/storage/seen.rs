//! Persisted set of already-evaluated post IDs.

use std::collections::HashSet;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::StoreError;

/// Post IDs that have already been evaluated.
///
/// Serialized as a plain JSON array of strings; order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeenSet {
    ids: HashSet<String>,
}

impl SeenSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an ID has been seen.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Mark an ID as seen. Returns `true` if it was not seen before.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    /// Number of seen IDs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate over the seen IDs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Check that every ID in `other` is also in `self`.
    #[must_use]
    pub fn is_superset(&self, other: &SeenSet) -> bool {
        self.ids.is_superset(&other.ids)
    }

    /// IDs sorted, the form written to disk.
    fn sorted(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.iter().collect();
        ids.sort_unstable();
        ids
    }
}

impl<S: Into<String>> FromIterator<S> for SeenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for SeenSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.ids.extend(iter.into_iter().map(Into::into));
    }
}

/// JSON file holding the [`SeenSet`] between runs.
#[derive(Debug, Clone)]
pub struct SeenStore {
    path: PathBuf,
}

impl SeenStore {
    /// Create a store backed by `path`. Nothing is read until [`SeenStore::load`].
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the seen set.
    ///
    /// A missing, unreadable, or malformed file yields an empty set. Losing the
    /// set only causes posts to be reported again, so this never fails.
    pub fn load(&self) -> SeenSet {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No seen file yet, starting empty");
                return SeenSet::default();
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Seen file unreadable, starting empty"
                );
                return SeenSet::default();
            }
        };

        if content.trim().is_empty() {
            return SeenSet::default();
        }

        match serde_json::from_str::<SeenSet>(&content) {
            Ok(seen) => {
                tracing::debug!(path = %self.path.display(), count = seen.len(), "Loaded seen set");
                seen
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Seen file malformed, starting empty"
                );
                SeenSet::default()
            }
        }
    }

    /// Replace the persisted set with `seen`.
    ///
    /// Writes a sibling temp file and renames it over the target, so readers
    /// see either the old or the new content. A symlinked path is followed and
    /// its target replaced; an existing file keeps its permissions.
    pub fn save(&self, seen: &SeenSet) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(&seen.sorted())?;

        let target = self.resolve_target()?;
        let parent = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;

        let mut tmp = NamedTempFile::new_in(parent).map_err(|e| StoreError::io(parent, e))?;
        match std::fs::metadata(&target) {
            Ok(meta) => tmp
                .as_file()
                .set_permissions(meta.permissions())
                .map_err(|e| StoreError::io(tmp.path(), e))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::io(&target, e)),
        }
        tmp.write_all(content.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&target)
            .map_err(|e| StoreError::io(&target, e.error))?;

        tracing::debug!(
            path = %self.path.display(),
            target = %target.display(),
            count = seen.len(),
            "Saved seen set"
        );
        Ok(())
    }

    /// The file a save should replace: the path itself, or where it links to.
    fn resolve_target(&self) -> Result<PathBuf, StoreError> {
        match std::fs::symlink_metadata(&self.path) {
            Ok(meta) if meta.file_type().is_symlink() => {
                if let Ok(resolved) = std::fs::canonicalize(&self.path) {
                    return Ok(resolved);
                }
                // Dangling link: the target does not exist yet.
                let link = std::fs::read_link(&self.path)
                    .map_err(|e| StoreError::io(&self.path, e))?;
                Ok(match self.path.parent() {
                    Some(dir) if link.is_relative() => dir.join(link),
                    _ => link,
                })
            }
            Ok(_) => Ok(self.path.clone()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(self.path.clone()),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }
}
