//! Durable segment storage: one JSON document per segment kind.

use super::{Segment, SegmentKind, SegmentStore};
use crate::error::StorageError;
use std::fs;
use std::path::{Path, PathBuf};

pub trait SegmentStorage: Send + Sync {
    /// Load every stored segment.
    fn load_all(&self) -> Result<SegmentStore, StorageError>;

    /// Persist a segment, replacing any previous document for its kind.
    fn save(&self, segment: &Segment) -> Result<(), StorageError>;

    /// Remove the document for `kind`. Removing an absent document is not an error.
    fn delete(&self, kind: SegmentKind) -> Result<(), StorageError>;
}

/// Stores segments as `{root}/{kind}.json`, written atomically.
pub struct FileSegmentStorage {
    root: PathBuf,
}

impl FileSegmentStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to create segments directory {:?}: {}", root, e),
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn segment_path(&self, kind: SegmentKind) -> PathBuf {
        self.root.join(format!("{}.json", kind.as_str()))
    }
}

impl SegmentStorage for FileSegmentStorage {
    fn load_all(&self) -> Result<SegmentStore, StorageError> {
        let mut store = SegmentStore::new();
        for kind in SegmentKind::ALL {
            let path = self.segment_path(kind);
            if !path.exists() {
                continue;
            }
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read segment document, skipping"
                    );
                    continue;
                }
            };
            match serde_json::from_str::<Segment>(&content) {
                Ok(segment) if segment.kind == kind => {
                    store.insert(kind, segment);
                }
                Ok(segment) => {
                    tracing::warn!(
                        path = %path.display(),
                        expected = %kind,
                        found = %segment.kind,
                        "Segment document kind does not match its file name, skipping"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to parse segment document, skipping"
                    );
                }
            }
        }
        Ok(store)
    }

    fn save(&self, segment: &Segment) -> Result<(), StorageError> {
        let path = self.segment_path(segment.kind);
        let serialized =
            serde_json::to_vec_pretty(segment).map_err(|e| StorageError::Serialization {
                target: format!("segment {}", segment.kind),
                message: e.to_string(),
            })?;
        crate::store::write_atomic(&path, &serialized)
    }

    fn delete(&self, kind: SegmentKind) -> Result<(), StorageError> {
        let path = self.segment_path(kind);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::IoError(e)),
        }
    }
}
