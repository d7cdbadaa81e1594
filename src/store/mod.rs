//! Page Store
//!
//! Durable storage of pages and the brand identity they were generated for,
//! keyed by page id.

pub mod file;

pub use file::FilePageStore;

use crate::error::StorageError;
use crate::identity::BrandIdentity;
use crate::page::Page;
use std::fs;
use std::path::Path;

pub trait PageStore: Send + Sync {
    /// `Ok(None)` when no page is stored under `page_id`.
    fn load_page(&self, page_id: &str) -> Result<Option<Page>, StorageError>;
    fn save_page(&self, page_id: &str, page: &Page) -> Result<(), StorageError>;
    fn load_identity(&self, page_id: &str) -> Result<Option<BrandIdentity>, StorageError>;
    fn save_identity(&self, page_id: &str, identity: &BrandIdentity) -> Result<(), StorageError>;
    /// Ids of every stored page, sorted.
    fn list_pages(&self) -> Result<Vec<String>, StorageError>;
}

/// Page ids become directory names, so only a conservative character set is accepted.
pub fn validate_page_id(page_id: &str) -> Result<(), StorageError> {
    let valid = !page_id.is_empty()
        && page_id.len() <= 128
        && !page_id.starts_with('.')
        && page_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(page_id.to_string()))
    }
}

/// Write `bytes` to `path` through a sibling temp file and a rename, so readers
/// see either the old document or the new one.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to create parent directory {:?}: {}", parent, e),
            ))
        })?;
    }

    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_path = std::path::PathBuf::from(temp_name);

    fs::write(&temp_path, bytes).map_err(|e| {
        StorageError::IoError(std::io::Error::new(
            e.kind(),
            format!("Failed to write {:?}: {}", temp_path, e),
        ))
    })?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        StorageError::IoError(std::io::Error::new(
            e.kind(),
            format!("Failed to rename temp file to {:?}: {}", path, e),
        ))
    })?;
    Ok(())
}
