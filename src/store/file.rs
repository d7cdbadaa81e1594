use super::{validate_page_id, write_atomic, PageStore};
use crate::error::StorageError;
use crate::identity::BrandIdentity;
use crate::page::Page;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const PAGE_FILE: &str = "page.json";
const IDENTITY_FILE: &str = "identity.json";

/// Stores each page under `{root}/{page_id}/` as `page.json` plus `identity.json`.
pub struct FilePageStore {
    root: PathBuf,
}

impl FilePageStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to create pages directory {:?}: {}", root, e),
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, page_id: &str, file: &str) -> Result<PathBuf, StorageError> {
        validate_page_id(page_id)?;
        Ok(self.root.join(page_id).join(file))
    }

    fn read_document<T: DeserializeOwned>(
        &self,
        page_id: &str,
        file: &str,
    ) -> Result<Option<T>, StorageError> {
        let path = self.document_path(page_id, file)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StorageError::Serialization {
                target: path.display().to_string(),
                message: e.to_string(),
            })
    }

    fn write_document<T: Serialize>(
        &self,
        page_id: &str,
        file: &str,
        document: &T,
    ) -> Result<(), StorageError> {
        let path = self.document_path(page_id, file)?;
        let bytes = serde_json::to_vec_pretty(document)?;
        write_atomic(&path, &bytes)?;
        tracing::debug!(page_id, path = %path.display(), "Wrote document");
        Ok(())
    }
}

impl PageStore for FilePageStore {
    fn load_page(&self, page_id: &str) -> Result<Option<Page>, StorageError> {
        self.read_document(page_id, PAGE_FILE)
    }

    fn save_page(&self, page_id: &str, page: &Page) -> Result<(), StorageError> {
        self.write_document(page_id, PAGE_FILE, page)
    }

    fn load_identity(&self, page_id: &str) -> Result<Option<BrandIdentity>, StorageError> {
        self.read_document(page_id, IDENTITY_FILE)
    }

    fn save_identity(&self, page_id: &str, identity: &BrandIdentity) -> Result<(), StorageError> {
        self.write_document(page_id, IDENTITY_FILE, identity)
    }

    fn list_pages(&self) -> Result<Vec<String>, StorageError> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.path().join(PAGE_FILE).is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(id) => ids.push(id),
                Err(name) => {
                    tracing::warn!(name = ?name, "Skipping page directory with non-UTF8 name");
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}
