//! Storage locations for pages, identities and cached segments.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base directory; relative paths resolve against the workspace root.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Defaults to `{data_dir}/pages`.
    #[serde(default)]
    pub pages_dir: Option<PathBuf>,
    /// Defaults to `{data_dir}/segments`.
    #[serde(default)]
    pub segments_dir: Option<PathBuf>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".pagecraft")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            pages_dir: None,
            segments_dir: None,
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.data_dir.as_os_str().is_empty() {
            return Err("Data directory cannot be empty".to_string());
        }
        for (name, dir) in [("pages_dir", &self.pages_dir), ("segments_dir", &self.segments_dir)] {
            if dir.as_ref().is_some_and(|d| d.as_os_str().is_empty()) {
                return Err(format!("{} cannot be empty when set", name));
            }
        }
        Ok(())
    }

    pub fn data_path(&self, workspace_root: &Path) -> PathBuf {
        workspace_root.join(&self.data_dir)
    }

    pub fn pages_path(&self, workspace_root: &Path) -> PathBuf {
        match &self.pages_dir {
            Some(dir) => workspace_root.join(dir),
            None => self.data_path(workspace_root).join("pages"),
        }
    }

    pub fn segments_path(&self, workspace_root: &Path) -> PathBuf {
        match &self.segments_dir {
            Some(dir) => workspace_root.join(dir),
            None => self.data_path(workspace_root).join("segments"),
        }
    }
}
