//! Personal knowledge graph (PKG) documents.
//!
//! The synthetic user's structured profile: identity, relationships,
//! behaviors, routines. Consumed as prompt context by the scenario engine
//! and served read-only over HTTP; nothing in this system writes them.

use crate::store::{self, StoreError};
use std::path::{Path, PathBuf};

/// Errors from PKG reads.
#[derive(Debug, thiserror::Error)]
pub enum PkgError {
    #[error("invalid PKG document name: {0}")]
    InvalidName(String),

    #[error("PKG document not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Read-only accessor for PKG documents.
#[derive(Debug, Clone)]
pub struct PkgStore {
    root: PathBuf,
}

impl PkgStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            root: data_dir.as_ref().to_path_buf(),
        }
    }

    fn dir(&self) -> PathBuf {
        self.root.join("pkg")
    }

    /// Read one PKG document by name (`identity`, `relationships`, ...).
    ///
    /// Names are path components only; anything that could traverse out of
    /// the PKG directory is rejected.
    pub async fn document(&self, name: &str) -> Result<serde_yaml::Value, PkgError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        {
            return Err(PkgError::InvalidName(name.to_string()));
        }
        match store::read_yaml(self.dir().join(format!("{name}.yaml"))).await {
            Ok(value) => Ok(value),
            Err(e) if e.is_not_found() => Err(PkgError::NotFound(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Names of every available PKG document.
    pub async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = match tokio::fs::read_dir(self.dir()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Io {
                    path: self.dir(),
                    source: e,
                })
            }
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| StoreError::Io {
            path: self.dir(),
            source: e,
        })? {
            let path = entry.path();
            if path.extension().map(|e| e == "yaml").unwrap_or(false) {
                if let Some(stem) = path.file_stem() {
                    names.push(stem.to_string_lossy().to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
