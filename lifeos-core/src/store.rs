//! Flat-file document store.
//!
//! Reads and writes the YAML/JSON documents that back every repository.
//! Reads distinguish a missing document from an unreadable one; writes go
//! through a same-directory temp file and a rename, so a crash mid-write
//! never corrupts the target.
//!
//! The store does no locking. It assumes a single logical writer per path
//! at a time, enforced by the caller (one server process, with handlers
//! awaiting each document operation before responding).

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error at {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("JSON error at {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// True if the error means the document simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

async fn read_file(path: &Path) -> Result<String, StoreError> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(StoreError::NotFound(path.to_path_buf()))
        }
        Err(e) => Err(StoreError::io(path, e)),
    }
}

/// Read and parse a YAML document.
pub async fn read_yaml<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, StoreError> {
    let path = path.as_ref();
    let content = read_file(path).await?;
    serde_yaml::from_str(&content).map_err(|e| StoreError::Yaml {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read and parse a JSON document.
pub async fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, StoreError> {
    let path = path.as_ref();
    let content = read_file(path).await?;
    serde_json::from_str(&content).map_err(|e| StoreError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Serialize a document as YAML and write it atomically.
pub async fn write_yaml<T: Serialize>(path: impl AsRef<Path>, data: &T) -> Result<(), StoreError> {
    let path = path.as_ref();
    let content = serde_yaml::to_string(data).map_err(|e| StoreError::Yaml {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_atomic(path, &content).await
}

/// Serialize a document as pretty JSON and write it atomically.
pub async fn write_json<T: Serialize>(path: impl AsRef<Path>, data: &T) -> Result<(), StoreError> {
    let path = path.as_ref();
    let content = serde_json::to_string_pretty(data).map_err(|e| StoreError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_atomic(path, &content).await
}

/// Delete a document. Missing documents surface as `NotFound`.
pub async fn remove(path: impl AsRef<Path>) -> Result<(), StoreError> {
    let path = path.as_ref();
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(StoreError::NotFound(path.to_path_buf()))
        }
        Err(e) => Err(StoreError::io(path, e)),
    }
}

async fn write_atomic(path: &Path, content: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent, e))?;
    }
    let tmp = temp_sibling(path);
    fs::write(&tmp, content)
        .await
        .map_err(|e| StoreError::io(&tmp, e))?;
    fs::rename(&tmp, path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    path.with_file_name(format!(
        ".{name}.{}.tmp",
        uuid::Uuid::new_v4().as_simple()
    ))
}

/// A serialized document written next to its destination but not yet visible.
///
/// Used by multi-document operations (restore) to make the whole batch land
/// or none of it: stage every document first, then commit renames them all.
#[derive(Debug)]
pub struct StagedWrite {
    tmp: PathBuf,
    dest: PathBuf,
}

/// Stage a YAML document for a later [`commit`].
pub async fn stage_yaml<T: Serialize>(
    path: impl AsRef<Path>,
    data: &T,
) -> Result<StagedWrite, StoreError> {
    let path = path.as_ref();
    let content = serde_yaml::to_string(data).map_err(|e| StoreError::Yaml {
        path: path.to_path_buf(),
        source: e,
    })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent, e))?;
    }
    let tmp = temp_sibling(path);
    fs::write(&tmp, content)
        .await
        .map_err(|e| StoreError::io(&tmp, e))?;
    Ok(StagedWrite {
        tmp,
        dest: path.to_path_buf(),
    })
}

/// Rename every staged document into place.
///
/// All serialization and disk writes have already happened by the time this
/// runs; the remaining renames are the cheapest step and the only one that
/// mutates live documents.
pub async fn commit(staged: Vec<StagedWrite>) -> Result<(), StoreError> {
    for write in staged {
        fs::rename(&write.tmp, &write.dest)
            .await
            .map_err(|e| StoreError::io(&write.dest, e))?;
    }
    Ok(())
}

/// Remove staged temp files without applying them.
pub async fn discard(staged: Vec<StagedWrite>) {
    for write in staged {
        let _ = fs::remove_file(&write.tmp).await;
    }
}
