//! Prototype gallery registries.
//!
//! Two free-form YAML listings curated by hand and served read-only: the
//! day-by-day prototype log and the prototype registry the gallery pages
//! render from.

use crate::store::{self, StoreError};
use std::path::{Path, PathBuf};

/// Read-only accessor for the prototype listings.
#[derive(Debug, Clone)]
pub struct PrototypeStore {
    root: PathBuf,
}

impl PrototypeStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            root: data_dir.as_ref().to_path_buf(),
        }
    }

    fn dir(&self) -> PathBuf {
        self.root.join("prototypes")
    }

    /// The day-by-day prototype log (`days.yaml`).
    pub async fn days(&self) -> Result<serde_yaml::Value, StoreError> {
        store::read_yaml(self.dir().join("days.yaml")).await
    }

    /// The prototype registry (`prototype-registry.yaml`).
    pub async fn registry(&self) -> Result<serde_yaml::Value, StoreError> {
        store::read_yaml(self.dir().join("prototype-registry.yaml")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_days_round_trip() {
        let dir = TempDir::new().expect("temp dir");
        let proto_dir = dir.path().join("prototypes");
        tokio::fs::create_dir_all(&proto_dir).await.expect("mkdir");
        tokio::fs::write(
            proto_dir.join("days.yaml"),
            "days:\n  - day: 1\n    title: paper dashboard\n",
        )
        .await
        .expect("write");

        let prototypes = PrototypeStore::new(dir.path());
        let days = prototypes.days().await.expect("read");
        assert!(days["days"].as_sequence().is_some());
    }

    #[tokio::test]
    async fn test_missing_registry_is_not_found() {
        let dir = TempDir::new().expect("temp dir");
        let prototypes = PrototypeStore::new(dir.path());
        let err = prototypes.registry().await.expect_err("missing");
        assert!(err.is_not_found());
    }
}
