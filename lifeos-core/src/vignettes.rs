//! Vignettes: simulation scenario specifications.
//!
//! A vignette describes a situation for the scenario engine to roleplay
//! through. One YAML file per vignette; the filename is the id.

use crate::ids::{now_iso, sanitize_slug};
use crate::store::{self, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Errors from vignette operations.
#[derive(Debug, thiserror::Error)]
pub enum VignetteError {
    #[error("vignette not found: {0}")]
    NotFound(String),

    #[error("vignette already exists: {0}")]
    AlreadyExists(String),

    #[error("vignette needs a title or an id")]
    MissingTitle,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VignetteStatus {
    #[default]
    Draft,
    Active,
    Archived,
}

/// How the scenario engine should run this vignette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Named simulation mode (`conversational`, `ambient`, ...).
    pub mode: String,
    /// Sampling temperature handed to the model, 0.0..=1.0.
    pub creativity: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            mode: "conversational".to_string(),
            creativity: 0.7,
        }
    }
}

/// A simulation scenario specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vignette {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: VignetteStatus,
    #[serde(default)]
    pub simulation: SimulationParams,
    #[serde(default)]
    pub setting: String,
    #[serde(default)]
    pub tensions_to_surface: Vec<String>,
    #[serde(default)]
    pub research_questions: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Fields for creating a vignette; timestamps are assigned, and the id
/// defaults to a slug of the title.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewVignette {
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub status: VignetteStatus,
    #[serde(default)]
    pub simulation: SimulationParams,
    #[serde(default)]
    pub setting: String,
    #[serde(default)]
    pub tensions_to_surface: Vec<String>,
    #[serde(default)]
    pub research_questions: Vec<String>,
}

/// Accessor for vignette documents.
#[derive(Debug, Clone)]
pub struct VignetteStore {
    root: PathBuf,
}

impl VignetteStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            root: data_dir.as_ref().to_path_buf(),
        }
    }

    fn dir(&self) -> PathBuf {
        self.root.join("vignettes")
    }

    fn path(&self, id: &str) -> PathBuf {
        self.dir().join(format!("{id}.yaml"))
    }

    /// All vignettes, newest first.
    ///
    /// Unreadable files are skipped with a warning; a missing directory is
    /// an empty collection.
    pub async fn list(&self) -> Result<Vec<Vignette>, StoreError> {
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

        let mut vignettes = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| StoreError::Io {
            path: self.dir(),
            source: e,
        })? {
            let path = entry.path();
            if path.extension().map(|e| e == "yaml").unwrap_or(false) {
                match store::read_yaml::<Vignette>(&path).await {
                    Ok(vignette) => vignettes.push(vignette),
                    Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable vignette"),
                }
            }
        }

        vignettes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(vignettes)
    }

    pub async fn get(&self, id: &str) -> Result<Vignette, VignetteError> {
        match store::read_yaml(self.path(id)).await {
            Ok(vignette) => Ok(vignette),
            Err(e) if e.is_not_found() => Err(VignetteError::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Create a vignette; the id defaults to a slug of the title.
    pub async fn create(&self, new: NewVignette) -> Result<Vignette, VignetteError> {
        let id = match new.id {
            Some(id) if !id.is_empty() => id,
            _ => {
                let slug = sanitize_slug(&new.title);
                if slug.is_empty() {
                    return Err(VignetteError::MissingTitle);
                }
                slug
            }
        };

        match self.get(&id).await {
            Ok(_) => return Err(VignetteError::AlreadyExists(id)),
            Err(VignetteError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let now = now_iso();
        let vignette = Vignette {
            id: id.clone(),
            title: new.title,
            status: new.status,
            simulation: new.simulation,
            setting: new.setting,
            tensions_to_surface: new.tensions_to_surface,
            research_questions: new.research_questions,
            created_at: now.clone(),
            updated_at: now,
            extra: BTreeMap::new(),
        };
        store::write_yaml(self.path(&id), &vignette).await?;
        Ok(vignette)
    }

    /// Replace a vignette document, bumping `updated_at`.
    pub async fn save(&self, id: &str, mut vignette: Vignette) -> Result<Vignette, VignetteError> {
        // Existence check keeps PUT from silently creating documents.
        let existing = self.get(id).await?;
        vignette.id = id.to_string();
        vignette.created_at = existing.created_at;
        vignette.updated_at = now_iso();
        store::write_yaml(self.path(id), &vignette).await?;
        Ok(vignette)
    }

    pub async fn delete(&self, id: &str) -> Result<(), VignetteError> {
        match store::remove(self.path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Err(VignetteError::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_vignette(title: &str) -> NewVignette {
        NewVignette {
            title: title.to_string(),
            setting: "A kitchen, early morning".to_string(),
            tensions_to_surface: vec!["autonomy vs care".to_string()],
            research_questions: vec!["When does help feel like surveillance?".to_string()],
            ..NewVignette::default()
        }
    }

    #[tokio::test]
    async fn test_empty_directory_lists_nothing() {
        let dir = TempDir::new().expect("temp dir");
        let vignettes = VignetteStore::new(dir.path());
        assert!(vignettes.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_create_derives_slug_id() {
        let dir = TempDir::new().expect("temp dir");
        let vignettes = VignetteStore::new(dir.path());

        let v = vignettes
            .create(new_vignette("The Morning Briefing"))
            .await
            .expect("create");
        assert_eq!(v.id, "the-morning-briefing");
        assert_eq!(v.status, VignetteStatus::Draft);
        assert_eq!(v.created_at, v.updated_at);
    }

    #[tokio::test]
    async fn test_create_round_trips() {
        let dir = TempDir::new().expect("temp dir");
        let vignettes = VignetteStore::new(dir.path());

        let created = vignettes
            .create(new_vignette("The Morning Briefing"))
            .await
            .expect("create");
        let loaded = vignettes.get(&created.id).await.expect("get");
        assert_eq!(loaded, created);
    }

    #[tokio::test]
    async fn test_create_duplicate_is_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let vignettes = VignetteStore::new(dir.path());
        vignettes
            .create(new_vignette("Quiet Hours"))
            .await
            .expect("create");

        let err = vignettes
            .create(new_vignette("Quiet Hours"))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, VignetteError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_create_without_title_or_id_fails() {
        let dir = TempDir::new().expect("temp dir");
        let vignettes = VignetteStore::new(dir.path());
        let err = vignettes
            .create(NewVignette::default())
            .await
            .expect_err("no title");
        assert!(matches!(err, VignetteError::MissingTitle));
    }

    #[tokio::test]
    async fn test_save_preserves_created_at() {
        let dir = TempDir::new().expect("temp dir");
        let vignettes = VignetteStore::new(dir.path());
        let created = vignettes
            .create(new_vignette("Quiet Hours"))
            .await
            .expect("create");

        let mut updated = created.clone();
        updated.status = VignetteStatus::Active;
        let saved = vignettes.save(&created.id, updated).await.expect("save");

        assert_eq!(saved.status, VignetteStatus::Active);
        assert_eq!(saved.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_save_unknown_is_not_found() {
        let dir = TempDir::new().expect("temp dir");
        let vignettes = VignetteStore::new(dir.path());
        let v = Vignette {
            id: "ghost".to_string(),
            title: "Ghost".to_string(),
            status: VignetteStatus::Draft,
            simulation: SimulationParams::default(),
            setting: String::new(),
            tensions_to_surface: Vec::new(),
            research_questions: Vec::new(),
            created_at: now_iso(),
            updated_at: now_iso(),
            extra: BTreeMap::new(),
        };
        let err = vignettes.save("ghost", v).await.expect_err("missing");
        assert!(matches!(err, VignetteError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let dir = TempDir::new().expect("temp dir");
        let vignettes = VignetteStore::new(dir.path());
        let v = vignettes
            .create(new_vignette("Quiet Hours"))
            .await
            .expect("create");

        vignettes.delete(&v.id).await.expect("delete");
        assert!(matches!(
            vignettes.get(&v.id).await,
            Err(VignetteError::NotFound(_))
        ));
    }
}
