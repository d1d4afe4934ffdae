//! Versioned snapshots of the world aggregate.
//!
//! A snapshot deep-copies the whole live aggregate (meta + setting +
//! thesis + open questions + domains) into `world/versions/<version>/
//! snapshot.json`. Snapshots are write-once: the `files` payload is the
//! historical ground truth for restore and is never mutated after
//! creation. Restoring writes a snapshot's payload back over the live
//! documents, after automatically snapshotting the pre-restore state.

use crate::domains::{DomainDocument, DomainRegistry, DomainStore};
use crate::ids::now_iso;
use crate::questions::{OpenQuestion, QuestionStore};
use crate::store::{self, StoreError};
use crate::world::{WorldMeta, WorldSetting, WorldStore, WorldThesis};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Errors from snapshot operations.
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("version already exists: {0}")]
    Duplicate(String),

    #[error("version not found: {0}")]
    NotFound(String),

    #[error("invalid version string: {0}")]
    InvalidVersion(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The domain portion of a snapshot: registry plus every document body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainFiles {
    pub registry: DomainRegistry,
    pub documents: BTreeMap<String, DomainDocument>,
}

/// The full captured aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldFiles {
    pub meta: WorldMeta,
    pub setting: WorldSetting,
    pub thesis: WorldThesis,
    pub open_questions: Vec<OpenQuestion>,
    pub domains: DomainFiles,
}

/// Snapshot metadata, as shown in listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub version: String,
    pub notes: String,
    pub created: String,
}

/// A complete stored snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: String,
    pub notes: String,
    pub created: String,
    pub files: WorldFiles,
}

/// Accessor for the snapshot history.
#[derive(Debug, Clone)]
pub struct VersionStore {
    root: PathBuf,
    world: WorldStore,
    domains: DomainStore,
    questions: QuestionStore,
}

impl VersionStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let root = data_dir.as_ref().to_path_buf();
        Self {
            world: WorldStore::new(&root),
            domains: DomainStore::new(&root),
            questions: QuestionStore::new(&root),
            root,
        }
    }

    fn dir(&self) -> PathBuf {
        self.root.join("world").join("versions")
    }

    fn snapshot_path(&self, version: &str) -> PathBuf {
        self.dir().join(version).join("snapshot.json")
    }

    /// Read the full live aggregate through the same repositories the
    /// routes use.
    ///
    /// Domains whose files are missing are captured as absent (their
    /// registry rows survive), matching what the listing reports.
    pub async fn capture(&self) -> Result<WorldFiles, StoreError> {
        let meta = self.world.meta().await?;
        let setting = self.world.setting().await?;
        let thesis = self.world.thesis().await?;
        let open_questions = self.questions.list().await?;

        let registry = self.domains.registry().await?;
        let mut documents = BTreeMap::new();
        for entry in &registry.domains {
            match self.domains.get(&entry.id).await {
                Ok(doc) => {
                    documents.insert(entry.id.clone(), doc);
                }
                Err(e) => warn!(domain = %entry.id, error = %e, "domain not captured"),
            }
        }

        Ok(WorldFiles {
            meta,
            setting,
            thesis,
            open_questions,
            domains: DomainFiles {
                registry,
                documents,
            },
        })
    }

    /// Create a new snapshot of the live aggregate and bump World Meta.
    ///
    /// A version string that already has a snapshot is a conflict; the
    /// stored history is never silently overwritten.
    pub async fn create(&self, version: &str, notes: &str) -> Result<SnapshotMeta, VersionError> {
        validate_version(version)?;
        if self.exists(version).await {
            return Err(VersionError::Duplicate(version.to_string()));
        }

        let files = self.capture().await?;
        let meta = self.write_snapshot(version, notes, files).await?;
        self.world.bump_meta(version).await?;
        info!(version, "created world snapshot");
        Ok(meta)
    }

    async fn exists(&self, version: &str) -> bool {
        tokio::fs::try_exists(self.snapshot_path(version))
            .await
            .unwrap_or(false)
    }

    async fn write_snapshot(
        &self,
        version: &str,
        notes: &str,
        files: WorldFiles,
    ) -> Result<SnapshotMeta, VersionError> {
        let snapshot = Snapshot {
            version: version.to_string(),
            notes: notes.to_string(),
            created: now_iso(),
            files,
        };
        store::write_json(self.snapshot_path(version), &snapshot).await?;
        Ok(SnapshotMeta {
            version: snapshot.version,
            notes: snapshot.notes,
            created: snapshot.created,
        })
    }

    /// Snapshot metadata for every stored version, newest first.
    ///
    /// Only the metadata is deserialized; the `files` payload stays on
    /// disk. An absent versions directory is an empty history.
    pub async fn list(&self) -> Result<Vec<SnapshotMeta>, VersionError> {
        let mut entries = match tokio::fs::read_dir(self.dir()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Io {
                    path: self.dir(),
                    source: e,
                }
                .into())
            }
        };

        let mut versions = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| StoreError::Io {
            path: self.dir(),
            source: e,
        })? {
            let path = entry.path().join("snapshot.json");
            match store::read_json::<SnapshotMeta>(&path).await {
                Ok(meta) => versions.push(meta),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable snapshot"),
            }
        }

        versions.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(versions)
    }

    /// Load one full snapshot.
    pub async fn get(&self, version: &str) -> Result<Snapshot, VersionError> {
        match store::read_json(self.snapshot_path(version)).await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) if e.is_not_found() => Err(VersionError::NotFound(version.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Restore the live aggregate from a stored snapshot.
    ///
    /// The current live state is snapshotted first (so a restore is always
    /// reversible), then every target document is staged and the batch is
    /// renamed into place — a failure before commit leaves the live state
    /// untouched.
    pub async fn restore(&self, version: &str) -> Result<SnapshotMeta, VersionError> {
        let snapshot = self.get(version).await?;

        let safety_id = format!("_pre-restore-{}", Utc::now().timestamp_millis());
        let live = self.capture().await?;
        self.write_snapshot(
            &safety_id,
            &format!("Automatic snapshot before restoring {version}"),
            live,
        )
        .await?;

        let files = snapshot.files;
        let world_dir = self.root.join("world");
        let domains_dir = world_dir.join("domains");

        let mut staged = Vec::new();
        let result: Result<(), StoreError> = async {
            staged.push(store::stage_yaml(world_dir.join("setting.yaml"), &files.setting).await?);
            staged.push(store::stage_yaml(world_dir.join("thesis.yaml"), &files.thesis).await?);
            staged.push(
                store::stage_yaml(
                    world_dir.join("open-questions.yaml"),
                    &QuestionsPayload {
                        questions: files.open_questions,
                    },
                )
                .await?,
            );
            staged.push(
                store::stage_yaml(domains_dir.join("_registry.yaml"), &files.domains.registry)
                    .await?,
            );
            for (id, doc) in &files.domains.documents {
                staged.push(store::stage_yaml(domains_dir.join(format!("{id}.yaml")), doc).await?);
            }
            Ok(())
        }
        .await;

        if let Err(e) = result {
            store::discard(staged).await;
            return Err(e.into());
        }
        store::commit(staged).await?;

        self.world.bump_meta(version).await?;
        info!(version, safety = %safety_id, "restored world snapshot");
        Ok(SnapshotMeta {
            version: snapshot.version,
            notes: snapshot.notes,
            created: snapshot.created,
        })
    }
}

// The open-questions file shape, mirrored here so restore writes the same
// layout the question store reads.
#[derive(Serialize)]
struct QuestionsPayload {
    questions: Vec<OpenQuestion>,
}

fn validate_version(version: &str) -> Result<(), VersionError> {
    let ok = !version.is_empty()
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if ok {
        Ok(())
    } else {
        Err(VersionError::InvalidVersion(version.to_string()))
    }
}
