//! World canon singletons: meta, setting, and thesis documents.
//!
//! These three documents describe the fictional world the thesis designs
//! against. They are created once at data-directory init, mutated in place,
//! and never deleted. Version history for them lives in the snapshot
//! subsystem, not here.

use crate::ids::today_iso;
use crate::store::{self, StoreError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Aggregate version marker for the world canon.
///
/// `version` tracks the latest published snapshot; clients infer
/// "diverged from latest snapshot" by comparing it against the snapshot
/// listing, so no divergence flag is stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldMeta {
    /// Semver-like version string (`major.minor.patch`).
    pub version: String,

    /// Date of the last meaningful aggregate change (`YYYY-MM-DD`).
    pub last_modified: String,

    /// One-line description of the canon.
    pub description: String,
}

impl WorldMeta {
    fn initial() -> Self {
        Self {
            version: "0.1.0".to_string(),
            last_modified: today_iso(),
            description: "LifeOS world canon".to_string(),
        }
    }
}

/// One entry in the setting's technological landscape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnologyEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// The world setting: where and when the fiction takes place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSetting {
    #[serde(default)]
    pub year: Option<i32>,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub technological_landscape: Vec<TechnologyEntry>,

    #[serde(default)]
    pub problem_statement: String,

    #[serde(default)]
    pub solution: String,

    #[serde(default)]
    pub core_tension: String,
}

/// Partial update for the setting; only present fields are replaced.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingPatch {
    pub year: Option<i32>,
    pub summary: Option<String>,
    pub technological_landscape: Option<Vec<TechnologyEntry>>,
    pub problem_statement: Option<String>,
    pub solution: Option<String>,
    pub core_tension: Option<String>,
}

impl SettingPatch {
    fn apply(self, setting: &mut WorldSetting) {
        if let Some(year) = self.year {
            setting.year = Some(year);
        }
        if let Some(summary) = self.summary {
            setting.summary = summary;
        }
        if let Some(landscape) = self.technological_landscape {
            setting.technological_landscape = landscape;
        }
        if let Some(problem) = self.problem_statement {
            setting.problem_statement = problem;
        }
        if let Some(solution) = self.solution {
            setting.solution = solution;
        }
        if let Some(tension) = self.core_tension {
            setting.core_tension = tension;
        }
    }
}

/// The design thesis the canon argues for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldThesis {
    #[serde(default)]
    pub problem_statement: String,

    #[serde(default)]
    pub diagnosis: String,

    #[serde(default)]
    pub solution: String,

    #[serde(default)]
    pub contributions: Vec<String>,
}

/// Accessor for the three world singleton documents.
#[derive(Debug, Clone)]
pub struct WorldStore {
    root: PathBuf,
}

impl WorldStore {
    /// Create a store rooted at the data directory.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            root: data_dir.as_ref().to_path_buf(),
        }
    }

    fn meta_path(&self) -> PathBuf {
        self.root.join("world").join("meta.yaml")
    }

    fn setting_path(&self) -> PathBuf {
        self.root.join("world").join("setting.yaml")
    }

    fn thesis_path(&self) -> PathBuf {
        self.root.join("world").join("thesis.yaml")
    }

    /// Write default singletons for any that do not exist yet.
    ///
    /// A document that exists but fails to parse is an error, never
    /// silently replaced.
    pub async fn ensure_initialized(&self) -> Result<(), StoreError> {
        match store::read_yaml::<WorldMeta>(self.meta_path()).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                store::write_yaml(self.meta_path(), &WorldMeta::initial()).await?;
            }
            Err(e) => return Err(e),
        }
        match store::read_yaml::<WorldSetting>(self.setting_path()).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                store::write_yaml(self.setting_path(), &WorldSetting::default()).await?;
            }
            Err(e) => return Err(e),
        }
        match store::read_yaml::<WorldThesis>(self.thesis_path()).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                store::write_yaml(self.thesis_path(), &WorldThesis::default()).await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    pub async fn meta(&self) -> Result<WorldMeta, StoreError> {
        store::read_yaml(self.meta_path()).await
    }

    pub async fn save_meta(&self, meta: &WorldMeta) -> Result<(), StoreError> {
        store::write_yaml(self.meta_path(), meta).await
    }

    /// Record an aggregate change: set the version and stamp today's date.
    pub async fn bump_meta(&self, version: &str) -> Result<WorldMeta, StoreError> {
        let mut meta = self.meta().await?;
        meta.version = version.to_string();
        meta.last_modified = today_iso();
        self.save_meta(&meta).await?;
        Ok(meta)
    }

    pub async fn setting(&self) -> Result<WorldSetting, StoreError> {
        store::read_yaml(self.setting_path()).await
    }

    pub async fn save_setting(&self, setting: &WorldSetting) -> Result<(), StoreError> {
        store::write_yaml(self.setting_path(), setting).await
    }

    /// Merge a partial update into the stored setting.
    pub async fn update_setting(&self, patch: SettingPatch) -> Result<WorldSetting, StoreError> {
        let mut setting = self.setting().await?;
        patch.apply(&mut setting);
        self.save_setting(&setting).await?;
        Ok(setting)
    }

    pub async fn thesis(&self) -> Result<WorldThesis, StoreError> {
        store::read_yaml(self.thesis_path()).await
    }

    pub async fn save_thesis(&self, thesis: &WorldThesis) -> Result<(), StoreError> {
        store::write_yaml(self.thesis_path(), thesis).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_ensure_initialized_writes_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let world = WorldStore::new(dir.path());

        world.ensure_initialized().await.expect("init");

        let meta = world.meta().await.expect("meta");
        assert_eq!(meta.version, "0.1.0");
        assert_eq!(world.setting().await.expect("setting"), WorldSetting::default());
        assert_eq!(world.thesis().await.expect("thesis"), WorldThesis::default());
    }

    #[tokio::test]
    async fn test_ensure_initialized_preserves_existing() {
        let dir = TempDir::new().expect("temp dir");
        let world = WorldStore::new(dir.path());
        world.ensure_initialized().await.expect("init");

        let mut setting = world.setting().await.expect("setting");
        setting.year = Some(2035);
        world.save_setting(&setting).await.expect("save");

        world.ensure_initialized().await.expect("re-init");
        assert_eq!(world.setting().await.expect("setting").year, Some(2035));
    }

    #[tokio::test]
    async fn test_setting_round_trip() {
        let dir = TempDir::new().expect("temp dir");
        let world = WorldStore::new(dir.path());

        let setting = WorldSetting {
            year: Some(2035),
            summary: "A decade after ambient computing won".to_string(),
            technological_landscape: vec![TechnologyEntry {
                name: "whisper mesh".to_string(),
                description: "City-scale low-power sensing fabric".to_string(),
            }],
            problem_statement: "Attention is the scarce resource".to_string(),
            solution: "An operating system for a life".to_string(),
            core_tension: "Delegation versus authorship".to_string(),
        };
        world.save_setting(&setting).await.expect("save");

        assert_eq!(world.setting().await.expect("read"), setting);
    }

    #[tokio::test]
    async fn test_update_setting_merges_partial_fields() {
        let dir = TempDir::new().expect("temp dir");
        let world = WorldStore::new(dir.path());
        world.ensure_initialized().await.expect("init");

        let setting = WorldSetting {
            year: Some(2035),
            summary: "original summary".to_string(),
            core_tension: "original tension".to_string(),
            ..WorldSetting::default()
        };
        world.save_setting(&setting).await.expect("save");

        let updated = world
            .update_setting(SettingPatch {
                summary: Some("revised summary".to_string()),
                ..SettingPatch::default()
            })
            .await
            .expect("update");

        assert_eq!(updated.summary, "revised summary");
        assert_eq!(updated.year, Some(2035));
        assert_eq!(updated.core_tension, "original tension");
    }

    #[tokio::test]
    async fn test_bump_meta_sets_version_and_date() {
        let dir = TempDir::new().expect("temp dir");
        let world = WorldStore::new(dir.path());
        world.ensure_initialized().await.expect("init");

        let meta = world.bump_meta("1.2.0").await.expect("bump");
        assert_eq!(meta.version, "1.2.0");
        assert_eq!(meta.last_modified, today_iso());

        let reread = world.meta().await.expect("meta");
        assert_eq!(reread, meta);
    }

    #[tokio::test]
    async fn test_thesis_round_trip() {
        let dir = TempDir::new().expect("temp dir");
        let world = WorldStore::new(dir.path());

        let thesis = WorldThesis {
            problem_statement: "Personal software is fragmented".to_string(),
            diagnosis: "Apps optimize for engagement, not lives".to_string(),
            solution: "A canon-driven personal OS".to_string(),
            contributions: vec![
                "A speculative design canon".to_string(),
                "A vignette-driven evaluation method".to_string(),
            ],
        };
        world.save_thesis(&thesis).await.expect("save");
        assert_eq!(world.thesis().await.expect("read"), thesis);
    }
}
