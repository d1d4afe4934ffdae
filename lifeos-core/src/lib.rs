//! LifeOS world canon engine.
//!
//! This crate provides:
//! - A flat-file YAML/JSON document store with atomic writes
//! - Typed repositories for every canon entity (world singletons, domains,
//!   open questions, vignettes, finding sessions, PKG, prototypes)
//! - Versioned snapshots of the world aggregate with staged restore
//! - A scenario engine that proxies Claude for digital-twin chat
//!
//! # Quick Start
//!
//! ```ignore
//! use lifeos_core::{DomainStore, VersionStore, WorldStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let world = WorldStore::new("data");
//!     world.ensure_initialized().await?;
//!
//!     let versions = VersionStore::new("data");
//!     versions.create("1.0.0", "first published canon").await?;
//!     Ok(())
//! }
//! ```

pub mod domains;
pub mod findings;
pub mod ids;
pub mod pkg;
pub mod prototypes;
pub mod questions;
pub mod scenario;
pub mod store;
pub mod versions;
pub mod vignettes;
pub mod world;

// Primary public API
pub use domains::{DomainDocument, DomainError, DomainItem, DomainListing, DomainStore};
pub use findings::{FindingError, FindingSession, FindingStore, NewFinding};
pub use pkg::{PkgError, PkgStore};
pub use prototypes::PrototypeStore;
pub use questions::{NewQuestion, OpenQuestion, QuestionError, QuestionStatus, QuestionStore};
pub use scenario::{
    ConversationStore, CorrectionStore, GenerationCache, ScenarioConfig, ScenarioContext,
    ScenarioEngine, ScenarioError,
};
pub use store::StoreError;
pub use versions::{Snapshot, SnapshotMeta, VersionError, VersionStore, WorldFiles};
pub use vignettes::{NewVignette, Vignette, VignetteError, VignetteStatus, VignetteStore};
pub use world::{SettingPatch, WorldMeta, WorldSetting, WorldStore, WorldThesis};
