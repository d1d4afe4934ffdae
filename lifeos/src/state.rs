//! Shared application state.
//!
//! One repository per entity kind, all rooted at the same data directory,
//! plus the scenario engine and its generation cache. Everything is
//! constructed once at startup and cloned into handlers — no ambient
//! globals.

use lifeos_core::scenario::{ConversationStore, CorrectionStore, GenerationCache, ScenarioEngine};
use lifeos_core::{
    DomainStore, FindingStore, PkgStore, PrototypeStore, QuestionStore, VersionStore,
    VignetteStore, WorldStore,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// State handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub world: WorldStore,
    pub domains: DomainStore,
    pub questions: QuestionStore,
    pub vignettes: VignetteStore,
    pub findings: FindingStore,
    pub versions: VersionStore,
    pub pkg: PkgStore,
    pub prototypes: PrototypeStore,
    pub conversations: ConversationStore,
    pub corrections: CorrectionStore,

    /// Absent when no API key is configured; scenario routes then refuse
    /// with an upstream error instead of the whole server failing to boot.
    pub engine: Option<Arc<ScenarioEngine>>,
    pub cache: Arc<Mutex<GenerationCache>>,
}

impl AppState {
    pub fn new(data_dir: impl AsRef<Path>, engine: Option<ScenarioEngine>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            world: WorldStore::new(data_dir),
            domains: DomainStore::new(data_dir),
            questions: QuestionStore::new(data_dir),
            vignettes: VignetteStore::new(data_dir),
            findings: FindingStore::new(data_dir),
            versions: VersionStore::new(data_dir),
            pkg: PkgStore::new(data_dir),
            prototypes: PrototypeStore::new(data_dir),
            conversations: ConversationStore::new(data_dir),
            corrections: CorrectionStore::new(data_dir),
            engine: engine.map(Arc::new),
            cache: Arc::new(Mutex::new(GenerationCache::default())),
        }
    }
}
