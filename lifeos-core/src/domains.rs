//! Domain documents and their registry.
//!
//! A domain is one thematic area of the canon (`modes`, `intents`, ...),
//! stored as a free-form YAML document with known nested collections.
//! A registry document lists the domains and their display order; the
//! registry and the per-domain files can drift, and the listing reports
//! that drift instead of hiding it.

use crate::ids::next_item_id;
use crate::store::{self, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Errors from domain operations.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("domain not found: {0}")]
    NotFound(String),

    #[error("domain already registered: {0}")]
    AlreadyExists(String),

    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One registry entry: which file backs a domain and where it sorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub id: String,
    pub name: String,
    pub file: String,
    pub order: u32,
}

/// The domain registry document (`domains/_registry.yaml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainRegistry {
    #[serde(default)]
    pub domains: Vec<RegistryEntry>,
}

/// An item in one of a domain's nested collections.
///
/// `id` is unique within its array; everything else is free-form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainItem {
    pub id: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_yaml::Value>,
}

/// A per-domain document body.
///
/// The three nested collections are typed; any other top-level keys ride
/// along in `extra` so free-form domains round-trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainDocument {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<DomainItem>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub principles: Vec<DomainItem>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defined_modes: Vec<DomainItem>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl DomainDocument {
    fn collection_mut(&mut self, key: &str) -> Option<&mut Vec<DomainItem>> {
        match key {
            "sections" => Some(&mut self.sections),
            "principles" => Some(&mut self.principles),
            "defined_modes" => Some(&mut self.defined_modes),
            _ => None,
        }
    }
}

/// A registry row merged with its document body, as returned by `list`.
#[derive(Debug, Clone, Serialize)]
pub struct DomainSummary {
    pub id: String,
    pub name: String,
    pub order: u32,
    #[serde(flatten)]
    pub document: DomainDocument,
}

/// The full domain listing, with drift made visible.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DomainListing {
    pub domains: Vec<DomainSummary>,
    /// Registry ids whose files were absent or unreadable.
    pub missing: Vec<String>,
}

/// Defaults applied to a newly created collection item, keyed by array name.
///
/// One table so every call site agrees on what a fresh principle or mode
/// looks like.
fn collection_defaults(array_key: &str) -> Vec<(&'static str, serde_yaml::Value)> {
    use serde_yaml::Value;

    fn empty_seq() -> Value {
        Value::Sequence(Vec::new())
    }

    match array_key {
        "principles" => vec![
            ("status", Value::from("open")),
            ("implications", empty_seq()),
        ],
        "defined_modes" => {
            let mut triage = serde_yaml::Mapping::new();
            for bucket in ["surface", "hold", "drop"] {
                triage.insert(Value::from(bucket), empty_seq());
            }
            vec![
                ("status", Value::from("scaffolded")),
                ("triage", Value::Mapping(triage)),
            ]
        }
        _ => Vec::new(),
    }
}

/// Accessor for domain documents and the registry.
#[derive(Debug, Clone)]
pub struct DomainStore {
    root: PathBuf,
}

impl DomainStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            root: data_dir.as_ref().to_path_buf(),
        }
    }

    fn dir(&self) -> PathBuf {
        self.root.join("world").join("domains")
    }

    fn registry_path(&self) -> PathBuf {
        self.dir().join("_registry.yaml")
    }

    fn domain_path(&self, file: &str) -> PathBuf {
        self.dir().join(file)
    }

    /// Read the registry; a missing registry is an empty one.
    pub async fn registry(&self) -> Result<DomainRegistry, StoreError> {
        match store::read_yaml(self.registry_path()).await {
            Ok(registry) => Ok(registry),
            Err(e) if e.is_not_found() => Ok(DomainRegistry::default()),
            Err(e) => Err(e),
        }
    }

    pub async fn save_registry(&self, registry: &DomainRegistry) -> Result<(), StoreError> {
        store::write_yaml(self.registry_path(), registry).await
    }

    /// Read one domain document by id.
    pub async fn get(&self, id: &str) -> Result<DomainDocument, DomainError> {
        match store::read_yaml(self.domain_path(&format!("{id}.yaml"))).await {
            Ok(doc) => Ok(doc),
            Err(e) if e.is_not_found() => Err(DomainError::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace one domain document wholesale.
    pub async fn save(&self, id: &str, doc: &DomainDocument) -> Result<(), DomainError> {
        store::write_yaml(self.domain_path(&format!("{id}.yaml")), doc).await?;
        Ok(())
    }

    /// Register a new domain and write its document.
    pub async fn create(
        &self,
        id: &str,
        name: &str,
        doc: &DomainDocument,
    ) -> Result<RegistryEntry, DomainError> {
        let mut registry = self.registry().await?;
        if registry.domains.iter().any(|d| d.id == id) {
            return Err(DomainError::AlreadyExists(id.to_string()));
        }

        self.save(id, doc).await?;

        let order = registry
            .domains
            .iter()
            .map(|d| d.order)
            .max()
            .map(|o| o + 1)
            .unwrap_or(1);
        let entry = RegistryEntry {
            id: id.to_string(),
            name: name.to_string(),
            file: format!("{id}.yaml"),
            order,
        };
        registry.domains.push(entry.clone());
        self.save_registry(&registry).await?;
        Ok(entry)
    }

    /// Delete a domain document.
    ///
    /// The registry entry is left in place; callers remove it explicitly.
    /// A dangling entry shows up in the listing's `missing` set.
    pub async fn delete(&self, id: &str) -> Result<(), DomainError> {
        match store::remove(self.domain_path(&format!("{id}.yaml"))).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Err(DomainError::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a registry entry without touching the document file.
    pub async fn deregister(&self, id: &str) -> Result<(), DomainError> {
        let mut registry = self.registry().await?;
        let before = registry.domains.len();
        registry.domains.retain(|d| d.id != id);
        if registry.domains.len() == before {
            return Err(DomainError::NotFound(id.to_string()));
        }
        self.save_registry(&registry).await?;
        Ok(())
    }

    /// List every registered domain, merging registry rows with document
    /// bodies.
    ///
    /// Registry entries whose file is absent or unreadable land in
    /// `missing`; the rest of the listing is unaffected.
    pub async fn list(&self) -> Result<DomainListing, StoreError> {
        let mut registry = self.registry().await?;
        registry.domains.sort_by_key(|d| d.order);

        let mut listing = DomainListing::default();
        for entry in registry.domains {
            match store::read_yaml::<DomainDocument>(self.domain_path(&entry.file)).await {
                Ok(document) => listing.domains.push(DomainSummary {
                    id: entry.id,
                    name: entry.name,
                    order: entry.order,
                    document,
                }),
                Err(e) => {
                    warn!(domain = %entry.id, error = %e, "skipping unreadable domain file");
                    listing.missing.push(entry.id);
                }
            }
        }
        Ok(listing)
    }

    /// Insert a new item into one of a domain's nested collections.
    ///
    /// The item id is the collection's next free number; defaults from the
    /// per-array table fill any fields the caller did not provide.
    pub async fn add_item(
        &self,
        domain_id: &str,
        array_key: &str,
        fields: BTreeMap<String, serde_yaml::Value>,
    ) -> Result<DomainItem, DomainError> {
        let mut doc = self.get(domain_id).await?;
        let collection = doc
            .collection_mut(array_key)
            .ok_or_else(|| DomainError::UnknownCollection(array_key.to_string()))?;

        let id = next_item_id(collection.iter().map(|i| i.id.as_str()), array_key);

        let mut item = DomainItem {
            id,
            fields,
        };
        for (key, value) in collection_defaults(array_key) {
            item.fields.entry(key.to_string()).or_insert(value);
        }

        collection.push(item.clone());
        self.save(domain_id, &doc).await?;
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn value(s: &str) -> serde_yaml::Value {
        serde_yaml::Value::from(s)
    }

    #[tokio::test]
    async fn test_create_and_get_domain() {
        let dir = TempDir::new().expect("temp dir");
        let domains = DomainStore::new(dir.path());

        let mut doc = DomainDocument::default();
        doc.extra
            .insert("purpose".to_string(), value("how attention is spent"));
        domains
            .create("modes", "Modes", &doc)
            .await
            .expect("create");

        let loaded = domains.get("modes").await.expect("get");
        assert_eq!(loaded, doc);

        let registry = domains.registry().await.expect("registry");
        assert_eq!(registry.domains.len(), 1);
        assert_eq!(registry.domains[0].file, "modes.yaml");
        assert_eq!(registry.domains[0].order, 1);
    }

    #[tokio::test]
    async fn test_create_duplicate_is_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let domains = DomainStore::new(dir.path());
        let doc = DomainDocument::default();

        domains.create("modes", "Modes", &doc).await.expect("create");
        let err = domains
            .create("modes", "Modes again", &doc)
            .await
            .expect_err("duplicate");
        assert!(matches!(err, DomainError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_list_merges_registry_and_documents() {
        let dir = TempDir::new().expect("temp dir");
        let domains = DomainStore::new(dir.path());

        let mut doc = DomainDocument::default();
        doc.sections.push(DomainItem {
            id: "section-1".to_string(),
            fields: BTreeMap::from([("title".to_string(), value("Overview"))]),
        });
        domains.create("modes", "Modes", &doc).await.expect("create");
        domains
            .create("intents", "Intents", &DomainDocument::default())
            .await
            .expect("create");

        let listing = domains.list().await.expect("list");
        assert_eq!(listing.domains.len(), 2);
        assert!(listing.missing.is_empty());
        assert_eq!(listing.domains[0].id, "modes");
        assert_eq!(listing.domains[0].document.sections.len(), 1);
        assert_eq!(listing.domains[1].id, "intents");
    }

    #[tokio::test]
    async fn test_list_reports_missing_files() {
        let dir = TempDir::new().expect("temp dir");
        let domains = DomainStore::new(dir.path());

        domains
            .create("modes", "Modes", &DomainDocument::default())
            .await
            .expect("create");

        // Register a domain whose file never gets written.
        let mut registry = domains.registry().await.expect("registry");
        registry.domains.push(RegistryEntry {
            id: "ghosts".to_string(),
            name: "Ghosts".to_string(),
            file: "ghosts.yaml".to_string(),
            order: 9,
        });
        domains.save_registry(&registry).await.expect("save");

        let listing = domains.list().await.expect("list");
        assert_eq!(listing.domains.len(), 1);
        assert_eq!(listing.domains[0].id, "modes");
        assert_eq!(listing.missing, vec!["ghosts".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_leaves_registry_entry() {
        let dir = TempDir::new().expect("temp dir");
        let domains = DomainStore::new(dir.path());

        domains
            .create("modes", "Modes", &DomainDocument::default())
            .await
            .expect("create");
        domains.delete("modes").await.expect("delete");

        let registry = domains.registry().await.expect("registry");
        assert_eq!(registry.domains.len(), 1);

        let listing = domains.list().await.expect("list");
        assert!(listing.domains.is_empty());
        assert_eq!(listing.missing, vec!["modes".to_string()]);
    }

    #[tokio::test]
    async fn test_deregister_removes_entry_only() {
        let dir = TempDir::new().expect("temp dir");
        let domains = DomainStore::new(dir.path());

        domains
            .create("modes", "Modes", &DomainDocument::default())
            .await
            .expect("create");
        domains.deregister("modes").await.expect("deregister");

        let registry = domains.registry().await.expect("registry");
        assert!(registry.domains.is_empty());
        // The document file survives deregistration.
        assert!(domains.get("modes").await.is_ok());
    }

    #[tokio::test]
    async fn test_add_principles_assigns_sequential_ids_and_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let domains = DomainStore::new(dir.path());
        domains
            .create("test-domain", "Test Domain", &DomainDocument::default())
            .await
            .expect("create");

        let first = domains
            .add_item(
                "test-domain",
                "principles",
                BTreeMap::from([("text".to_string(), value("People own their patterns"))]),
            )
            .await
            .expect("add");
        let second = domains
            .add_item(
                "test-domain",
                "principles",
                BTreeMap::from([("text".to_string(), value("Delegation is reversible"))]),
            )
            .await
            .expect("add");

        assert_eq!(first.id, "principle-1");
        assert_eq!(second.id, "principle-2");

        let doc = domains.get("test-domain").await.expect("get");
        for item in &doc.principles {
            assert_eq!(item.fields.get("status"), Some(&value("open")));
            assert_eq!(
                item.fields.get("implications"),
                Some(&serde_yaml::Value::Sequence(Vec::new()))
            );
        }
    }

    #[tokio::test]
    async fn test_add_item_ids_survive_gaps() {
        let dir = TempDir::new().expect("temp dir");
        let domains = DomainStore::new(dir.path());

        let mut doc = DomainDocument::default();
        for n in [1u32, 2, 7] {
            doc.principles.push(DomainItem {
                id: format!("principle-{n}"),
                fields: BTreeMap::new(),
            });
        }
        domains.create("modes", "Modes", &doc).await.expect("create");

        let item = domains
            .add_item("modes", "principles", BTreeMap::new())
            .await
            .expect("add");
        assert_eq!(item.id, "principle-8");
    }

    #[tokio::test]
    async fn test_add_defined_mode_gets_triage_buckets() {
        let dir = TempDir::new().expect("temp dir");
        let domains = DomainStore::new(dir.path());
        domains
            .create("modes", "Modes", &DomainDocument::default())
            .await
            .expect("create");

        let item = domains
            .add_item(
                "modes",
                "defined_modes",
                BTreeMap::from([("name".to_string(), value("Deep Work"))]),
            )
            .await
            .expect("add");

        assert_eq!(item.id, "defined_mode-1");
        assert_eq!(item.fields.get("status"), Some(&value("scaffolded")));
        let triage = item.fields.get("triage").expect("triage");
        let mapping = triage.as_mapping().expect("mapping");
        assert_eq!(mapping.len(), 3);
        for bucket in mapping.values() {
            assert_eq!(bucket, &serde_yaml::Value::Sequence(Vec::new()));
        }
    }

    #[tokio::test]
    async fn test_caller_fields_beat_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let domains = DomainStore::new(dir.path());
        domains
            .create("modes", "Modes", &DomainDocument::default())
            .await
            .expect("create");

        let item = domains
            .add_item(
                "modes",
                "principles",
                BTreeMap::from([("status".to_string(), value("resolved"))]),
            )
            .await
            .expect("add");
        assert_eq!(item.fields.get("status"), Some(&value("resolved")));
    }

    #[tokio::test]
    async fn test_unknown_collection_is_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let domains = DomainStore::new(dir.path());
        domains
            .create("modes", "Modes", &DomainDocument::default())
            .await
            .expect("create");

        let err = domains
            .add_item("modes", "gadgets", BTreeMap::new())
            .await
            .expect_err("unknown");
        assert!(matches!(err, DomainError::UnknownCollection(_)));
    }

    #[tokio::test]
    async fn test_free_form_fields_round_trip() {
        let dir = TempDir::new().expect("temp dir");
        let domains = DomainStore::new(dir.path());

        let mut doc = DomainDocument::default();
        doc.extra.insert(
            "open_threads".to_string(),
            serde_yaml::Value::Sequence(vec![value("what does silence cost?")]),
        );
        domains
            .create("research", "Research", &doc)
            .await
            .expect("create");

        let loaded = domains.get("research").await.expect("get");
        assert_eq!(loaded.extra, doc.extra);
    }
}
