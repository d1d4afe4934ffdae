//! Finding sessions: recorded runs of a vignette simulation.
//!
//! One JSON file per session. Reactions are append-only; the reflection is
//! written exactly once when the session ends. A session with a reflection
//! is `reflected` and refuses further reflections — the transition is
//! explicit rather than a convention upheld by callers.

use crate::ids::{now_iso, timestamp_id};
use crate::store::{self, StoreError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Errors from finding-session operations.
#[derive(Debug, thiserror::Error)]
pub enum FindingError {
    #[error("finding session not found: {0}")]
    NotFound(String),

    #[error("session {0} already has a reflection")]
    AlreadyReflected(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One logged reaction during a session.
///
/// `at` is server-assigned; the rest of the body is whatever the reviewer
/// flagged (a quote, a rating, tags).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub at: String,
    #[serde(flatten)]
    pub body: serde_json::Map<String, serde_json::Value>,
}

/// One turn of the simulation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: String,
    pub content: String,
}

/// A recorded simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindingSession {
    pub id: String,
    pub vignette_id: String,
    pub vignette_title: String,
    pub mode: String,
    pub started_at: String,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub transcript: Vec<TranscriptEntry>,
    #[serde(default)]
    pub reflection: Option<String>,
}

impl FindingSession {
    /// A session is reflected once its end-of-run reflection is set.
    pub fn is_reflected(&self) -> bool {
        self.reflection.is_some()
    }
}

/// Summary row for the session listing.
#[derive(Debug, Clone, Serialize)]
pub struct FindingSummary {
    pub id: String,
    pub vignette_id: String,
    pub vignette_title: String,
    pub mode: String,
    pub started_at: String,
    pub reaction_count: usize,
    pub reflected: bool,
}

/// Fields for starting a session; id and start time are assigned.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFinding {
    pub vignette_id: String,
    pub vignette_title: String,
    pub mode: String,
    #[serde(default)]
    pub transcript: Vec<TranscriptEntry>,
}

/// Accessor for finding-session records.
#[derive(Debug, Clone)]
pub struct FindingStore {
    root: PathBuf,
}

impl FindingStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            root: data_dir.as_ref().to_path_buf(),
        }
    }

    fn dir(&self) -> PathBuf {
        self.root.join("findings")
    }

    fn path(&self, id: &str) -> PathBuf {
        self.dir().join(format!("{id}.json"))
    }

    /// Session summaries, newest first.
    pub async fn list(&self) -> Result<Vec<FindingSummary>, StoreError> {
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

        let mut summaries = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| StoreError::Io {
            path: self.dir(),
            source: e,
        })? {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match store::read_json::<FindingSession>(&path).await {
                    Ok(session) => summaries.push(FindingSummary {
                        id: session.id.clone(),
                        vignette_id: session.vignette_id.clone(),
                        vignette_title: session.vignette_title.clone(),
                        mode: session.mode.clone(),
                        started_at: session.started_at.clone(),
                        reaction_count: session.reactions.len(),
                        reflected: session.is_reflected(),
                    }),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping unreadable session")
                    }
                }
            }
        }

        summaries.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(summaries)
    }

    pub async fn get(&self, id: &str) -> Result<FindingSession, FindingError> {
        match store::read_json(self.path(id)).await {
            Ok(session) => Ok(session),
            Err(e) if e.is_not_found() => Err(FindingError::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Start a new session record.
    pub async fn create(&self, new: NewFinding) -> Result<FindingSession, FindingError> {
        let session = FindingSession {
            id: timestamp_id("session"),
            vignette_id: new.vignette_id,
            vignette_title: new.vignette_title,
            mode: new.mode,
            started_at: now_iso(),
            reactions: Vec::new(),
            transcript: new.transcript,
            reflection: None,
        };
        store::write_json(self.path(&session.id), &session).await?;
        Ok(session)
    }

    /// Append one reaction to a session's log.
    ///
    /// Grows `reactions` by exactly one; prior entries are never touched.
    pub async fn append_reaction(
        &self,
        id: &str,
        body: serde_json::Map<String, serde_json::Value>,
    ) -> Result<FindingSession, FindingError> {
        let mut session = self.get(id).await?;
        session.reactions.push(Reaction {
            at: now_iso(),
            body,
        });
        store::write_json(self.path(id), &session).await?;
        Ok(session)
    }

    /// Append one transcript turn.
    pub async fn append_transcript(
        &self,
        id: &str,
        entry: TranscriptEntry,
    ) -> Result<FindingSession, FindingError> {
        let mut session = self.get(id).await?;
        session.transcript.push(entry);
        store::write_json(self.path(id), &session).await?;
        Ok(session)
    }

    /// Set the end-of-session reflection.
    ///
    /// `active -> reflected` happens at most once; a second attempt is a
    /// conflict, not an overwrite.
    pub async fn set_reflection(
        &self,
        id: &str,
        reflection: impl Into<String>,
    ) -> Result<FindingSession, FindingError> {
        let mut session = self.get(id).await?;
        if session.is_reflected() {
            return Err(FindingError::AlreadyReflected(id.to_string()));
        }
        session.reflection = Some(reflection.into());
        store::write_json(self.path(id), &session).await?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_finding() -> NewFinding {
        NewFinding {
            vignette_id: "the-morning-briefing".to_string(),
            vignette_title: "The Morning Briefing".to_string(),
            mode: "conversational".to_string(),
            transcript: vec![TranscriptEntry {
                role: "twin".to_string(),
                content: "Good morning. Three things want your attention.".to_string(),
            }],
        }
    }

    fn reaction_body(note: &str) -> serde_json::Map<String, serde_json::Value> {
        let mut body = serde_json::Map::new();
        body.insert("note".to_string(), serde_json::Value::from(note));
        body
    }

    #[tokio::test]
    async fn test_create_round_trips() {
        let dir = TempDir::new().expect("temp dir");
        let findings = FindingStore::new(dir.path());

        let created = findings.create(new_finding()).await.expect("create");
        assert!(created.id.starts_with("session_"));
        assert!(!created.is_reflected());

        let loaded = findings.get(&created.id).await.expect("get");
        assert_eq!(loaded, created);
    }

    #[tokio::test]
    async fn test_append_reaction_grows_by_one() {
        let dir = TempDir::new().expect("temp dir");
        let findings = FindingStore::new(dir.path());
        let session = findings.create(new_finding()).await.expect("create");

        let after_first = findings
            .append_reaction(&session.id, reaction_body("too eager"))
            .await
            .expect("append");
        assert_eq!(after_first.reactions.len(), 1);

        let after_second = findings
            .append_reaction(&session.id, reaction_body("good recovery"))
            .await
            .expect("append");
        assert_eq!(after_second.reactions.len(), 2);

        // Prior entries are byte-for-byte untouched.
        assert_eq!(after_second.reactions[0], after_first.reactions[0]);
        assert_eq!(
            after_second.reactions[0].body.get("note"),
            Some(&serde_json::Value::from("too eager"))
        );
    }

    #[tokio::test]
    async fn test_reflection_set_once() {
        let dir = TempDir::new().expect("temp dir");
        let findings = FindingStore::new(dir.path());
        let session = findings.create(new_finding()).await.expect("create");

        let reflected = findings
            .set_reflection(&session.id, "The twin over-reached twice.")
            .await
            .expect("reflect");
        assert!(reflected.is_reflected());

        let err = findings
            .set_reflection(&session.id, "Second thoughts.")
            .await
            .expect_err("second reflection");
        assert!(matches!(err, FindingError::AlreadyReflected(_)));

        // The first reflection survives.
        let loaded = findings.get(&session.id).await.expect("get");
        assert_eq!(
            loaded.reflection.as_deref(),
            Some("The twin over-reached twice.")
        );
    }

    #[tokio::test]
    async fn test_reactions_still_append_after_reflection() {
        let dir = TempDir::new().expect("temp dir");
        let findings = FindingStore::new(dir.path());
        let session = findings.create(new_finding()).await.expect("create");
        findings
            .set_reflection(&session.id, "done")
            .await
            .expect("reflect");

        let after = findings
            .append_reaction(&session.id, reaction_body("late thought"))
            .await
            .expect("append");
        assert_eq!(after.reactions.len(), 1);
    }

    #[tokio::test]
    async fn test_list_summarizes_sessions() {
        let dir = TempDir::new().expect("temp dir");
        let findings = FindingStore::new(dir.path());

        let a = findings.create(new_finding()).await.expect("create");
        findings
            .append_reaction(&a.id, reaction_body("hm"))
            .await
            .expect("append");
        findings
            .set_reflection(&a.id, "fine")
            .await
            .expect("reflect");

        let summaries = findings.list().await.expect("list");
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].reaction_count, 1);
        assert!(summaries[0].reflected);
    }

    #[tokio::test]
    async fn test_missing_session_is_not_found() {
        let dir = TempDir::new().expect("temp dir");
        let findings = FindingStore::new(dir.path());
        let err = findings.get("session_0").await.expect_err("missing");
        assert!(matches!(err, FindingError::NotFound(_)));
    }
}
