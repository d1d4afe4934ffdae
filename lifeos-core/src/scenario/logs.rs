//! Append-only conversation and correction logs.
//!
//! One JSON file per conversation (`conv_<millis>`) and per flagged
//! correction (`corr_<millis>`). Both are mutated only by appending;
//! nothing edits or deletes a logged message.

use crate::ids::{now_iso, timestamp_id};
use crate::store::{self, StoreError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Errors from log operations.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("conversation not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One logged chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: String,
    pub content: String,
    pub at: String,
}

/// A scenario chat conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub vignette_id: Option<String>,
    pub created: String,
    #[serde(default)]
    pub messages: Vec<ConversationMessage>,
}

/// Summary row for the conversation listing.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    pub id: String,
    pub vignette_id: Option<String>,
    pub created: String,
    pub message_count: usize,
}

/// A flagged correction to something the twin said.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub id: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// The twin output being corrected.
    pub flagged: String,
    /// What should have been true instead.
    pub note: String,
    pub created: String,
}

/// Fields for logging a correction; id and created are assigned.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCorrection {
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub flagged: String,
    pub note: String,
}

/// Accessor for conversation logs.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    root: PathBuf,
}

impl ConversationStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            root: data_dir.as_ref().to_path_buf(),
        }
    }

    fn dir(&self) -> PathBuf {
        self.root.join("conversations")
    }

    fn path(&self, id: &str) -> PathBuf {
        self.dir().join(format!("{id}.json"))
    }

    /// Start a new conversation log.
    pub async fn create(&self, vignette_id: Option<String>) -> Result<Conversation, StoreError> {
        let conversation = Conversation {
            id: timestamp_id("conv"),
            vignette_id,
            created: now_iso(),
            messages: Vec::new(),
        };
        store::write_json(self.path(&conversation.id), &conversation).await?;
        Ok(conversation)
    }

    pub async fn get(&self, id: &str) -> Result<Conversation, LogError> {
        match store::read_json(self.path(id)).await {
            Ok(conversation) => Ok(conversation),
            Err(e) if e.is_not_found() => Err(LogError::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Conversation summaries, newest first.
    pub async fn list(&self) -> Result<Vec<ConversationSummary>, StoreError> {
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
                match store::read_json::<Conversation>(&path).await {
                    Ok(conversation) => summaries.push(ConversationSummary {
                        id: conversation.id.clone(),
                        vignette_id: conversation.vignette_id.clone(),
                        created: conversation.created.clone(),
                        message_count: conversation.messages.len(),
                    }),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping unreadable conversation")
                    }
                }
            }
        }

        summaries.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(summaries)
    }

    /// Append one message to a conversation.
    pub async fn append(
        &self,
        id: &str,
        role: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Conversation, LogError> {
        let mut conversation = self.get(id).await?;
        conversation.messages.push(ConversationMessage {
            role: role.into(),
            content: content.into(),
            at: now_iso(),
        });
        store::write_json(self.path(id), &conversation).await?;
        Ok(conversation)
    }
}

/// Accessor for correction logs.
#[derive(Debug, Clone)]
pub struct CorrectionStore {
    root: PathBuf,
}

impl CorrectionStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            root: data_dir.as_ref().to_path_buf(),
        }
    }

    fn dir(&self) -> PathBuf {
        self.root.join("corrections")
    }

    /// Log one correction.
    pub async fn create(&self, new: NewCorrection) -> Result<Correction, StoreError> {
        let correction = Correction {
            id: timestamp_id("corr"),
            conversation_id: new.conversation_id,
            flagged: new.flagged,
            note: new.note,
            created: now_iso(),
        };
        store::write_json(
            self.dir().join(format!("{}.json", correction.id)),
            &correction,
        )
        .await?;
        Ok(correction)
    }

    /// Every logged correction, newest first.
    pub async fn list(&self) -> Result<Vec<Correction>, StoreError> {
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

        let mut corrections = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| StoreError::Io {
            path: self.dir(),
            source: e,
        })? {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match store::read_json::<Correction>(&path).await {
                    Ok(correction) => corrections.push(correction),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping unreadable correction")
                    }
                }
            }
        }

        corrections.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(corrections)
    }
}
