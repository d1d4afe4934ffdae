//! Open questions: unresolved design threads attached to the canon.
//!
//! All questions live in one YAML collection document; each mutation
//! rewrites the file. Status toggles between open and resolved.

use crate::ids::{next_item_id, today_iso};
use crate::store::{self, StoreError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from question operations.
#[derive(Debug, thiserror::Error)]
pub enum QuestionError {
    #[error("open question not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    Open,
    Resolved,
}

/// A single open question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenQuestion {
    pub id: String,
    pub name: String,
    pub status: QuestionStatus,
    /// Domain id this question belongs to, if any.
    #[serde(default)]
    pub domain: Option<String>,
    pub question: String,
    #[serde(default)]
    pub notes: String,
    pub created: String,
}

/// Fields for creating a question; id, status, and created are assigned.
#[derive(Debug, Clone, Deserialize)]
pub struct NewQuestion {
    pub name: String,
    #[serde(default)]
    pub domain: Option<String>,
    pub question: String,
    #[serde(default)]
    pub notes: String,
}

/// Partial update; only present fields are replaced.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionPatch {
    pub name: Option<String>,
    pub status: Option<QuestionStatus>,
    pub domain: Option<Option<String>>,
    pub question: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct QuestionsFile {
    #[serde(default)]
    questions: Vec<OpenQuestion>,
}

/// Accessor for the open-questions collection.
#[derive(Debug, Clone)]
pub struct QuestionStore {
    root: PathBuf,
}

impl QuestionStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            root: data_dir.as_ref().to_path_buf(),
        }
    }

    fn path(&self) -> PathBuf {
        self.root.join("world").join("open-questions.yaml")
    }

    async fn load(&self) -> Result<QuestionsFile, StoreError> {
        match store::read_yaml(self.path()).await {
            Ok(file) => Ok(file),
            Err(e) if e.is_not_found() => Ok(QuestionsFile::default()),
            Err(e) => Err(e),
        }
    }

    async fn save(&self, file: &QuestionsFile) -> Result<(), StoreError> {
        store::write_yaml(self.path(), file).await
    }

    /// All questions, in stored order.
    pub async fn list(&self) -> Result<Vec<OpenQuestion>, StoreError> {
        Ok(self.load().await?.questions)
    }

    /// Replace the whole collection; used by snapshot restore.
    pub async fn save_all(&self, questions: Vec<OpenQuestion>) -> Result<(), StoreError> {
        self.save(&QuestionsFile { questions }).await
    }

    pub async fn get(&self, id: &str) -> Result<OpenQuestion, QuestionError> {
        self.load()
            .await?
            .questions
            .into_iter()
            .find(|q| q.id == id)
            .ok_or_else(|| QuestionError::NotFound(id.to_string()))
    }

    /// Create a question with the next free `question-<n>` id.
    pub async fn create(&self, new: NewQuestion) -> Result<OpenQuestion, QuestionError> {
        let mut file = self.load().await?;
        let id = next_item_id(file.questions.iter().map(|q| q.id.as_str()), "questions");
        let question = OpenQuestion {
            id,
            name: new.name,
            status: QuestionStatus::Open,
            domain: new.domain,
            question: new.question,
            notes: new.notes,
            created: today_iso(),
        };
        file.questions.push(question.clone());
        self.save(&file).await?;
        Ok(question)
    }

    pub async fn update(&self, id: &str, patch: QuestionPatch) -> Result<OpenQuestion, QuestionError> {
        let mut file = self.load().await?;
        let question = file
            .questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| QuestionError::NotFound(id.to_string()))?;

        if let Some(name) = patch.name {
            question.name = name;
        }
        if let Some(status) = patch.status {
            question.status = status;
        }
        if let Some(domain) = patch.domain {
            question.domain = domain;
        }
        if let Some(text) = patch.question {
            question.question = text;
        }
        if let Some(notes) = patch.notes {
            question.notes = notes;
        }

        let updated = question.clone();
        self.save(&file).await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), QuestionError> {
        let mut file = self.load().await?;
        let before = file.questions.len();
        file.questions.retain(|q| q.id != id);
        if file.questions.len() == before {
            return Err(QuestionError::NotFound(id.to_string()));
        }
        self.save(&file).await?;
        Ok(())
    }
}
