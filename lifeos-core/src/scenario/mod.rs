//! Scenario generation: the digital-twin chat over the world canon.
//!
//! The engine assembles a system prompt from the world documents, the
//! synthetic user's PKG, and a vignette, then proxies the Claude API —
//! one-shot for the generator routes, streaming for the chat relay.
//! Conversations and flagged corrections are logged append-only.

mod cache;
mod engine;
mod logs;
mod prompts;

pub use cache::GenerationCache;
pub use engine::{ScenarioConfig, ScenarioContext, ScenarioEngine, ScenarioError};
pub use logs::{
    Conversation, ConversationMessage, ConversationStore, ConversationSummary, Correction,
    CorrectionStore, LogError, NewCorrection,
};
