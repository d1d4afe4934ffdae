//! The scenario engine: prompt assembly plus Claude proxying.

use super::prompts::{build_reflection_prompt, build_scenario_prompt};
use crate::findings::FindingSession;
use crate::vignettes::Vignette;
use crate::world::{WorldSetting, WorldThesis};
use claude::{Claude, Message, Request, StreamEvent};
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

/// Errors from scenario generation.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Claude API error: {0}")]
    Api(#[from] claude::Error),

    #[error("No API key configured")]
    NoApiKey,
}

/// Configuration for the scenario engine.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    /// Model override; the client default is used when unset.
    pub model: Option<String>,

    /// Maximum tokens per generated turn.
    pub max_tokens: usize,

    /// Fallback temperature when a vignette has no creativity setting.
    pub temperature: f32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: 2048,
            temperature: 0.7,
        }
    }
}

/// The canon and profile documents a generation reads from.
///
/// Assembled by the caller from the repositories, so the engine itself
/// never touches disk.
#[derive(Debug, Clone, Default)]
pub struct ScenarioContext {
    pub setting: WorldSetting,
    pub thesis: WorldThesis,
    pub pkg: Vec<(String, serde_yaml::Value)>,
}

/// Digital-twin scenario generator over the Claude API.
pub struct ScenarioEngine {
    client: Claude,
    config: ScenarioConfig,
}

impl ScenarioEngine {
    /// Create an engine with an existing client.
    pub fn new(client: Claude) -> Self {
        Self {
            client,
            config: ScenarioConfig::default(),
        }
    }

    /// Create an engine from the ANTHROPIC_API_KEY environment variable.
    pub fn from_env() -> Result<Self, ScenarioError> {
        let client = Claude::from_env().map_err(|_| ScenarioError::NoApiKey)?;
        Ok(Self::new(client))
    }

    /// Configure the engine.
    pub fn with_config(mut self, config: ScenarioConfig) -> Self {
        self.config = config;
        self
    }

    fn build_request(
        &self,
        vignette: &Vignette,
        ctx: &ScenarioContext,
        history: Vec<Message>,
        user_text: &str,
    ) -> Request {
        let system = build_scenario_prompt(&ctx.setting, &ctx.thesis, vignette, &ctx.pkg);

        let mut messages = history;
        messages.push(Message::user(user_text));

        let mut request = Request::new(messages)
            .with_system(system)
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(clamp_creativity(
                vignette.simulation.creativity,
                self.config.temperature,
            ));
        if let Some(model) = &self.config.model {
            request = request.with_model(model.clone());
        }
        request
    }

    /// Generate one twin turn and return the full text.
    pub async fn generate(
        &self,
        vignette: &Vignette,
        ctx: &ScenarioContext,
        history: Vec<Message>,
        user_text: &str,
    ) -> Result<String, ScenarioError> {
        let request = self.build_request(vignette, ctx, history, user_text);
        let response = self.client.complete(request).await?;
        Ok(response.text)
    }

    /// Generate the end-of-session reflection for a finding session.
    pub async fn reflect(&self, session: &FindingSession) -> Result<String, ScenarioError> {
        let prompt = build_reflection_prompt(session);
        let mut request = Request::new(vec![Message::user(prompt)])
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature);
        if let Some(model) = &self.config.model {
            request = request.with_model(model.clone());
        }
        let response = self.client.complete(request).await?;
        Ok(response.text)
    }

    /// Generate one twin turn as a stream of events.
    ///
    /// Dropping the returned stream aborts the upstream request, which is
    /// how client disconnects cancel generation.
    pub async fn stream(
        &self,
        vignette: &Vignette,
        ctx: &ScenarioContext,
        history: Vec<Message>,
        user_text: &str,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<StreamEvent, claude::Error>> + Send>>, ScenarioError>
    {
        let request = self.build_request(vignette, ctx, history, user_text);
        Ok(self.client.stream(request).await?)
    }
}

/// A vignette's creativity drives sampling; out-of-range values fall back
/// to the engine default.
fn clamp_creativity(creativity: f32, fallback: f32) -> f32 {
    if (0.0..=1.0).contains(&creativity) {
        creativity
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_creativity() {
        assert_eq!(clamp_creativity(0.3, 0.7), 0.3);
        assert_eq!(clamp_creativity(0.0, 0.7), 0.0);
        assert_eq!(clamp_creativity(1.5, 0.7), 0.7);
        assert_eq!(clamp_creativity(-0.1, 0.7), 0.7);
    }

    #[test]
    fn test_config_defaults() {
        let config = ScenarioConfig::default();
        assert_eq!(config.max_tokens, 2048);
        assert!(config.model.is_none());
    }
}
