//! Generative-language chat client with ranked model/version fallback.

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use nimbus_core::{defaults, ChatBackend, ChatTurn, Error, Result};

use crate::catalog::{ModelCache, ModelCatalog};
use crate::ranking::rank_candidates;
use crate::sanitize::{sanitize_reply, vendor_pattern};

/// Fixed system instruction sent with every generation request.
///
/// The assistant must never disclose the upstream vendor; when asked
/// about its internals it gives the canned product answer instead.
const SYSTEM_INSTRUCTION: &str = "You are the built-in assistant of Nimbus, a note-taking \
workspace. Be concise and helpful. Never reveal which company, vendor, model, or API powers \
you. If asked what you run on, who made you, or what model you are, answer exactly: \"I'm the \
Nimbus assistant, running on the Nimbus AI stack.\" and nothing more about your internals.";

/// One attempt target in the fallback sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptTarget {
    pub model: String,
    pub api_version: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: WireContent,
    contents: Vec<WireContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireContent {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    role: String,
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WirePart {
    #[serde(default)]
    text: String,
}

impl WireContent {
    fn new(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![WirePart {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<WireContent>,
}

/// Chat client for the generative-language provider.
///
/// Each request builds a ranked candidate list (configured preferred
/// model, static fallbacks, cached catalog discoveries), then walks the
/// candidates × API versions cross product until one attempt yields a
/// non-empty reply. There are no fixed-delay retries; failure means
/// moving to the next target.
pub struct ChatClient {
    client: Client,
    base_url: String,
    api_key: String,
    preferred_model: String,
    fallback_models: Vec<String>,
    catalog: ModelCatalog,
    sanitizer: Regex,
}

impl ChatClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        preferred_model: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        let api_key = api_key.into();
        let client = Client::builder()
            .timeout(Duration::from_secs(defaults::CHAT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            catalog: ModelCatalog::new(
                client.clone(),
                base_url.clone(),
                api_key.clone(),
                Duration::from_secs(defaults::MODEL_CACHE_TTL_SECS),
            ),
            client,
            base_url,
            api_key,
            preferred_model: preferred_model.into(),
            fallback_models: defaults::AI_FALLBACK_MODELS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            sanitizer: vendor_pattern(),
        }
    }

    /// Create from environment variables. `GEMINI_API_KEY` is required;
    /// `NIMBUS_AI_MODEL` and `NIMBUS_AI_BASE_URL` override the defaults.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| Error::Config("GEMINI_API_KEY is not set".to_string()))?;
        let base_url = std::env::var("NIMBUS_AI_BASE_URL")
            .unwrap_or_else(|_| defaults::AI_BASE_URL.to_string());
        let model =
            std::env::var("NIMBUS_AI_MODEL").unwrap_or_else(|_| defaults::AI_MODEL.to_string());
        Ok(Self::new(base_url, api_key, model))
    }

    /// Replace the static fallback list.
    pub fn with_fallback_models(mut self, models: Vec<String>) -> Self {
        self.fallback_models = models;
        self
    }

    /// Replace the discovery cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.catalog = ModelCatalog::new(
            self.client.clone(),
            self.base_url.clone(),
            self.api_key.clone(),
            ttl,
        );
        self
    }

    /// Seed the discovery cache, skipping the first catalog round-trip.
    pub fn warm_cache(&self, models: Vec<String>) {
        self.catalog.set_cache(ModelCache::warm(models));
    }

    /// The ordered (model, API version) attempt plan for one request.
    async fn attempt_plan(&self) -> Vec<AttemptTarget> {
        let discovered = self.catalog.generation_models().await;
        let candidates = rank_candidates(
            &self.preferred_model,
            &self.fallback_models,
            &discovered,
            defaults::AI_CANDIDATE_CAP,
        );

        candidates
            .into_iter()
            .flat_map(|model| {
                defaults::AI_API_VERSIONS
                    .iter()
                    .map(move |version| AttemptTarget {
                        model: model.clone(),
                        api_version: version,
                    })
            })
            .collect()
    }

    /// Map the trailing history window plus the new message into the
    /// provider's role vocabulary.
    fn build_contents(message: &str, history: &[ChatTurn]) -> Vec<WireContent> {
        let window_start = history.len().saturating_sub(defaults::CHAT_HISTORY_TURNS);
        let mut contents: Vec<WireContent> = history[window_start..]
            .iter()
            .map(|turn| {
                let role = if turn.role == "assistant" {
                    "model"
                } else {
                    "user"
                };
                WireContent::new(role, &turn.content)
            })
            .collect();
        contents.push(WireContent::new("user", message));
        contents
    }

    /// Issue a single generation request. `Ok(None)` means the provider
    /// answered but produced no usable text; both that and `Err` advance
    /// the fallback loop.
    async fn attempt_generate(
        &self,
        target: &AttemptTarget,
        contents: &[WireContent],
    ) -> Result<Option<String>> {
        let url = format!(
            "{}/{}/models/{}:generateContent?key={}",
            self.base_url, target.api_version, target.model, self.api_key
        );

        let request = GenerateRequest {
            system_instruction: WireContent {
                role: String::new(),
                parts: vec![WirePart {
                    text: SYSTEM_INSTRUCTION.to_string(),
                }],
            },
            contents: contents.to_vec(),
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::Provider(format!(
                "{} ({}) returned {}",
                target.model, target.api_version, status
            )));
        }

        let body: GenerateResponse = response.json().await?;
        let text = body
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let text = text.trim().to_string();
        Ok(if text.is_empty() { None } else { Some(text) })
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    #[instrument(skip(self, message, history), fields(subsystem = "ai", component = "chat", op = "generate", history_len = history.len()))]
    async fn chat(&self, message: &str, history: &[ChatTurn]) -> Result<String> {
        let contents = Self::build_contents(message, history);
        let plan = self.attempt_plan().await;

        let mut last_error = Error::Provider("no candidate models available".to_string());
        for (attempt, target) in plan.iter().enumerate() {
            match self.attempt_generate(target, &contents).await {
                Ok(Some(reply)) => {
                    debug!(
                        model = %target.model,
                        api_version = target.api_version,
                        attempt = attempt + 1,
                        "Chat reply generated"
                    );
                    return Ok(sanitize_reply(&self.sanitizer, &reply));
                }
                Ok(None) => {
                    warn!(
                        model = %target.model,
                        api_version = target.api_version,
                        "Empty reply, trying next candidate"
                    );
                    last_error = Error::Provider(format!(
                        "{} ({}) returned an empty reply",
                        target.model, target.api_version
                    ));
                }
                Err(e) => {
                    warn!(
                        model = %target.model,
                        api_version = target.api_version,
                        error = %e,
                        "Attempt failed, trying next candidate"
                    );
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}
