use crate::models::{MoodValue, RelayReply, RelayRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

pub const RELAY_FALLBACK: &str = "AI couldn't respond right now — but you're doing great ❤️";
pub const EMPTY_GENERATION: &str = "I'm here with you, even if I couldn't generate a reply ❤️";

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("no API key configured")]
    Unconfigured,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Opaque text-generation boundary.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns `Ok(None)` when the provider answered without any text.
    async fn generate(&self, prompt: &str) -> Result<Option<String>, GenerationError>;
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// Client for the Generative Language `generateContent` REST call.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    settings: GeminiSettings,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [PromptPart<'a>; 1],
}

#[derive(Serialize)]
struct PromptPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { http, settings })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, GenerationError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(GenerationError::Unconfigured)?;

        let body = GenerateRequest {
            contents: [Content {
                parts: [PromptPart { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status { status, body });
        }

        let parsed: GenerateResponse = response.json().await?;
        Ok(parsed.text())
    }
}

fn mood_description(mood_value: i64) -> String {
    match MoodValue::try_from(mood_value) {
        Ok(mood) => format!("{} ({})", mood.label(), mood.glyph()),
        Err(_) => mood_value.to_string(),
    }
}

pub fn build_prompt(request: &RelayRequest) -> String {
    let note = request.note.trim();
    let note = if note.is_empty() { "(no note)" } else { note };

    format!(
        r#"User mood rating: {mood}
User note: "{note}"

Respond to the user with a single paragraph, following these steps:

1. A warm, supportive emotional reflection based on their mood and note.
2. Identify the likely emotion behind their experience (e.g., 'It sounds like you're feeling a bit of relief').
3. Give 1–2 small, actionable, practical tips they can try right now.

Tone must be friendly, kind, non-judgmental, and **do not mention AI or that you are a model.**
"#,
        mood = mood_description(request.mood_value),
    )
}

/// Produces the reply for a check-in. Never fails.
pub async fn relay_reply(generator: &dyn TextGenerator, request: &RelayRequest) -> RelayReply {
    info!(mood = request.mood_value, note_len = request.note.len(), "relaying check-in");

    let reply = match generator.generate(&build_prompt(request)).await {
        Ok(Some(text)) => {
            info!(reply_len = text.len(), "generation received");
            text
        }
        Ok(None) => {
            warn!("generation returned no text");
            EMPTY_GENERATION.to_string()
        }
        Err(err) => {
            warn!(error = %err, "generation failed, using fallback reply");
            RELAY_FALLBACK.to_string()
        }
    };

    RelayReply { reply: Some(reply) }
}
