//! Generative-text collaborator for map content.
//!
//! Talks to the Gemini `generateContent` REST endpoint. All calls are
//! blocking, ALWAYS run them in a background thread! Uses `ureq` with a
//! timeout on every request, so a worker never outlives the agent's
//! deadline. Replies are free-form text expected to *contain* a JSON
//! fragment; extraction tries a strict whole-text parse first and falls
//! back to a balanced-bracket scan that honors string literals.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

const TIMEOUT_SECS: u64 = 30;
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Terminal failures of a generation, expansion or chat call.
/// The graph is never touched on any of these.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("API key not configured, set ai_api_key in config.toml")]
    Configuration,
    #[error("network: {0}")]
    Network(String),
    #[error("reply format: {0}")]
    Format(String),
}

/// Seam between the map workspace and the HTTP client, so tests can
/// script replies without a network.
pub trait TextGenerator: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String, AiError>;
}

/// Gemini REST client. One value per request burst; cheap to build.
pub struct GeminiClient {
    agent: ureq::Agent,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build();
        Self {
            agent,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    /// Point the client somewhere else (tests, proxies)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

impl TextGenerator for GeminiClient {
    fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = serde_json::json!({
            "contents": [{"parts": [{"text": prompt}]}]
        });
        tracing::debug!(model = %self.model, "generate request");

        let resp = self
            .agent
            .post(&url)
            .set("content-type", "application/json")
            .send_string(&body.to_string());

        match resp {
            Ok(resp) => {
                let json: serde_json::Value = serde_json::from_reader(resp.into_reader())
                    .map_err(|e| AiError::Format(format!("bad response envelope: {}", e)))?;
                json["candidates"][0]["content"]["parts"][0]["text"]
                    .as_str()
                    .map(|s| s.to_string())
                    .ok_or_else(|| AiError::Format("reply carried no text".into()))
            }
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                let msg: String = body.chars().take(200).collect();
                tracing::warn!(code, "generate request failed");
                Err(AiError::Network(format!("API error {}: {}", code, msg)))
            }
            Err(ureq::Error::Transport(e)) => Err(AiError::Network(e.to_string())),
        }
    }
}

// ═══════════════════════════════════════
//  PROMPTS
// ═══════════════════════════════════════

pub fn outline_prompt(topic: &str) -> String {
    format!(
        r#"Create a mind map structure for the topic "{topic}".
Reply with a JSON object shaped exactly like:
{{"mainConcepts": ["FIRST", "SECOND"], "subConcepts": {{"FIRST": ["SUB ONE", "SUB TWO"]}}}}
Give 4-6 main concepts, each with 2-4 sub-concepts. Keep every concept
short (1-3 words) and uppercase. Reply with only the JSON object."#,
    )
}

pub fn expand_prompt(concept: &str) -> String {
    format!(
        r#"List 3-6 concepts closely related to "{concept}" for a mind map.
Reply with only a JSON array of short uppercase strings (1-3 words each),
for example ["FIRST IDEA", "SECOND IDEA", "THIRD IDEA"]."#,
    )
}

pub fn chat_prompt(map_name: &str, concept: &str, question: &str) -> String {
    format!(
        r#"You are helping with a mind map called "{map_name}".
The user selected the concept "{concept}" and asks: {question}
Answer in 2-3 short sentences of plain text. No JSON, no markdown."#,
    )
}

// ═══════════════════════════════════════
//  REPLY PARSING
// ═══════════════════════════════════════

/// The whole-map generation contract: main concepts plus a sub-concept
/// list per main, keyed by the main's name as the model wrote it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOutline {
    pub main_concepts: Vec<String>,
    pub sub_concepts: HashMap<String, Vec<String>>,
}

/// Parses a whole-map generation reply
pub fn parse_outline(reply: &str) -> Result<MapOutline, AiError> {
    let outline: MapOutline = extract_json(reply)?;
    if outline.main_concepts.is_empty() {
        return Err(AiError::Format("no main concepts in reply".into()));
    }
    Ok(outline)
}

/// Parses an expansion reply (array of concept names)
pub fn parse_concepts(reply: &str) -> Result<Vec<String>, AiError> {
    let concepts: Vec<String> = extract_json(reply)?;
    if concepts.is_empty() {
        return Err(AiError::Format("empty concept list".into()));
    }
    Ok(concepts)
}

/// Strict whole-text parse first, then the first balanced `{...}` or
/// `[...]` fragment. Anything that still doesn't match the expected
/// shape is a format failure.
fn extract_json<T: DeserializeOwned>(text: &str) -> Result<T, AiError> {
    if let Ok(value) = serde_json::from_str::<T>(text.trim()) {
        return Ok(value);
    }
    let fragment = first_balanced_fragment(text)
        .ok_or_else(|| AiError::Format("no JSON fragment in reply".into()))?;
    serde_json::from_str(fragment).map_err(|e| AiError::Format(e.to_string()))
}

/// Finds the first balanced bracket fragment, ignoring brackets inside
/// JSON string literals and escape sequences
fn first_balanced_fragment(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let bytes = text.as_bytes();
    let open = bytes[start];
    let close = if open == b'{' { b'}' } else { b']' };
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        if b == b'"' {
            in_string = true;
        } else if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(&text[start..=i]);
            }
        }
    }
    None
}
