use std::time::Duration;

use engine::{DialogueGenerator, DialogueRequest, HISTORY_WINDOW};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub(crate) const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub(crate) const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) const MISSING_KEY_REPLY: &str = "I cannot speak... (Missing API Key)";
pub(crate) const API_ERROR_REPLY: &str = "The spirits are silent today... (API Error)";
pub(crate) const EMPTY_REPLY: &str = "...";

const TEMPERATURE: f32 = 0.7;
const MAX_OUTPUT_TOKENS: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GeminiConfig {
    pub(crate) api_key: Option<String>,
    pub(crate) model: String,
    pub(crate) base_url: String,
    pub(crate) timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum GeminiError {
    #[error("no API key configured")]
    MissingKey,
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("decode response at {path}: {message}")]
    Decode { path: String, message: String },
    #[error("response contained no text")]
    EmptyResponse,
}

/// Dialogue collaborator backed by the Gemini `generateContent` endpoint.
/// Runs on the dispatcher's worker threads and never fails outward.
#[derive(Debug)]
pub(crate) struct GeminiDialogue {
    config: GeminiConfig,
    agent: ureq::Agent,
}

impl GeminiDialogue {
    pub(crate) fn new(config: GeminiConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Self { config, agent }
    }

    /// Request URL. The API key goes in the `x-goog-api-key` header and
    /// must never appear here.
    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn request_reply(&self, request: &DialogueRequest) -> Result<String, GeminiError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(GeminiError::MissingKey)?;

        let body = GenerateContentRequest::from_dialogue(request);
        let response = self
            .agent
            .post(&self.endpoint())
            .set("Content-Type", "application/json")
            .set("x-goog-api-key", api_key)
            .send_json(&body)
            .map_err(convert_error)?;
        let raw = response
            .into_string()
            .map_err(|error| GeminiError::Transport(error.to_string()))?;
        parse_reply(&raw)
    }

    fn reply_or_fallback(result: Result<String, GeminiError>, character: &str) -> String {
        match result {
            Ok(text) => text,
            Err(GeminiError::MissingKey) => MISSING_KEY_REPLY.to_string(),
            Err(GeminiError::EmptyResponse) => EMPTY_REPLY.to_string(),
            Err(error) => {
                warn!(character, error = %error, "dialogue_generation_failed");
                API_ERROR_REPLY.to_string()
            }
        }
    }
}

impl DialogueGenerator for GeminiDialogue {
    fn generate(&self, request: &DialogueRequest) -> String {
        debug!(
            character = %request.character_name,
            model = %self.config.model,
            history_turns = request.history.len(),
            "dialogue_generation_started"
        );
        Self::reply_or_fallback(self.request_reply(request), &request.character_name)
    }
}

fn convert_error(error: ureq::Error) -> GeminiError {
    match error {
        ureq::Error::Status(status, response) => GeminiError::Status {
            status,
            body: response.into_string().unwrap_or_default(),
        },
        other => GeminiError::Transport(other.to_string()),
    }
}

pub(crate) fn system_instruction(request: &DialogueRequest) -> String {
    format!(
        "You are an NPC named {} in a retro adventure game. Context: {}. \
         Keep your response short (max 2 sentences), immersive, and in-character. \
         Do not use markdown. Do not include quotes.",
        request.character_name, request.character_context
    )
}

pub(crate) fn build_prompt(request: &DialogueRequest) -> String {
    let start = request.history.len().saturating_sub(HISTORY_WINDOW);
    let history = request.history[start..]
        .iter()
        .map(|turn| format!("{}: {}", turn.speaker, turn.text))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Current conversation history:\n{history}\n\nPlayer Input: \"{}\"",
        request.player_action
    )
}

fn parse_reply(raw: &str) -> Result<String, GeminiError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let response: GenerateContentResponse = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|error| GeminiError::Decode {
            path: error.path().to_string(),
            message: error.into_inner().to_string(),
        })?;

    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
        return Err(GeminiError::EmptyResponse);
    }
    Ok(text.to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn from_dialogue(request: &DialogueRequest) -> Self {
        Self {
            system_instruction: Content::text(None, system_instruction(request)),
            contents: vec![Content::text(Some("user"), build_prompt(request))],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: String) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part { text: Some(text) }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[cfg(test)]
mod tests {
    use engine::DialogueHistory;

    use super::*;

    fn elder_request(history: &DialogueHistory) -> DialogueRequest {
        DialogueRequest::new("Elder Oric", Some("Keeper of the village"), history)
    }

    #[test]
    fn prompt_lists_recent_turns_then_player_input() {
        let mut history = DialogueHistory::default();
        for index in 0..6 {
            history.push("Guard", format!("line {index}"));
        }
        let prompt = build_prompt(&elder_request(&history));
        assert!(!prompt.contains("line 1"));
        assert!(prompt.contains("Guard: line 2\nGuard: line 3\nGuard: line 4\nGuard: line 5"));
        assert!(prompt.ends_with("Player Input: \"Hello!\""));
    }

    #[test]
    fn system_instruction_names_character_and_context() {
        let instruction = system_instruction(&elder_request(&DialogueHistory::default()));
        assert!(instruction.starts_with("You are an NPC named Elder Oric"));
        assert!(instruction.contains("Context: Keeper of the village."));
        assert!(instruction.contains("Do not use markdown."));
    }

    #[test]
    fn request_body_uses_camel_case_fields() {
        let body = GenerateContentRequest::from_dialogue(&elder_request(
            &DialogueHistory::default(),
        ));
        let json = serde_json::to_value(&body).expect("serializes");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 100);
        assert_eq!(json["contents"][0]["role"], "user");
        assert!(json["systemInstruction"].get("role").is_none());
        assert!(json["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .is_some_and(|text| text.contains("Elder Oric")));
    }

    #[test]
    fn missing_key_returns_fallback_without_network() {
        let collaborator = GeminiDialogue::new(GeminiConfig::default());
        let reply = collaborator.generate(&elder_request(&DialogueHistory::default()));
        assert_eq!(reply, MISSING_KEY_REPLY);
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let collaborator = GeminiDialogue::new(GeminiConfig {
            api_key: Some("  ".to_string()),
            ..GeminiConfig::default()
        });
        let reply = collaborator.generate(&elder_request(&DialogueHistory::default()));
        assert_eq!(reply, MISSING_KEY_REPLY);
    }

    #[test]
    fn parses_candidate_text() {
        let raw = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Greetings, "},{"text":"traveller."}]}}]}"#;
        assert_eq!(parse_reply(raw).expect("reply"), "Greetings, traveller.");
    }

    #[test]
    fn empty_candidates_map_to_ellipsis() {
        let result = parse_reply(r#"{"candidates":[]}"#);
        assert!(matches!(result, Err(GeminiError::EmptyResponse)));
        assert_eq!(
            GeminiDialogue::reply_or_fallback(result, "Guard"),
            EMPTY_REPLY
        );
    }

    #[test]
    fn malformed_json_reports_path_and_falls_back() {
        let result = parse_reply(r#"{"candidates":[{"content":{"parts":[{"text":5}]}}]}"#);
        match &result {
            Err(GeminiError::Decode { path, .. }) => {
                assert!(path.starts_with("candidates[0]"), "{path}");
                assert!(path.ends_with("text"), "{path}");
            }
            other => panic!("expected decode error, got {other:?}"),
        }
        assert_eq!(
            GeminiDialogue::reply_or_fallback(result, "Guard"),
            API_ERROR_REPLY
        );
    }

    #[test]
    fn endpoint_names_model_without_credentials() {
        let collaborator = GeminiDialogue::new(GeminiConfig {
            api_key: Some("abc".to_string()),
            base_url: "http://localhost:9/v1/".to_string(),
            ..GeminiConfig::default()
        });
        assert_eq!(
            collaborator.endpoint(),
            "http://localhost:9/v1/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn transport_failure_does_not_expose_api_key() {
        let collaborator = GeminiDialogue::new(GeminiConfig {
            api_key: Some("SUPERSECRETKEY".to_string()),
            base_url: "http://127.0.0.1:9/v1".to_string(),
            timeout: Duration::from_secs(2),
            ..GeminiConfig::default()
        });
        let request = elder_request(&DialogueHistory::default());

        let error = collaborator
            .request_reply(&request)
            .expect_err("nothing listens on the discard port");
        let message = error.to_string();
        assert!(!message.contains("SUPERSECRETKEY"), "{message}");

        assert_eq!(collaborator.generate(&request), API_ERROR_REPLY);
    }
}
