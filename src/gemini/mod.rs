//! Direct REST client for the Gemini `generateContent` endpoint.
//!
//! One client instance is built at startup from the `GEMINI_API_KEY`
//! credential and reused for every turn. Requests are non-streaming: one
//! HTTP round trip per completion.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Fixed sampling parameters sent with every completion request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.6,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 2048,
        }
    }
}

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Gemini API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Gemini API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse Gemini response: {0}")]
    InvalidResponse(String),

    #[error("Gemini API returned no text in the response candidates")]
    EmptyResponse,
}

/// Handle to the hosted model: identifier, sampling parameters and the
/// shared HTTP client. Immutable once constructed.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    generation_config: GenerationConfig,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            generation_config: GenerationConfig::default(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one completion request and returns the generated text verbatim.
    ///
    /// Never panics: transport failures, non-success statuses, undecodable
    /// bodies and empty candidate lists all surface as [`GeminiError`].
    pub async fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
        let url = format!(
            "{BASE_URL}/{model}:generateContent?key={api_key}",
            model = self.model,
            api_key = self.api_key
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: self.generation_config,
        };

        let response = self.client.post(url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body));
        }

        let body = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|err| GeminiError::InvalidResponse(err.to_string()))?;

        extract_text(parsed)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text(response: GenerateContentResponse) -> Result<String, GeminiError> {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or(GeminiError::EmptyResponse)
}

fn map_http_error(status: StatusCode, body: String) -> GeminiError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or(body);

    GeminiError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_generation_config_matches_fixed_parameters() {
        let config = GenerationConfig::default();
        assert_eq!(config.temperature, 0.6);
        assert_eq!(config.top_p, 0.8);
        assert_eq!(config.top_k, 40);
        assert_eq!(config.max_output_tokens, 2048);
    }

    #[test]
    fn generation_config_is_idempotent() {
        assert_eq!(GenerationConfig::default(), GenerationConfig::default());
    }

    #[test]
    fn clients_share_identical_configuration() {
        let first = GeminiClient::new("key-a");
        let second = GeminiClient::new("key-a");
        assert_eq!(first.generation_config, second.generation_config);
        assert_eq!(first.model(), DEFAULT_MODEL);
        assert_eq!(first.model(), second.model());
    }

    #[test]
    fn request_serializes_to_wire_format() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: "Olá".to_string(),
                }],
            }],
            generation_config: GenerationConfig::default(),
        };

        let body = serde_json::to_value(&request).expect("request should serialize");
        assert_eq!(body["contents"][0]["role"], json!("user"));
        assert_eq!(body["contents"][0]["parts"][0]["text"], json!("Olá"));
        assert_eq!(body["generationConfig"]["temperature"], json!(0.6));
        assert_eq!(body["generationConfig"]["topP"], json!(0.8));
        assert_eq!(body["generationConfig"]["topK"], json!(40));
        assert_eq!(body["generationConfig"]["maxOutputTokens"], json!(2048));
    }

    #[test]
    fn extract_text_returns_first_candidate_text() {
        let payload = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Resposta gerada"}], "role": "model"}}
            ]
        }"#;
        let response: GenerateContentResponse =
            serde_json::from_str(payload).expect("fixture should parse");

        let text = extract_text(response).expect("candidate text should be extracted");
        assert_eq!(text, "Resposta gerada");
    }

    #[test]
    fn extract_text_skips_partless_leading_parts() {
        let payload = r#"{
            "candidates": [
                {"content": {"parts": [{}, {"text": "segunda parte"}]}}
            ]
        }"#;
        let response: GenerateContentResponse =
            serde_json::from_str(payload).expect("fixture should parse");

        let text = extract_text(response).expect("first text part should be used");
        assert_eq!(text, "segunda parte");
    }

    #[test]
    fn missing_candidates_map_to_empty_response() {
        let response: GenerateContentResponse =
            serde_json::from_str("{}").expect("empty body should parse");

        assert!(matches!(
            extract_text(response),
            Err(GeminiError::EmptyResponse)
        ));
    }

    #[test]
    fn http_error_prefers_structured_message() {
        let body = r#"{"error": {"message": "quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, body.to_string());

        match err {
            GeminiError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "RESOURCE_EXHAUSTED: quota exceeded");
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn http_error_falls_back_to_raw_body() {
        let err = map_http_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "<html>backend unavailable</html>".to_string(),
        );

        match err {
            GeminiError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "<html>backend unavailable</html>");
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }
}
