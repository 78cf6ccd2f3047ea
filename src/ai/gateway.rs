// Gemini completion gateway. One outbound call per request, no retries;
// failures are reported as typed errors so the normalizer can pick the
// matching fallback.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Gateway failure taxonomy. `Unconfigured` is a standing state, not the
/// result of an attempted call; the other variants are per-call failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no API key configured")]
    Unconfigured,
    #[error("request to model service failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model service returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("model service returned no text")]
    EmptyResponse,
}

/// Client for the external text-generation service. Constructed once at
/// startup and shared across requests; holds no mutable state.
pub struct NexusClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<TextPart>,
}

#[derive(Serialize)]
struct TextPart {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl NexusClient {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        NexusClient {
            http: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    /// Whether a credential is provisioned. Reported by /api/health.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send a composed instruction to the model and return the raw text
    /// of the first candidate. With `json_mode` the service is asked for
    /// strict JSON output; the text is still returned unparsed.
    pub async fn generate(
        &self,
        instruction: &str,
        json_mode: bool,
    ) -> Result<String, GatewayError> {
        let Some(api_key) = &self.api_key else {
            return Err(GatewayError::Unconfigured);
        };

        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![TextPart {
                    text: instruction.to_string(),
                }],
            }],
            generation_config: json_mode.then_some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        };

        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_API_BASE, self.model, api_key
        );

        let response = self
            .http
            .post(&url)
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api { status, message });
        }

        let body: GenerateResponse = response.json().await?;

        if let Some(error) = body.error {
            return Err(GatewayError::Api {
                status: 200,
                message: error.message,
            });
        }

        let mut text = String::new();
        if let Some(candidate) = body.candidates.into_iter().flatten().next() {
            for part in candidate.content.parts {
                if let Some(t) = part.text {
                    text.push_str(&t);
                }
            }
        }

        if text.is_empty() {
            return Err(GatewayError::EmptyResponse);
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_client_reports_state() {
        let client = NexusClient::new(None, "gemini-2.0-flash".to_string());
        assert!(!client.is_configured());

        let client = NexusClient::new(Some("key".to_string()), "gemini-2.0-flash".to_string());
        assert!(client.is_configured());
    }

    #[tokio::test]
    async fn test_generate_without_key_is_unconfigured() {
        let client = NexusClient::new(None, "gemini-2.0-flash".to_string());
        let err = client.generate("hello", false).await.unwrap_err();
        assert!(matches!(err, GatewayError::Unconfigured));
    }

    #[test]
    fn test_json_mode_sets_mime_type() {
        let request = GenerateRequest {
            contents: vec![],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );

        let request = GenerateRequest {
            contents: vec![],
            generation_config: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("generationConfig").is_none());
    }
}
