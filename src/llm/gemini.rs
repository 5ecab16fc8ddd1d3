/// Hosted Gemini client using the `generateContent` REST endpoint.
///
/// `POST {base}/v1beta/models/{model}:generateContent?key={api_key}` with a
/// single user turn. The reply text is the concatenation of the text parts
/// of the first candidate.
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use super::CompletionModel;
use crate::config::schema::ModelConfig;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, or the reason there is none.
    fn into_text(self) -> Result<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(anyhow!("prompt blocked by the model: {reason}"));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("model returned no candidates"))?;

        Ok(candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous client for the hosted Gemini API.
///
/// The API key is resolved when the client is built. A missing key does not
/// prevent construction; every call then fails, which callers turn into
/// their fallback values.
#[derive(Debug)]
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
    temperature: f64,
    timeout: Duration,
}

impl GeminiClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            base_url: config.gemini_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key(),
            api_key_env: config.api_key_env.clone(),
            temperature: config.temperature,
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Whether an API key was found in the environment.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

impl CompletionModel for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            anyhow::bail!("{} is not set", self.api_key_env);
        };

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let resp = ureq::post(&self.endpoint())
            .query("key", api_key)
            .timeout(self.timeout)
            .send_json(&body)
            .map_err(describe_error)
            .context("Gemini generateContent request failed")?;

        let parsed: GenerateContentResponse = resp
            .into_json()
            .context("failed to parse Gemini generateContent response")?;

        parsed.into_text()
    }
}

/// Keep the API's own error message for non-2xx responses.
fn describe_error(err: ureq::Error) -> anyhow::Error {
    match err {
        ureq::Error::Status(code, resp) => {
            let detail = resp
                .into_json::<serde_json::Value>()
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .unwrap_or_else(|| "no error detail".to_string());
            anyhow!("HTTP {code}: {detail}")
        }
        other => anyhow!(other),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn client_without_key() -> GeminiClient {
        let mut config = ModelConfig::default();
        config.api_key_env = "INSIGHTDASH_TEST_UNSET_KEY".to_string();
        GeminiClient::from_config(&config)
    }

    #[test]
    fn endpoint_includes_model() {
        let client = client_without_key();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn missing_key_fails_with_variable_name() {
        let client = client_without_key();
        assert!(!client.has_api_key());
        let err = client.complete("hello").unwrap_err();
        assert!(err.to_string().contains("INSIGHTDASH_TEST_UNSET_KEY"));
    }

    #[test]
    fn request_serializes_in_api_shape() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: "hi" }],
            }],
            generation_config: GenerationConfig { temperature: 0.4 },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["temperature"], 0.4);
    }

    #[test]
    fn response_text_joins_parts() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.into_text().unwrap(), "{\"a\":1}");
    }

    #[test]
    fn blocked_prompt_is_an_error() {
        let json = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let err = resp.into_text().unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn no_candidates_is_an_error() {
        let resp: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.into_text().is_err());
    }

    #[test]
    fn candidate_without_content_is_empty_text() {
        let json = r#"{"candidates":[{"finishReason":"STOP"}]}"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.into_text().unwrap(), "");
    }
}
