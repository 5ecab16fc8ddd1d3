/// Ollama HTTP API client.
///
/// Communicates with a local Ollama instance (default `localhost:11434`)
/// using the synchronous `ureq` HTTP client. Provides:
///
/// - **Health check**: verify Ollama is running and has a model loaded.
/// - **Generate**: send a single prompt and receive the completion.
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{CompletionModel, prefer_ipv4};
use crate::config::schema::ModelConfig;

// ---------------------------------------------------------------------------
// Request / response types for the Ollama API
// ---------------------------------------------------------------------------

/// Request body for `POST /api/generate`.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

/// Generation options included in the request.
#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f64,
    /// Context window size in tokens. Set explicitly so Ollama does not
    /// auto-expand it past what fits in VRAM.
    num_ctx: u32,
}

/// Response body from `POST /api/generate` (non-streaming).
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Response body from `GET /api/tags`: lists available models.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    #[allow(dead_code)]
    name: String,
}

/// Dashboard prompts are short; 8K tokens leaves ample room for the reply.
const CONTEXT_WINDOW: u32 = 8_192;

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous Ollama HTTP client.
#[derive(Debug)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    temperature: f64,
    timeout: Duration,
}

impl OllamaClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            base_url: config.ollama_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Check whether Ollama is reachable and has at least one model loaded.
    ///
    /// Uses a short timeout (5 s) so `health` doesn't stall if Ollama is down.
    pub fn is_healthy(&self) -> bool {
        let url = prefer_ipv4(&format!("{}/api/tags", self.base_url));
        match ureq::get(&url).timeout(Duration::from_secs(5)).call() {
            Ok(resp) => resp
                .into_json::<TagsResponse>()
                .map(|tags| !tags.models.is_empty())
                .unwrap_or(false),
            Err(_) => false,
        }
    }
}

impl CompletionModel for OllamaClient {
    fn name(&self) -> &str {
        &self.model
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        let url = prefer_ipv4(&format!("{}/api/generate", self.base_url));

        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
                num_ctx: CONTEXT_WINDOW,
            },
        };

        let resp = ureq::post(&url)
            .timeout(self.timeout)
            .send_json(&body)
            .context("Ollama generate request failed")?;

        let parsed: GenerateResponse = resp
            .into_json()
            .context("failed to parse Ollama generate response")?;

        Ok(parsed.response)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
