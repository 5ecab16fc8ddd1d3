/// Completion model access for the dashboard.
///
/// Both model calls the dashboard makes (suggestions and query analysis)
/// are "prompt in, free text out". The [`CompletionModel`] trait captures
/// exactly that, so the suggestion fetcher and query processor never know
/// which backend they are talking to, and tests can script replies.
///
/// # Backends
///
/// - [`gemini::GeminiClient`]: hosted `generateContent` endpoint (default).
///   The API key is read from the environment variable named by
///   `model.api_key_env` (default `GEMINI_API_KEY`).
/// - [`ollama::OllamaClient`]: local Ollama instance via `/api/generate`.
///
/// Select with `[model] provider = "gemini" | "ollama"` or
/// `INSIGHTDASH_PROVIDER`.
use std::sync::Arc;

use anyhow::Result;

pub mod gemini;
pub mod ollama;
pub mod prompts;

use crate::config::schema::{ModelConfig, Provider};

/// A text completion backend.
///
/// Implementations must be shareable across threads: the suggestion worker
/// holds its own handle to the model.
pub trait CompletionModel: Send + Sync {
    /// Model name for logging.
    fn name(&self) -> &str;

    /// Send `prompt` and return the raw completion text.
    ///
    /// Transport failures, API errors and blocked responses are `Err`. An
    /// empty completion is returned as-is; callers decide what it means.
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Build the configured completion backend.
pub fn build_model(config: &ModelConfig) -> Arc<dyn CompletionModel> {
    match config.provider {
        Provider::Gemini => Arc::new(gemini::GeminiClient::from_config(config)),
        Provider::Ollama => Arc::new(ollama::OllamaClient::from_config(config)),
    }
}

/// On Windows, "localhost" may resolve to IPv6 (::1) first, causing delays
/// when a local server only binds to IPv4.
pub(crate) fn prefer_ipv4(url: &str) -> String {
    url.replace("://localhost", "://127.0.0.1")
}
