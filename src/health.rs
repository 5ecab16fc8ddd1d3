//! Environment checks shared by `insightdash health` and `GET /api/health`.

use serde::Serialize;

use crate::analytics::logger;
use crate::config::{self, schema::InsightConfig, schema::Provider};
use crate::llm::ollama::OllamaClient;

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub provider: String,
    pub model: String,
    /// Only meaningful for the hosted provider.
    pub api_key_env: String,
    pub api_key_set: bool,
    /// `None` unless the provider is Ollama.
    pub ollama_reachable: Option<bool>,
    pub config_exists: bool,
    pub logging_enabled: bool,
    pub log_exists: bool,
}

impl HealthReport {
    /// Whether the configured provider can be expected to answer.
    pub fn model_ready(&self) -> bool {
        match self.ollama_reachable {
            Some(reachable) => reachable,
            None => self.api_key_set,
        }
    }
}

pub fn check(config: &InsightConfig) -> HealthReport {
    let ollama_reachable = match config.model.provider {
        Provider::Ollama => Some(OllamaClient::from_config(&config.model).is_healthy()),
        Provider::Gemini => None,
    };

    HealthReport {
        provider: config.model.provider.to_string(),
        model: config.model.model.clone(),
        api_key_env: config.model.api_key_env.clone(),
        api_key_set: config.model.api_key().is_some(),
        ollama_reachable,
        config_exists: config::global_config_file().is_some_and(|p| p.exists()),
        logging_enabled: config.logging.enabled,
        log_exists: logger::query_log_path().is_some_and(|p| p.exists()),
    }
}
