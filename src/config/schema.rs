/// Configuration schema and defaults for insightdash.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[model]`, `[server]`, `[suggestions]` and `[logging]`.
///
/// Every field has a sensible built-in default. Users only need to set the
/// values they want to override.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level insightdash configuration.
///
/// Maps directly to the `~/.insightdash/config.toml` and `.insightdash.toml`
/// file schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    pub model: ModelConfig,
    pub server: ServerConfig,
    pub suggestions: SuggestionsConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [model]
// ---------------------------------------------------------------------------

/// Which completion backend answers the dashboard's prompts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    /// Hosted Gemini `generateContent` endpoint (default).
    #[default]
    Gemini,
    /// Local Ollama instance.
    Ollama,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

/// Completion model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: Provider,
    /// Model name, e.g. `gemini-1.5-flash` or `llama3.2:3b`.
    pub model: String,
    /// Name of the environment variable holding the hosted API key.
    /// The key itself is never stored in the config file.
    pub api_key_env: String,
    pub gemini_url: String,
    pub ollama_url: String,
    pub temperature: f64,
    /// Transport timeout for a single model call (milliseconds).
    pub timeout_ms: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            gemini_url: "https://generativelanguage.googleapis.com".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            temperature: 0.4,
            timeout_ms: 30_000,
        }
    }
}

impl ModelConfig {
    /// Read the hosted API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Embedded web dashboard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    /// Open the dashboard in the default browser on `serve`.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [suggestions]
// ---------------------------------------------------------------------------

/// Autocomplete settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionsConfig {
    pub enabled: bool,
    /// Quiet interval after the last keystroke before suggestions are fetched.
    pub debounce_ms: u64,
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 300,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Query log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append one JSON line per processed query to `~/.insightdash/query-log.jsonl`.
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl InsightConfig {
    /// Annotated default config written by `insightdash config init`.
    pub fn default_toml() -> String {
        r#"# insightdash Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (INSIGHTDASH_*)
#   2. Project config (.insightdash.toml in current directory)
#   3. User global config (~/.insightdash/config.toml)
#   4. Built-in defaults

[model]
provider = "gemini"                   # gemini | ollama
model = "gemini-1.5-flash"
api_key_env = "GEMINI_API_KEY"        # env var holding the hosted API key
gemini_url = "https://generativelanguage.googleapis.com"
ollama_url = "http://localhost:11434"
temperature = 0.4
timeout_ms = 30000

[server]
addr = "127.0.0.1:9747"
open_browser = true

[suggestions]
enabled = true
debounce_ms = 300                     # quiet interval before fetching

[logging]
enabled = true                        # ~/.insightdash/query-log.jsonl
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
