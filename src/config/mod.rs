/// Configuration system for insightdash.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::InsightConfig::default()`]
/// 2. **User global config**: `~/.insightdash/config.toml`
/// 3. **Project local config**: `.insightdash.toml` in the current working directory
/// 4. **Environment variables**: `INSIGHTDASH_*` overrides (highest precedence)
///
/// Later layers override earlier ones. Missing sections in a TOML file fall
/// back to the built-in defaults.
///
/// # Usage
///
/// ```rust,ignore
/// use insightdash::config;
///
/// let cfg = config::load();
/// let model = insightdash::llm::build_model(&cfg.model);
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::InsightConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars.
pub fn load() -> InsightConfig {
    // Layers 2 and 3: ~/.insightdash/config.toml, then .insightdash.toml
    let mut config = load_files(&[global_config_path(), project_config_path()]);

    // Layer 4: environment variable overrides
    apply_env_overrides(&mut config);

    config
}

/// Merge TOML files key by key, later files winning, over the defaults.
fn load_files(paths: &[Option<PathBuf>]) -> InsightConfig {
    let mut merged = toml::Table::new();
    for path in paths.iter().flatten() {
        if let Some(layer) = load_toml_table(path) {
            merge_tables(&mut merged, layer);
        }
    }
    toml::Value::Table(merged).try_into().unwrap_or_default()
}

/// Load one TOML config file as a table.
///
/// Returns `None` if the file doesn't exist or is malformed, including
/// files that parse as TOML but don't fit the schema. A broken config file
/// must never stop the dashboard from starting.
fn load_toml_table(path: &Path) -> Option<toml::Table> {
    let content = fs::read_to_string(path).ok()?;
    let table: toml::Table = toml::from_str(&content).ok()?;
    toml::Value::Table(table.clone())
        .try_into::<InsightConfig>()
        .ok()?;
    Some(table)
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(nested) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, nested),
                _ => {
                    base.insert(key, toml::Value::Table(nested));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Directory holding the global config and the query log: `~/.insightdash/`.
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".insightdash"))
}

/// Path to the user global config: `~/.insightdash/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("config.toml"))
}

/// Path to the project local config: `.insightdash.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".insightdash.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `INSIGHTDASH_PROVIDER`: `gemini` or `ollama`
/// - `INSIGHTDASH_MODEL`: model name
/// - `INSIGHTDASH_GEMINI_URL`: hosted endpoint base URL
/// - `INSIGHTDASH_OLLAMA_URL`: Ollama endpoint URL
/// - `INSIGHTDASH_TIMEOUT_MS`: model request timeout
/// - `INSIGHTDASH_ADDR`: dashboard listen address
/// - `INSIGHTDASH_SUGGESTIONS`: autocomplete on/off
/// - `INSIGHTDASH_DEBOUNCE_MS`: autocomplete quiet interval
/// - `INSIGHTDASH_LOGGING`: query log on/off
fn apply_env_overrides(config: &mut InsightConfig) {
    // Model
    if let Ok(val) = std::env::var("INSIGHTDASH_PROVIDER")
        && let Some(provider) = parse_provider(&val)
    {
        config.model.provider = provider;
    }
    if let Ok(val) = std::env::var("INSIGHTDASH_MODEL")
        && !val.is_empty()
    {
        config.model.model = val;
    }
    if let Ok(val) = std::env::var("INSIGHTDASH_GEMINI_URL")
        && !val.is_empty()
    {
        config.model.gemini_url = val;
    }
    if let Ok(val) = std::env::var("INSIGHTDASH_OLLAMA_URL")
        && !val.is_empty()
    {
        config.model.ollama_url = val;
    }
    if let Ok(val) = std::env::var("INSIGHTDASH_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.model.timeout_ms = ms;
    }

    // Server
    if let Ok(val) = std::env::var("INSIGHTDASH_ADDR")
        && !val.is_empty()
    {
        config.server.addr = val;
    }

    // Suggestions
    if let Ok(val) = std::env::var("INSIGHTDASH_SUGGESTIONS") {
        config.suggestions.enabled = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("INSIGHTDASH_DEBOUNCE_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.suggestions.debounce_ms = ms;
    }

    // Logging
    if let Ok(val) = std::env::var("INSIGHTDASH_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse a provider string.
fn parse_provider(val: &str) -> Option<schema::Provider> {
    match val.to_ascii_lowercase().as_str() {
        "gemini" | "google" => Some(schema::Provider::Gemini),
        "ollama" => Some(schema::Provider::Ollama),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.insightdash/config.toml`.
///
/// Creates the directory if it doesn't exist. Returns an error if the file
/// already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.insightdash/ directory")?;
    }

    fs::write(&path, InsightConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Reads the current global config (or defaults), updates the specified key,
/// and writes the result back. Supports dotted keys like `model.provider`.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let source = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&InsightConfig::default())
            .context("failed to serialize default config")?
    };

    let output = update_toml_source(&source, key, value)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Apply one dotted-key update to TOML text, rejecting results that no
/// longer deserialize into an [`InsightConfig`].
fn update_toml_source(source: &str, key: &str, value: &str) -> Result<String> {
    let file: toml::Table = toml::from_str(source).context("failed to parse config as TOML")?;

    // Layer the file over the defaults so keys it omits can still be set
    let mut root = toml::Value::try_from(InsightConfig::default())
        .context("failed to serialize default config")?;
    if let toml::Value::Table(table) = &mut root {
        merge_tables(table, file);
    }

    set_toml_value(&mut root, key, value)?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    toml::from_str::<InsightConfig>(&output)
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    Ok(output)
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("empty config key segment in '{key}'");
    }

    // Navigate to the parent table
    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    // Parse according to the type of the value being replaced
    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(toml::Value::String(_)) => toml::Value::String(raw_value.to_string()),
        Some(_) => anyhow::bail!("'{key}' is not a scalar setting"),
        None => anyhow::bail!("unknown config key '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
