/// Integration tests for environment variable overrides.
///
/// # Safety
///
/// `std::env::set_var` / `remove_var` are `unsafe` in Rust 2024 edition.
/// All env-mutating checks live in a single `#[test]` so no other test in
/// this binary reads the variables concurrently.
use insightdash::config;
use insightdash::config::schema::Provider;

/// Helper: set an env var (wraps the `unsafe` call).
///
/// # Safety
/// Must only be called from single-threaded test contexts.
unsafe fn set_env(key: &str, val: &str) {
    unsafe { std::env::set_var(key, val) }
}

/// Helper: remove an env var (wraps the `unsafe` call).
///
/// # Safety
/// Must only be called from single-threaded test contexts.
unsafe fn remove_env(key: &str) {
    unsafe { std::env::remove_var(key) }
}

const VARS: [&str; 6] = [
    "INSIGHTDASH_PROVIDER",
    "INSIGHTDASH_MODEL",
    "INSIGHTDASH_TIMEOUT_MS",
    "INSIGHTDASH_SUGGESTIONS",
    "INSIGHTDASH_DEBOUNCE_MS",
    "INSIGHTDASH_LOGGING",
];

#[test]
fn env_overrides_take_precedence() {
    unsafe {
        set_env("INSIGHTDASH_PROVIDER", "ollama");
        set_env("INSIGHTDASH_MODEL", "llama3.2:3b");
        set_env("INSIGHTDASH_TIMEOUT_MS", "1500");
        set_env("INSIGHTDASH_SUGGESTIONS", "off");
        set_env("INSIGHTDASH_DEBOUNCE_MS", "450");
        set_env("INSIGHTDASH_LOGGING", "0");
    }

    let cfg = config::load();
    assert_eq!(cfg.model.provider, Provider::Ollama);
    assert_eq!(cfg.model.model, "llama3.2:3b");
    assert_eq!(cfg.model.timeout_ms, 1500);
    assert!(!cfg.suggestions.enabled);
    assert_eq!(cfg.suggestions.debounce_ms, 450);
    assert!(!cfg.logging.enabled);

    // Unparseable values are ignored rather than zeroing the setting
    unsafe {
        set_env("INSIGHTDASH_PROVIDER", "openai");
        set_env("INSIGHTDASH_DEBOUNCE_MS", "soon");
    }
    let cfg = config::load();
    assert_ne!(cfg.suggestions.debounce_ms, 0);
    assert_eq!(cfg.model.model, "llama3.2:3b");

    unsafe {
        for var in VARS {
            remove_env(var);
        }
    }
}
