//! Autocomplete suggestions for the query input.
//!
//! [`SuggestionFetcher`] is the stateless model call. Timing and staleness
//! live in [`debounce`] and [`worker`]: fetches run only after the input has
//! been quiet for the debounce interval, and a result is shown only if the
//! input has not changed since it was requested.

pub mod debounce;
pub mod worker;

use std::sync::Arc;

use crate::llm::CompletionModel;
use crate::llm::prompts::suggestion_prompt;

/// Inputs shorter than this never trigger a fetch.
pub const MIN_QUERY_CHARS: usize = 3;

/// Upper bound on suggestions shown.
pub const MAX_SUGGESTIONS: usize = 5;

/// Whether `text` is long enough to ask for suggestions.
pub fn should_fetch(text: &str) -> bool {
    text.chars().count() >= MIN_QUERY_CHARS
}

/// Templated completions used when the model call fails.
pub fn fallback_suggestions(partial: &str) -> Vec<String> {
    vec![
        format!("{partial} for the last quarter"),
        format!("{partial} compared to previous year"),
        format!("{partial} by product category"),
    ]
}

/// Asks the model for completed business questions.
pub struct SuggestionFetcher {
    model: Arc<dyn CompletionModel>,
}

impl SuggestionFetcher {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    /// Return up to [`MAX_SUGGESTIONS`] completions for `partial`. Never fails.
    pub fn suggest(&self, partial: &str) -> Vec<String> {
        match self.model.complete(&suggestion_prompt(partial)) {
            Ok(text) => split_suggestions(&text),
            Err(e) => {
                eprintln!("[insightdash] error getting suggestions: {e:#}");
                fallback_suggestions(partial)
            }
        }
    }
}

fn split_suggestions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect()
}
