//! Pure view selection over [`QueryState`].
//!
//! Both the web frontend and the terminal renderer decide what to show from
//! [`panel`] and [`history`]; neither touches the store directly.

use serde::Serialize;

use crate::analysis::AnalysisResult;
use crate::store::{HistoryItem, QueryState, QueryStatus};

/// Shown when the store reports a failure without a message.
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred while processing your query.";

/// The main content area of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Panel {
    Empty,
    Loading { query: Option<String> },
    Error { message: String },
    Results { query: Option<String>, result: AnalysisResult },
}

pub fn panel(state: &QueryState) -> Panel {
    match state.status {
        QueryStatus::Loading => Panel::Loading {
            query: state.current_query.clone(),
        },
        QueryStatus::Failed => Panel::Error {
            message: state
                .error
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
        },
        QueryStatus::Succeeded => match &state.current_result {
            Some(result) => Panel::Results {
                query: state.current_query.clone(),
                result: result.clone(),
            },
            None => Panel::Empty,
        },
        QueryStatus::Idle => Panel::Empty,
    }
}

/// One row of the history list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub query: String,
    pub when: String,
}

/// History rows, newest first, with times relative to `now_ms`.
pub fn history(items: &[HistoryItem], now_ms: i64) -> Vec<HistoryRow> {
    items
        .iter()
        .map(|item| HistoryRow {
            query: item.query.clone(),
            when: relative_time(item.timestamp, now_ms),
        })
        .collect()
}

/// "just now", "5 min ago", "3 h ago", "2 d ago".
pub fn relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let secs = (now_ms - timestamp_ms).max(0) / 1000;
    match secs {
        0..60 => "just now".to_string(),
        60..3600 => format!("{} min ago", secs / 60),
        3600..86400 => format!("{} h ago", secs / 3600),
        _ => format!("{} d ago", secs / 86400),
    }
}
