//! Query lifecycle store.
//!
//! One [`QueryStore`] exists per dashboard session. Every transition goes
//! through [`reduce`], a pure `(state, action) -> state` function, so the
//! lifecycle can be tested without rendering or model calls.
//!
//! ```text
//!   Idle ──submit──▶ Loading ──ok──▶ Succeeded ──submit──▶ Loading …
//!                       │
//!                       └──err──▶ Failed ──submit──▶ Loading …
//! ```
//!
//! Each submission is tagged with a [`RequestId`]. Only the most recent
//! request may complete the cycle; an older request resolving late is
//! dropped instead of overwriting the newer state. [`runner::QueryRunner`]
//! runs the analysis off the caller's thread and feeds completions back.

pub mod runner;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisResult, QueryProcessor};

/// Maximum number of entries kept in [`QueryState::history`].
pub const HISTORY_LIMIT: usize = 10;

/// Error message used when a failure carries no message of its own.
pub const DEFAULT_ERROR: &str = "Failed to process query";

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Lifecycle status of the current query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl QueryStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "idle" => Some(Self::Idle),
            "loading" => Some(Self::Loading),
            "succeeded" => Some(Self::Succeeded),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A past successful query, newest first in [`QueryState::history`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub query: String,
    /// Completion time in epoch milliseconds.
    pub timestamp: i64,
    pub result: Option<AnalysisResult>,
}

/// Identifies one submission. Issued in increasing order by [`QueryStore::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

/// Session state.
///
/// Invariants:
/// - `history.len() <= HISTORY_LIMIT`
/// - `error.is_some()` iff `status == Failed`
/// - `current_result.is_some()` implies `status == Succeeded`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    pub status: QueryStatus,
    pub current_query: Option<String>,
    pub current_result: Option<AnalysisResult>,
    pub history: Vec<HistoryItem>,
    pub error: Option<String>,
    /// Request allowed to complete the current cycle.
    #[serde(skip)]
    pub in_flight: Option<RequestId>,
}

// ---------------------------------------------------------------------------
// Actions and reducer
// ---------------------------------------------------------------------------

/// Transitions understood by [`reduce`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryAction {
    Pending {
        request: RequestId,
        query: String,
    },
    Fulfilled {
        request: RequestId,
        query: String,
        result: AnalysisResult,
        timestamp: i64,
    },
    Rejected {
        request: RequestId,
        message: String,
    },
    SetStatus(QueryStatus),
    ClearCurrentResult,
}

/// Apply `action` to `state`.
pub fn reduce(state: QueryState, action: QueryAction) -> QueryState {
    match action {
        QueryAction::Pending { request, query } => QueryState {
            status: QueryStatus::Loading,
            current_query: Some(query),
            current_result: None,
            error: None,
            in_flight: Some(request),
            ..state
        },
        QueryAction::Fulfilled {
            request,
            query,
            result,
            timestamp,
        } => {
            if state.in_flight != Some(request) {
                return state;
            }
            let mut history = Vec::with_capacity(HISTORY_LIMIT);
            history.push(HistoryItem {
                query,
                timestamp,
                result: Some(result.clone()),
            });
            history.extend(state.history.into_iter().take(HISTORY_LIMIT - 1));
            QueryState {
                status: QueryStatus::Succeeded,
                current_result: Some(result),
                history,
                error: None,
                in_flight: None,
                ..state
            }
        }
        QueryAction::Rejected { request, message } => {
            if state.in_flight != Some(request) {
                return state;
            }
            let message = if message.trim().is_empty() {
                DEFAULT_ERROR.to_string()
            } else {
                message
            };
            QueryState {
                status: QueryStatus::Failed,
                current_result: None,
                error: Some(message),
                in_flight: None,
                ..state
            }
        }
        QueryAction::SetStatus(status) => set_status(state, status),
        QueryAction::ClearCurrentResult => QueryState {
            current_result: None,
            current_query: None,
            ..state
        },
    }
}

/// Direct status override that keeps the state invariants.
fn set_status(state: QueryState, status: QueryStatus) -> QueryState {
    if status == QueryStatus::Succeeded && state.current_result.is_none() {
        return state;
    }

    let error = match status {
        QueryStatus::Failed => state.error.or_else(|| Some(DEFAULT_ERROR.to_string())),
        _ => None,
    };
    let current_result = match status {
        QueryStatus::Succeeded => state.current_result,
        _ => None,
    };
    let in_flight = match status {
        QueryStatus::Loading => state.in_flight,
        _ => None,
    };

    QueryState {
        status,
        current_result,
        error,
        in_flight,
        ..state
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Anything that can answer a query for the store.
///
/// [`QueryProcessor`] never fails; the `Result` covers analyzers that can,
/// and is what drives the `Failed` state.
pub trait Analyzer {
    fn analyze(&self, query: &str) -> Result<AnalysisResult>;
}

impl Analyzer for QueryProcessor {
    fn analyze(&self, query: &str) -> Result<AnalysisResult> {
        Ok(self.process(query))
    }
}

/// Owner of the session's [`QueryState`].
#[derive(Debug, Default)]
pub struct QueryStore {
    state: QueryState,
    last_request: u64,
}

impl QueryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// Apply a raw action.
    pub fn dispatch(&mut self, action: QueryAction) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    /// Run a full query cycle: Loading, analysis, then Succeeded or Failed.
    pub fn submit(&mut self, query: &str, analyzer: &dyn Analyzer) {
        let request = self.begin(query);
        let outcome = analyzer.analyze(query);
        self.finish(request, query, outcome);
    }

    /// Enter Loading for `query` and return the id its completion must carry.
    pub fn begin(&mut self, query: &str) -> RequestId {
        self.last_request += 1;
        let request = RequestId(self.last_request);
        self.dispatch(QueryAction::Pending {
            request,
            query: query.to_string(),
        });
        request
    }

    /// Complete `request`. Ignored unless it is the latest request in flight.
    pub fn finish(&mut self, request: RequestId, query: &str, outcome: Result<AnalysisResult>) {
        let action = match outcome {
            Ok(result) => QueryAction::Fulfilled {
                request,
                query: query.to_string(),
                result,
                timestamp: Utc::now().timestamp_millis(),
            },
            Err(e) => QueryAction::Rejected {
                request,
                message: e.to_string(),
            },
        };
        self.dispatch(action);
    }

    pub fn set_status(&mut self, status: QueryStatus) {
        self.dispatch(QueryAction::SetStatus(status));
    }

    pub fn clear_current_result(&mut self) {
        self.dispatch(QueryAction::ClearCurrentResult);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ChartType, Record};

    fn result(summary: &str) -> AnalysisResult {
        AnalysisResult {
            data: vec![Record::new("Jan", &[("Product A", 1.0)])],
            summary: summary.to_string(),
            insights: vec![],
            chart_type: ChartType::Bar,
        }
    }

    fn fulfilled(request: RequestId, query: &str) -> QueryAction {
        QueryAction::Fulfilled {
            request,
            query: query.to_string(),
            result: result(query),
            timestamp: 1,
        }
    }

    fn assert_invariants(state: &QueryState) {
        assert!(state.history.len() <= HISTORY_LIMIT);
        assert_eq!(state.error.is_some(), state.status == QueryStatus::Failed);
        if state.current_result.is_some() {
            assert_eq!(state.status, QueryStatus::Succeeded);
        }
    }

    #[test]
    fn pending_enters_loading_and_clears_error() {
        let state = QueryState {
            status: QueryStatus::Failed,
            error: Some("boom".to_string()),
            ..QueryState::default()
        };
        let state = reduce(
            state,
            QueryAction::Pending {
                request: RequestId(1),
                query: "q".to_string(),
            },
        );
        assert_eq!(state.status, QueryStatus::Loading);
        assert_eq!(state.current_query.as_deref(), Some("q"));
        assert!(state.error.is_none());
        assert_eq!(state.in_flight, Some(RequestId(1)));
        assert_invariants(&state);
    }

    #[test]
    fn fulfilled_prepends_history() {
        let mut state = QueryState::default();
        for i in 1..=3 {
            let request = RequestId(i);
            let query = format!("q{i}");
            state = reduce(state, QueryAction::Pending { request, query: query.clone() });
            state = reduce(state, fulfilled(request, &query));
            assert_invariants(&state);
        }
        let queries: Vec<&str> = state.history.iter().map(|h| h.query.as_str()).collect();
        assert_eq!(queries, ["q3", "q2", "q1"]);
        assert_eq!(state.current_result.as_ref().unwrap().summary, "q3");
    }

    #[test]
    fn rejected_with_blank_message_uses_default() {
        let state = reduce(
            QueryState::default(),
            QueryAction::Pending { request: RequestId(1), query: "q".to_string() },
        );
        let state = reduce(
            state,
            QueryAction::Rejected { request: RequestId(1), message: "  ".to_string() },
        );
        assert_eq!(state.status, QueryStatus::Failed);
        assert_eq!(state.error.as_deref(), Some(DEFAULT_ERROR));
        assert_invariants(&state);
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut store = QueryStore::new();
        let first = store.begin("first");
        let second = store.begin("second");

        store.finish(first, "first", Ok(result("first")));
        assert_eq!(store.state().status, QueryStatus::Loading);
        assert!(store.state().history.is_empty());

        store.finish(second, "second", Ok(result("second")));
        assert_eq!(store.state().status, QueryStatus::Succeeded);
        assert_eq!(store.state().history.len(), 1);
        assert_eq!(store.state().history[0].query, "second");
    }

    #[test]
    fn stale_failure_is_ignored() {
        let mut store = QueryStore::new();
        let first = store.begin("first");
        let second = store.begin("second");
        store.finish(second, "second", Ok(result("second")));
        store.finish(first, "first", Err(anyhow::anyhow!("late failure")));
        assert_eq!(store.state().status, QueryStatus::Succeeded);
        assert!(store.state().error.is_none());
    }

    #[test]
    fn set_status_idle_drops_result_and_abandons_request() {
        let mut store = QueryStore::new();
        let request = store.begin("q");
        store.set_status(QueryStatus::Idle);
        store.finish(request, "q", Ok(result("q")));
        assert_eq!(store.state().status, QueryStatus::Idle);
        assert!(store.state().current_result.is_none());
        assert!(store.state().history.is_empty());
    }

    #[test]
    fn set_status_failed_installs_default_error() {
        let mut store = QueryStore::new();
        store.set_status(QueryStatus::Failed);
        assert_eq!(store.state().error.as_deref(), Some(DEFAULT_ERROR));
        store.set_status(QueryStatus::Idle);
        assert!(store.state().error.is_none());
        assert_invariants(store.state());
    }

    #[test]
    fn set_status_succeeded_requires_result() {
        let mut store = QueryStore::new();
        store.set_status(QueryStatus::Succeeded);
        assert_eq!(store.state().status, QueryStatus::Idle);
    }

    #[test]
    fn clear_current_result_keeps_status_and_history() {
        let mut store = QueryStore::new();
        let request = store.begin("q");
        store.finish(request, "q", Ok(result("q")));
        store.clear_current_result();
        assert_eq!(store.state().status, QueryStatus::Succeeded);
        assert!(store.state().current_result.is_none());
        assert!(store.state().current_query.is_none());
        assert_eq!(store.state().history.len(), 1);
    }

    #[test]
    fn status_parse_accepts_known_values() {
        assert_eq!(QueryStatus::parse("Idle"), Some(QueryStatus::Idle));
        assert_eq!(QueryStatus::parse(" failed "), Some(QueryStatus::Failed));
        assert_eq!(QueryStatus::parse("done"), None);
    }

    #[test]
    fn state_serializes_camel_case_without_request() {
        let json = serde_json::to_value(QueryState::default()).unwrap();
        assert_eq!(json["status"], "idle");
        assert!(json.get("currentQuery").is_some());
        assert!(json.get("inFlight").is_none());
    }
}
