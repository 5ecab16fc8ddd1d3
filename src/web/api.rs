//! JSON API handlers for the web dashboard.
//!
//! Each handler corresponds to an API endpoint and returns a
//! `Response<Cursor<Vec<u8>>>` with JSON content. Malformed client input is
//! answered with 400; anything else that goes wrong bubbles up as `Err` and
//! becomes a 500 in the server loop.

use std::io::Cursor;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tiny_http::{Response, StatusCode};

use crate::analytics::reporter::{self, Stats, TrendEntry};
use crate::config::{self, schema::InsightConfig};
use crate::health;
use crate::store::{QueryState, QueryStatus};
use crate::suggest::worker::{SuggestionSnapshot, SuggestionStatus};
use crate::view::{self, HistoryRow, Panel};

use super::{Dashboard, content_type_json, error_response};

/// Trend window used when `/api/stats` has no `days` parameter.
const DEFAULT_TREND_DAYS: u32 = 30;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct QueryRequest {
    query: String,
}

#[derive(Deserialize)]
struct StatusRequest {
    status: String,
}

#[derive(Deserialize)]
struct SuggestRequest {
    text: String,
}

/// Full dashboard state plus the view derived from it.
#[derive(Serialize)]
struct StateResponse<'a> {
    state: &'a QueryState,
    panel: Panel,
    history: Vec<HistoryRow>,
}

impl<'a> StateResponse<'a> {
    fn new(state: &'a QueryState) -> Self {
        Self {
            state,
            panel: view::panel(state),
            history: view::history(&state.history, Utc::now().timestamp_millis()),
        }
    }
}

/// Stats API response: mirrors `reporter::Stats` but is Serialize.
#[derive(Serialize)]
struct StatsResponse {
    total_queries: usize,
    avg_latency_ms: f64,
    sources: SourceResponse,
    datasets: Vec<CountResponse>,
    charts: Vec<CountResponse>,
    top_queries: Vec<TopQueryResponse>,
    trends: Vec<TrendEntryResponse>,
}

#[derive(Serialize)]
struct SourceResponse {
    model: usize,
    unparseable: usize,
    unavailable: usize,
    model_pct: f64,
    fallback_pct: f64,
}

#[derive(Serialize)]
struct CountResponse {
    label: String,
    count: usize,
}

#[derive(Serialize)]
struct TopQueryResponse {
    query: String,
    count: usize,
    last_seen: String,
}

#[derive(Serialize)]
struct TrendEntryResponse {
    date: String,
    queries: usize,
    fallbacks: usize,
    avg_latency_ms: f64,
}

impl StatsResponse {
    fn new(stats: Stats, trends: Vec<TrendEntry>) -> Self {
        let dist = &stats.source_distribution;
        let sources = SourceResponse {
            model: dist.model,
            unparseable: dist.unparseable,
            unavailable: dist.unavailable,
            model_pct: dist.pct(dist.model),
            fallback_pct: dist.pct(dist.fallbacks()),
        };
        let counts = |pairs: Vec<(String, usize)>| -> Vec<CountResponse> {
            pairs
                .into_iter()
                .map(|(label, count)| CountResponse { label, count })
                .collect()
        };

        Self {
            total_queries: stats.total_queries,
            avg_latency_ms: stats.avg_latency_ms,
            sources,
            datasets: counts(stats.dataset_counts),
            charts: counts(stats.chart_counts),
            top_queries: stats
                .top_queries
                .into_iter()
                .map(|q| TopQueryResponse {
                    query: q.query,
                    count: q.count,
                    last_seen: q.last_seen,
                })
                .collect(),
            trends: trends
                .into_iter()
                .map(|t| TrendEntryResponse {
                    date: t.date,
                    queries: t.queries,
                    fallbacks: t.fallbacks,
                    avg_latency_ms: t.avg_latency_ms,
                })
                .collect(),
        }
    }
}

/// Config API response: the full config as a JSON value + the raw TOML.
#[derive(Serialize)]
struct ConfigResponse<'a> {
    config: &'a InsightConfig,
    toml_text: String,
    global_path: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

fn bad_request(message: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    Ok(error_response(400, message))
}

/// Parse the `?days=N` query parameter from a URL.
fn parse_days_param(url: &str) -> Option<u32> {
    url.split('?').nth(1)?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == "days" { v.parse().ok() } else { None }
    })
}

// ---------------------------------------------------------------------------
// API Handlers: query lifecycle
// ---------------------------------------------------------------------------

/// `GET /api/state`: store state, current panel and history rows.
pub fn get_state(dashboard: &Dashboard) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&StateResponse::new(dashboard.store.state()))
}

/// `POST /api/query`: start a query and return the Loading state.
///
/// The analysis runs in the background; clients poll `/api/state` until the
/// status leaves `loading`.
///
/// Expects JSON body: `{ "query": "What were our top products?" }`
pub fn post_query(dashboard: &mut Dashboard, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let Ok(req) = serde_json::from_str::<QueryRequest>(body) else {
        return bad_request("expected JSON body {\"query\": \"...\"}");
    };
    let query = req.query.trim();
    if query.is_empty() {
        return bad_request("query must not be empty");
    }

    dashboard.queries.start(&mut dashboard.store, query);
    json_response(&StateResponse::new(dashboard.store.state()))
}

/// `POST /api/status`: override the lifecycle status.
///
/// Expects JSON body: `{ "status": "idle" }`
pub fn post_status(dashboard: &mut Dashboard, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let Ok(req) = serde_json::from_str::<StatusRequest>(body) else {
        return bad_request("expected JSON body {\"status\": \"...\"}");
    };
    let Some(status) = QueryStatus::parse(&req.status) else {
        return bad_request(&format!("unknown status '{}'", req.status));
    };

    dashboard.store.set_status(status);
    json_response(&StateResponse::new(dashboard.store.state()))
}

/// `POST /api/clear`: drop the current result, keep history.
pub fn post_clear(dashboard: &mut Dashboard) -> Result<Response<Cursor<Vec<u8>>>> {
    dashboard.store.clear_current_result();
    json_response(&StateResponse::new(dashboard.store.state()))
}

// ---------------------------------------------------------------------------
// API Handlers: suggestions
// ---------------------------------------------------------------------------

/// `POST /api/suggest`: record the current input text.
///
/// Expects JSON body: `{ "text": "top prod" }`
pub fn post_suggest(dashboard: &Dashboard, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let Ok(req) = serde_json::from_str::<SuggestRequest>(body) else {
        return bad_request("expected JSON body {\"text\": \"...\"}");
    };

    let snapshot = match &dashboard.suggestions {
        Some(service) => service.input(&req.text),
        None => disabled_snapshot(&req.text),
    };
    json_response(&snapshot)
}

/// `GET /api/suggest`: latest suggestion snapshot.
pub fn get_suggest(dashboard: &Dashboard) -> Result<Response<Cursor<Vec<u8>>>> {
    let snapshot = match &dashboard.suggestions {
        Some(service) => service.snapshot(),
        None => disabled_snapshot(""),
    };
    json_response(&snapshot)
}

fn disabled_snapshot(input: &str) -> SuggestionSnapshot {
    SuggestionSnapshot {
        input: input.to_string(),
        status: SuggestionStatus::Idle,
        suggestions: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// API Handlers: analytics, config, health
// ---------------------------------------------------------------------------

/// `GET /api/stats?days=N`: query-log statistics and daily trends.
pub fn get_stats(url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let days = parse_days_param(url);
    let stats = reporter::compute_stats(days);
    let trends = reporter::compute_trends(days.unwrap_or(DEFAULT_TREND_DAYS));
    json_response(&StatsResponse::new(stats, trends))
}

/// `GET /api/config`: effective configuration of this session.
pub fn get_config(cfg: &InsightConfig) -> Result<Response<Cursor<Vec<u8>>>> {
    let toml_text = toml::to_string_pretty(cfg).context("failed to serialize config")?;
    let resp = ConfigResponse {
        config: cfg,
        toml_text,
        global_path: config::global_config_file().map(|p| p.display().to_string()),
    };
    json_response(&resp)
}

/// `GET /api/health`: provider, key and log status.
pub fn get_health(cfg: &InsightConfig) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&health::check(cfg))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
