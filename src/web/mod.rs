//! Embedded web dashboard for insightdash.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - The single-page dashboard (query input, suggestions, results, history)
//! - JSON API endpoints for the query lifecycle, suggestions, stats, config
//!   and health
//!
//! Launched via `insightdash serve` (default: `http://127.0.0.1:9747`).

mod api;
mod frontend;

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::analysis::QueryProcessor;
use crate::config::schema::InsightConfig;
use crate::llm::CompletionModel;
use crate::store::QueryStore;
use crate::store::runner::QueryRunner;
use crate::suggest::SuggestionFetcher;
use crate::suggest::worker::SuggestionService;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One dashboard session: the query store plus the services that feed it.
pub struct Dashboard {
    config: InsightConfig,
    store: QueryStore,
    queries: QueryRunner,
    suggestions: Option<SuggestionService>,
}

impl Dashboard {
    pub fn new(config: InsightConfig, model: Arc<dyn CompletionModel>) -> Self {
        let processor = QueryProcessor::new(Arc::clone(&model)).with_query_log(config.logging.enabled);
        let suggestions = config.suggestions.enabled.then(|| {
            SuggestionService::spawn(
                SuggestionFetcher::new(model),
                Duration::from_millis(config.suggestions.debounce_ms),
            )
        });

        Self {
            config,
            store: QueryStore::new(),
            queries: QueryRunner::spawn(processor),
            suggestions,
        }
    }

    /// Dispatch an incoming request to the appropriate handler.
    pub fn dispatch(
        &mut self,
        method: &Method,
        url: &str,
        body: Option<&str>,
    ) -> Result<Response<Cursor<Vec<u8>>>> {
        // Strip query string for path matching
        let path = url.split('?').next().unwrap_or(url);
        let body = body.unwrap_or("{}");

        // Fold in analyses that finished since the last request
        self.queries.apply_completed(&mut self.store);

        match (method, path) {
            // Frontend
            (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_frontend()),

            // API: Query lifecycle
            (&Method::Get, "/api/state") => api::get_state(self),
            (&Method::Post, "/api/query") => api::post_query(self, body),
            (&Method::Post, "/api/status") => api::post_status(self, body),
            (&Method::Post, "/api/clear") => api::post_clear(self),

            // API: Suggestions
            (&Method::Get, "/api/suggest") => api::get_suggest(self),
            (&Method::Post, "/api/suggest") => api::post_suggest(self, body),

            // API: Analytics, config, health
            (&Method::Get, "/api/stats") => api::get_stats(url),
            (&Method::Get, "/api/config") => api::get_config(&self.config),
            (&Method::Get, "/api/health") => api::get_health(&self.config),

            // 404
            _ => Ok(error_response(404, "not found")),
        }
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the web dashboard server on `addr`.
///
/// Blocks the current thread. Handles requests sequentially (one local
/// session); model calls run on worker threads so a slow query never holds
/// up the loop. Errors are handled per-request without crashing the server.
pub fn serve(config: InsightConfig, model: Arc<dyn CompletionModel>, addr: &str, open: bool) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("insightdash running at http://{addr} (model: {})", model.name());
    println!("Press Ctrl+C to stop.\n");

    if open {
        let url = format!("http://{addr}");
        if let Err(e) = open_browser(&url) {
            eprintln!("[insightdash] {e:#}");
        }
    }

    let mut dashboard = Dashboard::new(config, model);

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        // Read body up-front for methods that carry one
        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            let _ = request.as_reader().read_to_string(&mut buf);
            Some(buf)
        } else {
            None
        };

        let resp = match dashboard.dispatch(&method, &url, body.as_deref()) {
            Ok(resp) => resp,
            Err(e) => error_response(500, &format!("{e:#}")),
        };
        let status = resp.status_code().0;
        let _ = request.respond(resp);

        // Brief access log
        println!(
            "{} {} {} {}",
            method,
            url,
            status,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Serve the embedded single-page frontend.
fn serve_frontend() -> Response<Cursor<Vec<u8>>> {
    Response::from_data(frontend::INDEX_HTML.as_bytes().to_vec())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

/// `{"error": message}` with the given status.
pub(crate) fn error_response(status: u16, message: &str) -> Response<Cursor<Vec<u8>>> {
    let body = serde_json::json!({ "error": message }).to_string();
    Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(status))
}

fn header(value: &'static str) -> Header {
    Header::from_bytes("Content-Type", value).expect("static header is valid ASCII")
}

/// JSON content type header.
pub(crate) fn content_type_json() -> Header {
    header("application/json; charset=utf-8")
}

/// HTML content type header.
fn content_type_html() -> Header {
    header("text/html; charset=utf-8")
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
