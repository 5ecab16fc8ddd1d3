//! Query processor: turns a business question into a renderable
//! [`AnalysisResult`].
//!
//! The processor never fails outward. Model failures produce a fixed
//! "unavailable" result; unparseable replies are replaced by a fixed object
//! that still goes through per-field coercion (see [`validation`]).

pub mod datasets;
pub mod types;
pub mod validation;

use std::sync::Arc;
use std::time::Instant;

use crate::analytics::logger;
use crate::llm::CompletionModel;
use crate::llm::prompts::analysis_prompt;

pub use types::{AnalysisResult, ChartType, DatasetLabel, Record};
use validation::{ParsedReply, coerce_reply, parse_reply};

/// Summary of the result returned when the model cannot be reached.
pub const UNAVAILABLE_SUMMARY: &str =
    "I couldn't process your query at this time. Here's some sample sales data instead.";

/// Insights of the result returned when the model cannot be reached.
pub const UNAVAILABLE_INSIGHTS: [&str; 3] = [
    "This is sample data and not based on your specific query.",
    "Our system might be experiencing issues.",
    "Try again later or rephrase your question.",
];

/// Which path produced an [`AnalysisResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisSource {
    /// The model replied with JSON; fields were coerced individually.
    Model,
    /// The model replied with text that was not JSON.
    Unparseable,
    /// The model call itself failed.
    Unavailable,
}

impl std::fmt::Display for AnalysisSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Model => write!(f, "model"),
            Self::Unparseable => write!(f, "unparseable"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// A processed query with the metadata recorded in the query log.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub result: AnalysisResult,
    pub dataset: DatasetLabel,
    pub source: AnalysisSource,
    pub latency_ms: u64,
}

/// Stateless processor for finalized queries.
pub struct QueryProcessor {
    model: Arc<dyn CompletionModel>,
    log_queries: bool,
}

impl QueryProcessor {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self {
            model,
            log_queries: false,
        }
    }

    /// Append every processed query to the JSONL query log.
    pub fn with_query_log(mut self, enabled: bool) -> Self {
        self.log_queries = enabled;
        self
    }

    /// Process `query` into a result. Never fails.
    pub fn process(&self, query: &str) -> AnalysisResult {
        self.analyze(query).result
    }

    /// Process `query` and report how the result was obtained.
    pub fn analyze(&self, query: &str) -> Analysis {
        let start = Instant::now();
        let reply = self.model.complete(&analysis_prompt(query));
        let latency_ms = start.elapsed().as_millis() as u64;

        let analysis = match reply {
            Ok(text) => build_analysis(&text, latency_ms),
            Err(e) => {
                eprintln!("[insightdash] error processing query with model: {e:#}");
                unavailable_analysis(latency_ms)
            }
        };

        if self.log_queries {
            logger::log_query(query, &analysis, self.model.name());
        }

        analysis
    }
}

/// Parse, coerce and attach the dataset for a raw model reply.
fn build_analysis(text: &str, latency_ms: u64) -> Analysis {
    let parsed = parse_reply(text);
    let source = match parsed {
        ParsedReply::Parsed(_) => AnalysisSource::Model,
        ParsedReply::Unparseable(_) => {
            eprintln!(
                "[insightdash] could not parse model reply as JSON: {:?}",
                truncate(text, 200)
            );
            AnalysisSource::Unparseable
        }
    };

    let reply = coerce_reply(parsed.value());
    Analysis {
        result: AnalysisResult {
            data: datasets::records(reply.dataset),
            summary: reply.summary,
            insights: reply.insights,
            chart_type: reply.chart_type,
        },
        dataset: reply.dataset,
        source,
        latency_ms,
    }
}

/// Fixed result used when the model call fails.
fn unavailable_analysis(latency_ms: u64) -> Analysis {
    Analysis {
        result: AnalysisResult {
            data: datasets::records(DatasetLabel::Sales),
            summary: UNAVAILABLE_SUMMARY.to_string(),
            insights: UNAVAILABLE_INSIGHTS.iter().map(|s| (*s).to_string()).collect(),
            chart_type: ChartType::Bar,
        },
        dataset: DatasetLabel::Sales,
        source: AnalysisSource::Unavailable,
        latency_ms,
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
