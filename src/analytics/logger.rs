use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::analysis::Analysis;

// ---------------------------------------------------------------------------
// Query log entry (JSONL analytics)
// ---------------------------------------------------------------------------

/// A single entry in the query log (`~/.insightdash/query-log.jsonl`).
///
/// Each entry records one processed query: which path produced the result,
/// what the model picked, and how long the model call took. Used by the
/// reporter for `insightdash stats` and `/api/stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLogEntry {
    pub timestamp: String,
    pub query: String,
    /// Result path: `"model"`, `"unparseable"`, or `"unavailable"`.
    pub source: String,
    pub dataset: String,
    pub chart_type: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub latency_ms: u64,
    #[serde(default)]
    pub insight_count: usize,
}

impl QueryLogEntry {
    pub fn from_analysis(query: &str, analysis: &Analysis, model: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            query: query.to_string(),
            source: analysis.source.to_string(),
            dataset: analysis.dataset.to_string(),
            chart_type: analysis.result.chart_type.to_string(),
            model: model.to_string(),
            latency_ms: analysis.latency_ms,
            insight_count: analysis.result.insights.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging functions
// ---------------------------------------------------------------------------

/// Log a processed query. Best-effort: failures are silently ignored.
pub fn log_query(query: &str, analysis: &Analysis, model: &str) {
    let Some(path) = query_log_path() else {
        return;
    };
    let entry = QueryLogEntry::from_analysis(query, analysis, model);
    let _ = append_entry(&path, &entry);
}

// ---------------------------------------------------------------------------
// Reading log entries
// ---------------------------------------------------------------------------

/// Read all entries from `~/.insightdash/query-log.jsonl`.
///
/// Silently skips malformed lines. Returns an empty vec if the file does not
/// exist or cannot be read.
pub fn read_all_entries() -> Vec<QueryLogEntry> {
    query_log_path()
        .map(|path| read_entries(&path))
        .unwrap_or_default()
}

/// Read log entries filtered to a time window (last N days).
///
/// If `days` is `None`, returns all entries.
pub fn read_entries_since_days(days: Option<u32>) -> Vec<QueryLogEntry> {
    filter_since_days(read_all_entries(), days)
}

/// Keep entries newer than `days` days ago.
pub fn filter_since_days(entries: Vec<QueryLogEntry>, days: Option<u32>) -> Vec<QueryLogEntry> {
    let Some(days) = days else {
        return entries;
    };

    let cutoff = Utc::now() - chrono::Duration::days(i64::from(days));
    let cutoff_str = cutoff.to_rfc3339();

    entries
        .into_iter()
        .filter(|e| e.timestamp >= cutoff_str)
        .collect()
}

/// Read every well-formed entry from a JSONL file.
pub fn read_entries(path: &Path) -> Vec<QueryLogEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<QueryLogEntry>(&line).ok())
        .collect()
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Append one entry as a JSON line, creating parent directories as needed.
pub fn append_entry(path: &Path, entry: &QueryLogEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Return the path to the query log file.
pub fn query_log_path() -> Option<PathBuf> {
    crate::config::data_dir().map(|dir| dir.join("query-log.jsonl"))
}
