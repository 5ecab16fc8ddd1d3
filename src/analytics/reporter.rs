//! Analytics reporter: aggregation and trend analysis over the query log.
//!
//! Reads the JSONL query log and provides:
//! - **Stats**: result-path distribution, dataset / chart usage, top queries
//! - **Trends**: per-day query counts, fallbacks and latency

use std::collections::HashMap;

use crate::analytics::logger::{self, QueryLogEntry};

// ---------------------------------------------------------------------------
// Aggregated stats
// ---------------------------------------------------------------------------

/// Summary statistics for `insightdash stats`.
#[derive(Debug)]
pub struct Stats {
    pub total_queries: usize,
    pub avg_latency_ms: f64,
    pub source_distribution: SourceDistribution,
    /// `(label, count)` sorted by count descending.
    pub dataset_counts: Vec<(String, usize)>,
    /// `(chart type, count)` sorted by count descending.
    pub chart_counts: Vec<(String, usize)>,
    pub top_queries: Vec<QueryStat>,
}

/// How often a query (case-insensitive, trimmed) was asked.
#[derive(Debug, Clone)]
pub struct QueryStat {
    pub query: String,
    pub count: usize,
    pub last_seen: String,
}

/// Distribution across result paths.
#[derive(Debug, Default)]
pub struct SourceDistribution {
    pub model: usize,
    pub unparseable: usize,
    pub unavailable: usize,
}

impl SourceDistribution {
    pub fn total(&self) -> usize {
        self.model + self.unparseable + self.unavailable
    }

    /// Percentage for a given count, returns 0.0 if total is zero.
    pub fn pct(&self, count: usize) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (count as f64 / total as f64) * 100.0
        }
    }

    /// Queries answered by a fallback instead of the model.
    pub fn fallbacks(&self) -> usize {
        self.unparseable + self.unavailable
    }
}

// ---------------------------------------------------------------------------
// Trend entry
// ---------------------------------------------------------------------------

/// A single day in a time-based trend.
#[derive(Debug, Clone)]
pub struct TrendEntry {
    pub date: String,
    pub queries: usize,
    pub fallbacks: usize,
    pub avg_latency_ms: f64,
}

// ---------------------------------------------------------------------------
// Stats computation
// ---------------------------------------------------------------------------

/// Compute aggregate stats from the query log, optionally filtered to the
/// last `days` days.
pub fn compute_stats(days: Option<u32>) -> Stats {
    let entries = logger::read_entries_since_days(days);
    build_stats(&entries)
}

pub fn build_stats(entries: &[QueryLogEntry]) -> Stats {
    let total_queries = entries.len();
    let avg_latency_ms = average(entries.iter().map(|e| e.latency_ms));

    let mut source_distribution = SourceDistribution::default();
    for entry in entries {
        match entry.source.as_str() {
            "model" => source_distribution.model += 1,
            "unparseable" => source_distribution.unparseable += 1,
            _ => source_distribution.unavailable += 1,
        }
    }

    Stats {
        total_queries,
        avg_latency_ms,
        source_distribution,
        dataset_counts: count_by(entries, |e| e.dataset.as_str()),
        chart_counts: count_by(entries, |e| e.chart_type.as_str()),
        top_queries: compute_top_queries(entries),
    }
}

/// Count entries per key, most frequent first (ties by key for stable output).
fn count_by<'a>(
    entries: &'a [QueryLogEntry],
    key: impl Fn(&'a QueryLogEntry) -> &'a str,
) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        *counts.entry(key(entry)).or_default() += 1;
    }
    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, c)| (k.to_string(), c))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

/// Group repeated questions and return them most-asked first.
fn compute_top_queries(entries: &[QueryLogEntry]) -> Vec<QueryStat> {
    let mut groups: HashMap<String, QueryStat> = HashMap::new();
    for entry in entries {
        let key = entry.query.trim().to_lowercase();
        let stat = groups.entry(key).or_insert_with(|| QueryStat {
            query: entry.query.trim().to_string(),
            count: 0,
            last_seen: entry.timestamp.clone(),
        });
        stat.count += 1;
        if entry.timestamp > stat.last_seen {
            stat.last_seen = entry.timestamp.clone();
        }
    }

    let mut stats: Vec<QueryStat> = groups.into_values().collect();
    stats.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| b.last_seen.cmp(&a.last_seen))
    });
    stats
}

// ---------------------------------------------------------------------------
// Trends
// ---------------------------------------------------------------------------

/// Compute daily trend data over the last `days` days.
pub fn compute_trends(days: u32) -> Vec<TrendEntry> {
    let entries = logger::read_entries_since_days(Some(days));
    build_trends(&entries)
}

pub fn build_trends(entries: &[QueryLogEntry]) -> Vec<TrendEntry> {
    // Group by date: first 10 chars of the RFC 3339 timestamp (YYYY-MM-DD)
    let mut daily: HashMap<String, Vec<&QueryLogEntry>> = HashMap::new();
    for entry in entries {
        let date = entry.timestamp.get(..10).unwrap_or("unknown").to_string();
        daily.entry(date).or_default().push(entry);
    }

    let mut trends: Vec<TrendEntry> = daily
        .into_iter()
        .map(|(date, group)| TrendEntry {
            date,
            queries: group.len(),
            fallbacks: group.iter().filter(|e| e.source != "model").count(),
            avg_latency_ms: average(group.iter().map(|e| e.latency_ms)),
        })
        .collect();

    trends.sort_by(|a, b| a.date.cmp(&b.date));
    trends
}

fn average(values: impl Iterator<Item = u64>) -> f64 {
    let (sum, count) = values.fold((0u64, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(timestamp: &str, query: &str, source: &str, dataset: &str, chart: &str, latency: u64) -> QueryLogEntry {
        QueryLogEntry {
            timestamp: timestamp.to_string(),
            query: query.to_string(),
            source: source.to_string(),
            dataset: dataset.to_string(),
            chart_type: chart.to_string(),
            model: "gemini-1.5-flash".to_string(),
            latency_ms: latency,
            insight_count: 3,
        }
    }

    fn sample_entries() -> Vec<QueryLogEntry> {
        vec![
            entry("2025-01-15T10:00:00+00:00", "Top products?", "model", "sales", "bar", 800),
            entry("2025-01-15T11:00:00+00:00", "top products? ", "model", "sales", "line", 1200),
            entry("2025-01-16T09:00:00+00:00", "Churn by age", "unparseable", "sales", "bar", 400),
            entry("2025-01-16T09:30:00+00:00", "Best channel", "unavailable", "sales", "bar", 0),
            entry("2025-01-16T10:00:00+00:00", "Best channel", "model", "marketing", "pie", 600),
        ]
    }

    #[test]
    fn build_stats_totals() {
        let stats = build_stats(&sample_entries());
        assert_eq!(stats.total_queries, 5);
        assert!((stats.avg_latency_ms - 600.0).abs() < f64::EPSILON);
    }

    #[test]
    fn source_distribution_counts_fallbacks() {
        let stats = build_stats(&sample_entries());
        let dist = &stats.source_distribution;
        assert_eq!(dist.model, 3);
        assert_eq!(dist.unparseable, 1);
        assert_eq!(dist.unavailable, 1);
        assert_eq!(dist.fallbacks(), 2);
        assert!((dist.pct(dist.model) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn dataset_and_chart_counts_sorted() {
        let stats = build_stats(&sample_entries());
        assert_eq!(stats.dataset_counts[0], ("sales".to_string(), 4));
        assert_eq!(stats.dataset_counts[1], ("marketing".to_string(), 1));
        assert_eq!(stats.chart_counts[0], ("bar".to_string(), 3));
    }

    #[test]
    fn top_queries_group_case_insensitively() {
        let stats = build_stats(&sample_entries());
        let top = &stats.top_queries[0];
        assert_eq!(top.count, 2);
        // Most recent repeated question wins the tie
        assert_eq!(top.query.to_lowercase(), "best channel");
        assert_eq!(stats.top_queries[1].query.to_lowercase(), "top products?");
        assert_eq!(stats.top_queries[1].last_seen, "2025-01-15T11:00:00+00:00");
    }

    #[test]
    fn empty_entries() {
        let stats = build_stats(&[]);
        assert_eq!(stats.total_queries, 0);
        assert_eq!(stats.avg_latency_ms, 0.0);
        assert!(stats.top_queries.is_empty());
        assert_eq!(stats.source_distribution.pct(0), 0.0);
    }

    #[test]
    fn trends_group_by_day() {
        let trends = build_trends(&sample_entries());
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].date, "2025-01-15");
        assert_eq!(trends[0].queries, 2);
        assert_eq!(trends[0].fallbacks, 0);
        assert_eq!(trends[1].date, "2025-01-16");
        assert_eq!(trends[1].fallbacks, 2);
        assert!((trends[1].avg_latency_ms - 333.333).abs() < 0.01);
    }
}
