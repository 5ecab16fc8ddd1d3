//! CLI command implementations for insightdash.
//!
//! Provides subcommand handlers for:
//! - `insightdash ask "question"`: one-shot analysis rendered in the terminal
//! - `insightdash suggest "partial"`: autocomplete suggestions
//! - `insightdash stats`: query-log summary, result paths, top questions
//! - `insightdash health`: provider, API key, config, log status
//! - `insightdash config show|init|set|reset`: configuration management

pub mod render;

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;

use crate::analysis::{AnalysisSource, QueryProcessor};
use crate::analytics::logger;
use crate::analytics::reporter::{self, Stats, TrendEntry};
use crate::config::{self, schema::InsightConfig};
use crate::health;
use crate::llm::CompletionModel;
use crate::suggest::{self, SuggestionFetcher};

/// Output format for analytics commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// insightdash ask
// ---------------------------------------------------------------------------

/// Analyze one question and print the result.
pub fn run_ask(config: &InsightConfig, model: Arc<dyn CompletionModel>, query: &str, json: bool) -> Result<()> {
    let query = query.trim();
    if query.is_empty() {
        anyhow::bail!("query must not be empty");
    }

    let processor = QueryProcessor::new(model).with_query_log(config.logging.enabled);
    let analysis = processor.analyze(query);

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis.result)?);
        return Ok(());
    }

    render::print_result(query, &analysis.result);
    println!();
    let source = match analysis.source {
        AnalysisSource::Model => "model".green(),
        AnalysisSource::Unparseable => "unparseable reply, sample data".yellow(),
        AnalysisSource::Unavailable => "model unavailable, sample data".red(),
    };
    println!(
        "  {} {} · {} · {} ms",
        "Source:".dimmed(),
        source,
        analysis.dataset.to_string().dimmed(),
        analysis.latency_ms
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// insightdash suggest
// ---------------------------------------------------------------------------

/// Print autocomplete suggestions for a partial query.
pub fn run_suggest(model: Arc<dyn CompletionModel>, partial: &str) -> Result<()> {
    if !suggest::should_fetch(partial) {
        println!(
            "{}",
            format!(
                "Type at least {} characters to get suggestions.",
                suggest::MIN_QUERY_CHARS
            )
            .yellow()
        );
        return Ok(());
    }

    let suggestions = SuggestionFetcher::new(model).suggest(partial);
    if suggestions.is_empty() {
        println!("{}", "No suggestions.".dimmed());
    }
    for suggestion in suggestions {
        println!("  {} {}", "›".cyan(), suggestion);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// insightdash stats
// ---------------------------------------------------------------------------

/// Show query-log statistics.
pub fn run_stats(format: OutputFormat, days: Option<u32>) -> Result<()> {
    let stats = reporter::compute_stats(days);

    if stats.total_queries == 0 {
        println!(
            "{}",
            "No data yet. Ask some questions through insightdash to see stats.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_stats_json(&stats)?,
        OutputFormat::Csv => print_stats_csv(&stats),
        OutputFormat::Table => {
            print_stats_table(&stats);
            if let Some(days) = days {
                print_trends_table(&reporter::compute_trends(days), days);
            }
        }
    }

    Ok(())
}

fn print_stats_table(stats: &Stats) {
    println!("{}", "insightdash Query Report".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();

    println!("  {} {}", "Total queries: ".bold(), stats.total_queries);
    println!("  {} {:.0} ms", "Avg latency:   ".bold(), stats.avg_latency_ms);
    println!();

    let dist = &stats.source_distribution;
    println!("{}", "Result Paths".bold());
    println!(
        "  {} {:>6} ({:.1}%)",
        "Model:      ".green(),
        dist.model,
        dist.pct(dist.model)
    );
    println!(
        "  {} {:>6} ({:.1}%)",
        "Unparseable:".yellow(),
        dist.unparseable,
        dist.pct(dist.unparseable)
    );
    println!(
        "  {} {:>6} ({:.1}%)",
        "Unavailable:".red(),
        dist.unavailable,
        dist.pct(dist.unavailable)
    );
    println!();

    println!("{}", "Datasets / Charts".bold());
    let datasets: Vec<String> = stats
        .dataset_counts
        .iter()
        .map(|(label, count)| format!("{label} {count}"))
        .collect();
    let charts: Vec<String> = stats
        .chart_counts
        .iter()
        .map(|(label, count)| format!("{label} {count}"))
        .collect();
    println!("  {} {}", "datasets:".dimmed(), datasets.join(", "));
    println!("  {} {}", "charts:  ".dimmed(), charts.join(", "));
    println!();

    if !stats.top_queries.is_empty() {
        println!("{}", "Top Questions".bold());
        println!("  {:<48} {:>6}  {}", "Question", "Count", "Last seen");
        println!("  {}", "-".repeat(72));
        for q in stats.top_queries.iter().take(10) {
            println!(
                "  {:<48} {:>6}  {}",
                truncate(&q.query, 48),
                q.count,
                q.last_seen.get(..10).unwrap_or(q.last_seen.as_str()).dimmed()
            );
        }
    }
}

fn print_trends_table(trends: &[TrendEntry], days: u32) {
    if trends.is_empty() {
        return;
    }
    println!();
    println!("{}", format!("Last {days} days").bold());
    let max = trends.iter().map(|t| t.queries).max().unwrap_or(0) as f64;
    for t in trends {
        println!(
            "  {}  {:>4}  {:<30} {}",
            t.date,
            t.queries,
            render::bar(t.queries as f64, max, 30).cyan(),
            if t.fallbacks > 0 {
                format!("{} fallback(s)", t.fallbacks).yellow()
            } else {
                "".normal()
            }
        );
    }
}

fn print_stats_json(stats: &Stats) -> Result<()> {
    let dist = &stats.source_distribution;
    let value = serde_json::json!({
        "total_queries": stats.total_queries,
        "avg_latency_ms": stats.avg_latency_ms,
        "sources": {
            "model": dist.model,
            "unparseable": dist.unparseable,
            "unavailable": dist.unavailable,
        },
        "datasets": stats.dataset_counts,
        "charts": stats.chart_counts,
        "top_queries": stats.top_queries.iter().map(|q| serde_json::json!({
            "query": q.query,
            "count": q.count,
            "last_seen": q.last_seen,
        })).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_stats_csv(stats: &Stats) {
    println!("query,count,last_seen");
    for q in &stats.top_queries {
        println!("{},{},{}", csv_field(&q.query), q.count, q.last_seen);
    }
}

/// Quote a CSV field when it contains a separator, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// insightdash health
// ---------------------------------------------------------------------------

/// Check provider, API key, config files and the query log.
pub fn run_health() -> Result<()> {
    println!("{}", "insightdash Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let cfg = config::load();
    let report = health::check(&cfg);

    print_health_item(
        "Global config",
        report.config_exists,
        if report.config_exists {
            "~/.insightdash/config.toml found"
        } else {
            "not found (run `insightdash config init` to create)"
        },
    );
    let project_exists = config::project_config_file().is_some_and(|p| p.exists());
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".insightdash.toml found"
        } else {
            "none (optional)"
        },
    );

    print_health_item(
        "Provider / Model",
        true,
        &format!("{} / {}", report.provider, report.model),
    );
    match report.ollama_reachable {
        Some(ok) => print_health_item(
            "Ollama",
            ok,
            &if ok {
                format!("reachable at {}", cfg.model.ollama_url)
            } else {
                "not reachable, is Ollama running?".to_string()
            },
        ),
        None => print_health_item(
            "API key",
            report.api_key_set,
            &if report.api_key_set {
                format!("{} is set", report.api_key_env)
            } else {
                format!("{} is not set (answers will use sample data)", report.api_key_env)
            },
        ),
    }

    print_health_item(
        "Suggestions",
        cfg.suggestions.enabled,
        &if cfg.suggestions.enabled {
            format!("enabled, {} ms debounce", cfg.suggestions.debounce_ms)
        } else {
            "disabled".to_string()
        },
    );

    let log_detail = if !report.logging_enabled {
        "logging disabled".to_string()
    } else if report.log_exists {
        format!("{} entries", logger::read_all_entries().len())
    } else {
        "no log file yet".to_string()
    };
    print_health_item("Query log", report.logging_enabled && report.log_exists, &log_detail);

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<25} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// insightdash config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective insightdash Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file().is_some_and(|p| p.exists());
    let project_exists = config::project_config_file().is_some_and(|p| p.exists());
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.insightdash/config.toml", global_exists);
    print_source(".insightdash.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "INSIGHTDASH_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.insightdash/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!("  {}", "Edit the file to pick a provider and model.".dimmed());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
