//! Terminal rendering of an [`AnalysisResult`] for `insightdash ask`.
//!
//! Mirrors the dashboard tabs: summary, chart, table, insights. Charts are
//! text: horizontal bars for `bar`, one sparkline per series for `line`, and
//! share-of-total bars for `pie`.

use colored::Colorize;

use crate::analysis::{AnalysisResult, ChartType, Record, types::series_names};

const BAR_WIDTH: usize = 40;
const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub fn print_result(query: &str, result: &AnalysisResult) {
    println!("{}", query.bold().cyan());
    println!("{}", "=".repeat(60));
    println!();

    println!("{}", "Summary".bold());
    println!("  {}", result.summary);
    println!();

    println!("{} {}", "Chart".bold(), format!("({})", result.chart_type).dimmed());
    let series = series_names(&result.data);
    match result.chart_type {
        ChartType::Bar => print_bars(&result.data, &series),
        ChartType::Line => print_sparklines(&result.data, &series),
        ChartType::Pie => print_shares(&result.data, series.first().map(String::as_str)),
    }
    println!();

    println!("{}", "Table".bold());
    print_table(&result.data, &series);
    println!();

    println!("{}", "Insights".bold());
    if result.insights.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for insight in &result.insights {
        println!("  {} {}", "•".cyan(), insight);
    }
}

fn print_bars(data: &[Record], series: &[String]) {
    let max = max_value(data, series);
    let label_width = label_width(data);
    for record in data {
        for name in series {
            let value = record.value(name).unwrap_or(0.0);
            println!(
                "  {:<label_width$} {:<12} {} {}",
                record.name,
                name.dimmed(),
                bar(value, max, BAR_WIDTH).green(),
                format_value(value)
            );
        }
    }
}

fn print_sparklines(data: &[Record], series: &[String]) {
    let labels: Vec<&str> = data.iter().map(|r| r.name.as_str()).collect();
    println!("  {:<12} {}", "", labels.join(" ").dimmed());
    for name in series {
        let values: Vec<f64> = data.iter().map(|r| r.value(name).unwrap_or(0.0)).collect();
        println!("  {:<12} {}", name, sparkline(&values).blue());
    }
}

fn print_shares(data: &[Record], series: Option<&str>) {
    let Some(series) = series else {
        println!("  {}", "no data".dimmed());
        return;
    };
    let total: f64 = data.iter().filter_map(|r| r.value(series)).sum();
    let label_width = label_width(data);
    for record in data {
        let value = record.value(series).unwrap_or(0.0);
        let share = if total > 0.0 { value / total } else { 0.0 };
        println!(
            "  {:<label_width$} {} {:>5.1}%",
            record.name,
            bar(share, 1.0, BAR_WIDTH).purple(),
            share * 100.0
        );
    }
}

fn print_table(data: &[Record], series: &[String]) {
    let label_width = label_width(data).max(4);
    let mut header = format!("  {:<label_width$}", "Name");
    for name in series {
        header.push_str(&format!(" {name:>12}"));
    }
    println!("{}", header.dimmed());
    for record in data {
        let mut line = format!("  {:<label_width$}", record.name);
        for name in series {
            let cell = record.value(name).map(format_value).unwrap_or_default();
            line.push_str(&format!(" {cell:>12}"));
        }
        println!("{line}");
    }
}

fn label_width(data: &[Record]) -> usize {
    data.iter().map(|r| r.name.chars().count()).max().unwrap_or(0)
}

fn max_value(data: &[Record], series: &[String]) -> f64 {
    data.iter()
        .flat_map(|r| series.iter().filter_map(|s| r.value(s)))
        .fold(0.0, f64::max)
}

/// A bar of `width * value / max` block characters.
pub(crate) fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let filled = ((value / max) * width as f64).round() as usize;
    "█".repeat(filled.clamp(1, width))
}

pub(crate) fn sparkline(values: &[f64]) -> String {
    let max = values.iter().copied().fold(0.0, f64::max);
    values
        .iter()
        .map(|&v| {
            if max <= 0.0 {
                return SPARK_LEVELS[0];
            }
            let idx = ((v / max) * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
            SPARK_LEVELS[idx.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

/// Whole numbers without decimals, with comma separators.
pub(crate) fn format_value(value: f64) -> String {
    if value.fract() != 0.0 {
        return format!("{value:.2}");
    }
    let digits = (value.abs() as u64).to_string();
    let mut result = String::new();
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    let grouped: String = result.chars().rev().collect();
    if value < 0.0 { format!("-{grouped}") } else { grouped }
}
