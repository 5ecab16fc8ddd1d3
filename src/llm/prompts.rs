//! Prompt templates for the two model calls the dashboard makes.
//!
//! - [`analysis_prompt`] asks for a JSON object describing the answer to a
//!   business question and which dataset / chart best visualizes it.
//! - [`suggestion_prompt`] asks for a handful of completed questions given
//!   what the user has typed so far.

use crate::analysis::types::{ChartType, DatasetLabel};

/// Build the instruction for a structured analysis of `query`.
pub fn analysis_prompt(query: &str) -> String {
    let datasets = quoted_labels(DatasetLabel::ALL.iter().map(|d| d.as_str()));
    let charts = quoted_labels(ChartType::ALL.iter().map(|c| c.as_str()));
    let dataset_enum = pipe_labels(DatasetLabel::ALL.iter().map(|d| d.as_str()));
    let chart_enum = pipe_labels(ChartType::ALL.iter().map(|c| c.as_str()));

    format!(
        r#"You are an AI assistant for a business analytics dashboard. The user has asked the following business question:

"{query}"

Based on this question, please provide:

1. A detailed summary of the answer (2-3 sentences)
2. 3-4 key insights related to the question
3. Determine which dataset would be most appropriate to visualize this data from these options: {datasets}
4. Determine which chart type would be best to visualize this data: {charts}

Format your response as a JSON object with the following structure:
{{
  "summary": "Your summary here",
  "insights": ["Insight 1", "Insight 2", "Insight 3"],
  "dataset": "{dataset_enum}",
  "chartType": "{chart_enum}"
}}

Return ONLY the JSON object, nothing else. Do not include backticks, markdown formatting, or any other text."#
    )
}

/// Build the instruction asking for completions of `partial_query`.
pub fn suggestion_prompt(partial_query: &str) -> String {
    format!(
        r#"You are an AI assistant for a business analytics dashboard.
The user has started typing a business query: "{partial_query}"

Generate 3-5 complete business analytics queries that the user might be trying to ask.
These should be realistic business questions that would be asked to analyze company data.

Return ONLY the list of suggested queries, one per line, with no additional text, numbering, or formatting."#
    )
}

/// `"a", "b", or "c"`
fn quoted_labels<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = labels.map(|l| format!("\"{l}\"")).collect();
    match quoted.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{}, or {last}", rest.join(", ")),
        Some((last, _)) => last.clone(),
        None => String::new(),
    }
}

/// `a|b|c`
fn pipe_labels<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    labels.collect::<Vec<_>>().join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_prompt_embeds_query_and_enums() {
        let prompt = analysis_prompt("Which region grew fastest?");
        assert!(prompt.contains("\"Which region grew fastest?\""));
        assert!(prompt.contains("\"sales\", \"customers\", or \"marketing\""));
        assert!(prompt.contains("\"bar\", \"line\", or \"pie\""));
        assert!(prompt.contains("\"dataset\": \"sales|customers|marketing\""));
        assert!(prompt.contains("\"chartType\": \"bar|line|pie\""));
        assert!(prompt.contains("Return ONLY the JSON object"));
    }

    #[test]
    fn suggestion_prompt_embeds_partial_query() {
        let prompt = suggestion_prompt("revenue by");
        assert!(prompt.contains("\"revenue by\""));
        assert!(prompt.contains("one per line"));
    }

    #[test]
    fn quoted_labels_handles_short_lists() {
        assert_eq!(quoted_labels(["a"].into_iter()), "\"a\"");
        assert_eq!(quoted_labels(["a", "b"].into_iter()), "\"a\", or \"b\"");
        assert_eq!(quoted_labels(std::iter::empty()), "");
    }
}
