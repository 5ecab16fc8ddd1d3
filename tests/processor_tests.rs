/// Integration tests for the query processor.
///
/// Each test scripts the model's raw reply and checks the coerced result,
/// covering the three result paths: model, unparseable and unavailable.
use std::sync::Arc;

use anyhow::{Result, bail};
use insightdash::analysis::validation::{DEFAULT_INSIGHTS, DEFAULT_SUMMARY};
use insightdash::analysis::{
    AnalysisSource, ChartType, DatasetLabel, QueryProcessor, UNAVAILABLE_INSIGHTS,
    UNAVAILABLE_SUMMARY, datasets,
};
use insightdash::llm::CompletionModel;

enum Reply {
    Text(&'static str),
    Error,
}

struct ScriptedModel(Reply);

impl CompletionModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        assert!(prompt.contains("business question"));
        match &self.0 {
            Reply::Text(text) => Ok((*text).to_string()),
            Reply::Error => bail!("connection refused"),
        }
    }
}

fn processor(reply: Reply) -> QueryProcessor {
    QueryProcessor::new(Arc::new(ScriptedModel(reply)))
}

#[test]
fn well_formed_reply_is_used_as_is() {
    let analysis = processor(Reply::Text(
        r#"{"summary":"Email converts best.","insights":["Email 8%","Social 3%"],"dataset":"marketing","chartType":"pie"}"#,
    ))
    .analyze("Which channel converts best?");

    assert_eq!(analysis.source, AnalysisSource::Model);
    assert_eq!(analysis.dataset, DatasetLabel::Marketing);
    assert_eq!(analysis.result.summary, "Email converts best.");
    assert_eq!(analysis.result.insights, ["Email 8%", "Social 3%"]);
    assert_eq!(analysis.result.chart_type, ChartType::Pie);
    assert_eq!(analysis.result.data, datasets::records(DatasetLabel::Marketing));
}

#[test]
fn code_fences_are_stripped() {
    let result = processor(Reply::Text(
        "```json\n{\"summary\":\"S\",\"insights\":[],\"dataset\":\"customers\",\"chartType\":\"bar\"}\n```",
    ))
    .process("q");

    assert_eq!(result.summary, "S");
    assert!(result.insights.is_empty());
    assert_eq!(result.data, datasets::records(DatasetLabel::Customers));
}

#[test]
fn invalid_fields_fall_back_individually() {
    let result = processor(Reply::Text(
        r#"{"summary":"","insights":"not a list","dataset":"inventory","chartType":"scatter"}"#,
    ))
    .process("q");

    assert_eq!(result.summary, DEFAULT_SUMMARY);
    assert_eq!(result.insights, DEFAULT_INSIGHTS);
    assert_eq!(result.chart_type, ChartType::Bar);
    assert_eq!(result.data, datasets::records(DatasetLabel::Sales));
}

#[test]
fn mixed_insights_keep_scalars_only() {
    let result = processor(Reply::Text(
        r#"{"summary":42,"insights":["a",7,null,{"x":1},true],"dataset":"sales","chartType":"line"}"#,
    ))
    .process("q");

    assert_eq!(result.summary, "42");
    assert_eq!(result.insights, ["a", "7", "true"]);
    assert_eq!(result.chart_type, ChartType::Line);
}

#[test]
fn labels_are_case_sensitive() {
    let result = processor(Reply::Text(
        r#"{"summary":"S","insights":[],"dataset":"Marketing","chartType":"PIE"}"#,
    ))
    .process("q");

    assert_eq!(result.chart_type, ChartType::Bar);
    assert_eq!(result.data, datasets::records(DatasetLabel::Sales));
}

#[test]
fn non_object_json_gets_all_defaults() {
    for reply in ["null", "[1,2,3]", "\"just text\"", "17"] {
        let analysis = processor(Reply::Text(reply)).analyze("q");
        assert_eq!(analysis.source, AnalysisSource::Model, "reply {reply}");
        assert_eq!(analysis.result.summary, DEFAULT_SUMMARY);
        assert_eq!(analysis.result.insights, DEFAULT_INSIGHTS);
        assert_eq!(analysis.dataset, DatasetLabel::Sales);
    }
}

#[test]
fn prose_reply_is_unparseable() {
    let analysis = processor(Reply::Text("Here is your analysis: sales went up.")).analyze("q");
    assert_eq!(analysis.source, AnalysisSource::Unparseable);
    assert_eq!(analysis.result.chart_type, ChartType::Bar);
    assert_eq!(analysis.result.data, datasets::records(DatasetLabel::Sales));
    assert_eq!(analysis.result.insights.len(), 3);
}

#[test]
fn model_error_yields_unavailable_result() {
    let analysis = processor(Reply::Error).analyze("q");
    assert_eq!(analysis.source, AnalysisSource::Unavailable);
    assert_eq!(analysis.result.summary, UNAVAILABLE_SUMMARY);
    assert_eq!(analysis.result.insights, UNAVAILABLE_INSIGHTS);
    assert_eq!(analysis.result.chart_type, ChartType::Bar);
    assert_eq!(analysis.result.data, datasets::records(DatasetLabel::Sales));
}

#[test]
fn every_result_has_valid_labels_and_data() {
    let replies = [
        Reply::Text(r#"{"dataset":"customers","chartType":"line"}"#),
        Reply::Text("{}"),
        Reply::Text(""),
        Reply::Text("```"),
        Reply::Error,
    ];
    for reply in replies {
        let result = processor(reply).process("q");
        assert!(!result.data.is_empty());
        assert!(ChartType::ALL.contains(&result.chart_type));
        assert!(
            DatasetLabel::ALL
                .iter()
                .any(|label| datasets::records(*label) == result.data)
        );
    }
}
