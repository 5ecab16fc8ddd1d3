/// Validation and coercion of model replies into a typed analysis.
///
/// The model answers in free text with no schema guarantee. Instead of
/// rejecting a reply outright, every field is checked independently and
/// replaced by a fixed default when it is missing or has the wrong shape:
///
/// 1. **Fences**: stray code-fence markers are removed before parsing.
/// 2. **Parse**: unparseable text is replaced by a fixed fallback object.
/// 3. **Coerce**: `summary`, `insights`, `dataset` and `chartType` are
///    validated one by one.
use serde_json::{Value, json};

use super::types::{ChartType, DatasetLabel};

/// Summary used when the reply has no usable `summary`.
pub const DEFAULT_SUMMARY: &str = "Analysis of your business query.";

/// Insights used when the reply's `insights` is not an array.
pub const DEFAULT_INSIGHTS: [&str; 3] = [
    "No specific insights were generated.",
    "Try asking a more specific question.",
    "You can ask about sales, customers, or marketing data.",
];

/// Summary of the object substituted for unparseable replies.
pub const UNPARSEABLE_SUMMARY: &str =
    "I couldn't generate a proper analysis for your query. Here's some sample data instead.";

/// Insights of the object substituted for unparseable replies.
pub const UNPARSEABLE_INSIGHTS: [&str; 3] = [
    "This is sample data and not based on your specific query.",
    "Try asking a more specific business question.",
    "You can ask about sales, customers, or marketing data.",
];

/// Fields of a reply after per-field coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedReply {
    pub summary: String,
    pub insights: Vec<String>,
    pub dataset: DatasetLabel,
    pub chart_type: ChartType,
}

/// Outcome of parsing the raw model text.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedReply {
    /// The text was valid JSON (of any shape).
    Parsed(Value),
    /// The text was not JSON; carries the substitute object.
    Unparseable(Value),
}

impl ParsedReply {
    pub fn value(&self) -> &Value {
        match self {
            Self::Parsed(v) | Self::Unparseable(v) => v,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }
}

/// Remove every "```json" marker, then every remaining "```", then trim.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse cleaned model text, substituting [`unparseable_reply`] on failure.
pub fn parse_reply(text: &str) -> ParsedReply {
    let cleaned = strip_code_fences(text);
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => ParsedReply::Parsed(value),
        Err(_) => ParsedReply::Unparseable(unparseable_reply()),
    }
}

/// The object used in place of a reply that could not be parsed.
///
/// It still goes through [`coerce_reply`] like any other reply.
pub fn unparseable_reply() -> Value {
    json!({
        "summary": UNPARSEABLE_SUMMARY,
        "insights": UNPARSEABLE_INSIGHTS,
        "dataset": "sales",
        "chartType": "bar",
    })
}

/// Coerce each field of `reply` independently.
///
/// A reply that is not a JSON object (an array, a number, `null`) yields the
/// default for every field.
pub fn coerce_reply(reply: &Value) -> ValidatedReply {
    let field = |name: &str| reply.as_object().and_then(|obj| obj.get(name));

    ValidatedReply {
        summary: coerce_summary(field("summary")),
        insights: coerce_insights(field("insights")),
        dataset: field("dataset")
            .and_then(Value::as_str)
            .and_then(DatasetLabel::from_label)
            .unwrap_or_default(),
        chart_type: field("chartType")
            .and_then(Value::as_str)
            .and_then(ChartType::from_label)
            .unwrap_or_default(),
    }
}

/// Keep a truthy summary, otherwise use [`DEFAULT_SUMMARY`].
///
/// Falsy values are missing, `null`, `false`, `0` and `""`. Truthy scalars
/// are rendered as text; objects and arrays cannot be displayed as a summary
/// and fall back to the default.
fn coerce_summary(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Bool(true)) => "true".to_string(),
        Some(Value::Number(n)) if n.as_f64().is_some_and(|f| f != 0.0) => n.to_string(),
        _ => DEFAULT_SUMMARY.to_string(),
    }
}

/// Keep an array of insights, otherwise use [`DEFAULT_INSIGHTS`].
///
/// Scalar elements are rendered as text; `null` and nested structures are
/// dropped since they have no display form.
fn coerce_insights(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect(),
        _ => DEFAULT_INSIGHTS.iter().map(|s| (*s).to_string()).collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fences() {
        let text = "```json\n{\"summary\":\"x\"}\n```";
        assert_eq!(strip_code_fences(text), "{\"summary\":\"x\"}");
    }

    #[test]
    fn strips_bare_fences_and_whitespace() {
        assert_eq!(strip_code_fences("  ```\n{}\n```  "), "{}");
        assert_eq!(strip_code_fences("{}"), "{}");
    }

    #[test]
    fn well_formed_reply_passes_through() {
        let reply = json!({
            "summary": "Sales grew.",
            "insights": ["A", "B"],
            "dataset": "customers",
            "chartType": "pie",
        });
        let validated = coerce_reply(&reply);
        assert_eq!(validated.summary, "Sales grew.");
        assert_eq!(validated.insights, vec!["A", "B"]);
        assert_eq!(validated.dataset, DatasetLabel::Customers);
        assert_eq!(validated.chart_type, ChartType::Pie);
    }

    #[test]
    fn bad_fields_are_replaced_individually() {
        let reply = json!({
            "summary": "Kept.",
            "insights": "not an array",
            "dataset": "inventory",
            "chartType": "line",
        });
        let validated = coerce_reply(&reply);
        assert_eq!(validated.summary, "Kept.");
        assert_eq!(validated.insights, DEFAULT_INSIGHTS);
        assert_eq!(validated.dataset, DatasetLabel::Sales);
        assert_eq!(validated.chart_type, ChartType::Line);
    }

    #[test]
    fn falsy_summary_uses_default() {
        for summary in [json!(""), json!(null), json!(false), json!(0)] {
            let validated = coerce_reply(&json!({ "summary": summary }));
            assert_eq!(validated.summary, DEFAULT_SUMMARY);
        }
    }

    #[test]
    fn truthy_scalar_summary_is_rendered() {
        let validated = coerce_reply(&json!({ "summary": 42 }));
        assert_eq!(validated.summary, "42");
    }

    #[test]
    fn empty_insights_array_is_kept() {
        let validated = coerce_reply(&json!({ "insights": [] }));
        assert!(validated.insights.is_empty());
    }

    #[test]
    fn insight_elements_are_stringified_or_dropped() {
        let validated = coerce_reply(&json!({ "insights": ["a", 2, true, null, {"k": 1}] }));
        assert_eq!(validated.insights, vec!["a", "2", "true"]);
    }

    #[test]
    fn non_object_reply_gets_all_defaults() {
        for reply in [json!([1, 2]), json!(7), json!(null), json!("text")] {
            let validated = coerce_reply(&reply);
            assert_eq!(validated.summary, DEFAULT_SUMMARY);
            assert_eq!(validated.insights, DEFAULT_INSIGHTS);
            assert_eq!(validated.dataset, DatasetLabel::Sales);
            assert_eq!(validated.chart_type, ChartType::Bar);
        }
    }

    #[test]
    fn unparseable_text_substitutes_fallback_object() {
        let parsed = parse_reply("Sure! Sales look great this quarter.");
        assert!(!parsed.is_parsed());
        let validated = coerce_reply(parsed.value());
        assert_eq!(validated.summary, UNPARSEABLE_SUMMARY);
        assert_eq!(validated.insights, UNPARSEABLE_INSIGHTS);
        assert_eq!(validated.chart_type, ChartType::Bar);
        assert_eq!(validated.dataset, DatasetLabel::Sales);
    }

    #[test]
    fn fenced_json_parses() {
        let parsed = parse_reply("```json\n{\"dataset\":\"marketing\"}\n```");
        assert!(parsed.is_parsed());
        assert_eq!(coerce_reply(parsed.value()).dataset, DatasetLabel::Marketing);
    }
}
