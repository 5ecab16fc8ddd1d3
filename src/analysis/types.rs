//! Typed result shapes produced by the query processor.
//!
//! Everything in here is already validated: renderers (web frontend,
//! terminal) consume these types and never look at raw model text.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Chart type
// ---------------------------------------------------------------------------

/// Chart used to visualize an [`AnalysisResult`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Pie,
}

impl ChartType {
    /// Every accepted chart type, in prompt order.
    pub const ALL: [ChartType; 3] = [Self::Bar, Self::Line, Self::Pie];

    /// Exact label match, as the model is instructed to answer.
    ///
    /// Case and surrounding whitespace are significant: `"Bar"` or `" bar"`
    /// are rejected so the caller falls back to the default.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == label)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Dataset label
// ---------------------------------------------------------------------------

/// Category label selecting one of the static datasets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetLabel {
    #[default]
    Sales,
    Customers,
    Marketing,
}

impl DatasetLabel {
    /// Every dataset label, in prompt order. The first one is the default.
    pub const ALL: [DatasetLabel; 3] = [Self::Sales, Self::Customers, Self::Marketing];

    /// Exact label match; see [`ChartType::from_label`].
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == label)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Customers => "customers",
            Self::Marketing => "marketing",
        }
    }
}

impl fmt::Display for DatasetLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One row of a dataset: a `name` label plus one numeric value per series.
///
/// Serializes flat, e.g. `{"name":"Jan","Product A":4000.0}`, which is the
/// shape the chart and table renderers expect. Series keep dataset order, so
/// table columns and legends come out the way the dataset lists them.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub values: Vec<(String, f64)>,
}

impl Record {
    pub fn new(name: impl Into<String>, values: &[(&str, f64)]) -> Self {
        Self {
            name: name.into(),
            values: values
                .iter()
                .map(|(series, value)| ((*series).to_string(), *value))
                .collect(),
        }
    }

    /// Value of `series` in this row, if present.
    pub fn value(&self, series: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(name, _)| name == series)
            .map(|(_, value)| *value)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("name", &self.name)?;
        for (series, value) in &self.values {
            map.serialize_entry(series, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a flat record with a `name` and numeric series")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
        let mut name: Option<String> = None;
        let mut values = Vec::new();
        while let Some(key) = access.next_key::<String>()? {
            if key == "name" {
                if name.is_some() {
                    return Err(de::Error::duplicate_field("name"));
                }
                name = Some(access.next_value()?);
            } else {
                let value: f64 = access.next_value()?;
                values.push((key, value));
            }
        }
        let name = name.ok_or_else(|| de::Error::missing_field("name"))?;
        Ok(Record { name, values })
    }
}

/// Series names appearing in `records`, in first-seen order.
pub fn series_names(records: &[Record]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for record in records {
        for (series, _) in &record.values {
            if !names.iter().any(|n| n == series) {
                names.push(series.clone());
            }
        }
    }
    names
}

// ---------------------------------------------------------------------------
// Analysis result
// ---------------------------------------------------------------------------

/// Normalized, validated answer to a business question, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub data: Vec<Record>,
    pub summary: String,
    pub insights: Vec<String>,
    pub chart_type: ChartType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_type_requires_exact_label() {
        assert_eq!(ChartType::from_label("line"), Some(ChartType::Line));
        assert_eq!(ChartType::from_label("pie"), Some(ChartType::Pie));
        assert_eq!(ChartType::from_label("Line"), None);
        assert_eq!(ChartType::from_label(" bar"), None);
        assert_eq!(ChartType::from_label("scatter"), None);
    }

    #[test]
    fn dataset_label_requires_exact_label() {
        assert_eq!(DatasetLabel::from_label("marketing"), Some(DatasetLabel::Marketing));
        assert_eq!(DatasetLabel::from_label("Sales"), None);
        assert_eq!(DatasetLabel::from_label(""), None);
    }

    #[test]
    fn record_serializes_flat() {
        let record = Record::new("Email", &[("value", 4000.0)]);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "Email");
        assert_eq!(json["value"], 4000.0);
    }

    #[test]
    fn result_uses_camel_case_chart_type() {
        let result = AnalysisResult {
            data: vec![Record::new("Jan", &[("Product A", 1.0)])],
            summary: "s".to_string(),
            insights: vec![],
            chart_type: ChartType::Pie,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"chartType\":\"pie\""));
    }

    #[test]
    fn record_keeps_series_order_through_json() {
        let record = Record::new("18-24", &[("Male", 400.0), ("Female", 450.0), ("Other", 50.0)]);
        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(text, r#"{"name":"18-24","Male":400.0,"Female":450.0,"Other":50.0}"#);

        let back: Record = serde_json::from_str(&text).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.value("Female"), Some(450.0));
        assert!(serde_json::from_str::<Record>(r#"{"Male":1.0}"#).is_err());
    }

    #[test]
    fn series_names_keep_first_seen_order() {
        let records = vec![
            Record::new("a", &[("x", 1.0), ("y", 2.0)]),
            Record::new("b", &[("y", 3.0), ("z", 4.0)]),
        ];
        assert_eq!(series_names(&records), vec!["x", "y", "z"]);
    }
}
