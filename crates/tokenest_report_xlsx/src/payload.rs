//! Report payload models and lenient JSON decoding.
//!
//! Payloads come from external producers that are loose about types: empty
//! lists arrive as `null`, numbers sometimes arrive as strings, optional text
//! arrives as `""`. Only `report_type` is strict; every other field degrades
//! to its default instead of failing the whole payload.

use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::conf::N_COL_NAME_DEFAULT;
use crate::spec::{EnumReportKind, ReportError};

////////////////////////////////////////////////////////////////////////////////
// #region PayloadModels

/// One deviation column of an accuracy report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpecDeviationColumn {
    /// Table column holding percentage deviations.
    #[serde(default, deserialize_with = "deserialize_index")]
    pub index: Option<usize>,
    /// Chart title; header label when empty.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub title: String,
}

/// Accuracy report payload.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SpecAccuracyPayload {
    /// Report title.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub title: String,
    /// Generation timestamp, shown verbatim.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub generated_at: String,
    /// Free-form note under the timestamp.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub note: String,
    /// Column labels.
    #[serde(default, deserialize_with = "deserialize_text_list")]
    pub header: Vec<String>,
    /// Raw row values aligned to `header`.
    #[serde(default, deserialize_with = "deserialize_rows")]
    pub rows: Vec<Vec<Value>>,
    /// Columns to format as percentages and chart.
    #[serde(default, deserialize_with = "deserialize_list")]
    pub deviation_columns: Vec<SpecDeviationColumn>,
}

/// Name/value pair of the adversary parameter block.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SpecAdversaryParam {
    /// Parameter name.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: String,
    /// Parameter value, written as-is.
    #[serde(default)]
    pub value: Value,
}

/// Label/value pair of the adversary summary block.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SpecAdversarySummary {
    /// Summary label.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub label: String,
    /// Summary value, written as percentage when it parses as one.
    #[serde(default)]
    pub value: Value,
}

/// One adversary sub-table, rendered on its own sheet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpecAdversaryTable {
    /// Table title; also the sheet name source.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub title: String,
    /// Column labels.
    #[serde(default, deserialize_with = "deserialize_text_list")]
    pub header: Vec<String>,
    /// Raw row values aligned to `header`.
    #[serde(default, deserialize_with = "deserialize_rows")]
    pub rows: Vec<Vec<Value>>,
    /// Percentage column used as chart values; negative or absent means none.
    #[serde(default, deserialize_with = "deserialize_index")]
    pub ratio_column: Option<usize>,
    /// Column used as chart categories.
    #[serde(
        default = "derive_default_name_column",
        deserialize_with = "deserialize_name_column"
    )]
    pub name_column: Option<usize>,
}

/// Adversary report payload.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SpecAdversaryPayload {
    /// Report title.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub title: String,
    /// Generation timestamp, shown verbatim.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub generated_at: String,
    /// Run parameters.
    #[serde(default, deserialize_with = "deserialize_list")]
    pub params: Vec<SpecAdversaryParam>,
    /// Headline numbers.
    #[serde(default, deserialize_with = "deserialize_list")]
    pub summary: Vec<SpecAdversarySummary>,
    /// Sub-tables, one detail sheet each.
    #[serde(default, deserialize_with = "deserialize_list")]
    pub tables: Vec<SpecAdversaryTable>,
}

/// Decoded payload; the variant decides the workbook layout.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumReportPayload {
    /// `report_type: "accuracy"`.
    Accuracy(SpecAccuracyPayload),
    /// `report_type: "adversary"`.
    Adversary(SpecAdversaryPayload),
}

impl EnumReportPayload {
    /// Dispatch on `report_type` and decode the kind-specific fields.
    pub fn from_value(value: Value) -> Result<Self, ReportError> {
        let kind = derive_report_kind(&value)?;
        let payload = match kind {
            EnumReportKind::Accuracy => Self::Accuracy(serde_json::from_value(value)?),
            EnumReportKind::Adversary => Self::Adversary(serde_json::from_value(value)?),
        };
        Ok(payload)
    }

    /// Report kind of this payload.
    pub fn kind(&self) -> EnumReportKind {
        match self {
            Self::Accuracy(_) => EnumReportKind::Accuracy,
            Self::Adversary(_) => EnumReportKind::Adversary,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Loading

/// Parse a payload from JSON text.
pub fn parse_payload(text: &str) -> Result<EnumReportPayload, ReportError> {
    let value: Value = serde_json::from_str(text)?;
    EnumReportPayload::from_value(value)
}

/// Read and parse a payload file.
pub fn load_payload(path: &Path) -> Result<EnumReportPayload, ReportError> {
    let text = std::fs::read_to_string(path).map_err(|source| ReportError::PayloadRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_payload(&text)
}

fn derive_report_kind(value: &Value) -> Result<EnumReportKind, ReportError> {
    let report_type = value.get("report_type");
    match report_type.and_then(Value::as_str) {
        Some("accuracy") => Ok(EnumReportKind::Accuracy),
        Some("adversary") => Ok(EnumReportKind::Adversary),
        Some(other) => Err(ReportError::UnknownReportType(Some(other.to_string()))),
        None => Err(ReportError::UnknownReportType(
            report_type
                .filter(|val| !val.is_null())
                .map(ToString::to_string),
        )),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LenientDeserializers

fn derive_default_name_column() -> Option<usize> {
    Some(N_COL_NAME_DEFAULT)
}

fn derive_text_from_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(num) => num.to_string(),
        Value::Bool(val) => val.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn derive_index_from_value(value: &Value) -> Option<usize> {
    match value {
        Value::Number(num) => num.as_u64().and_then(|val| usize::try_from(val).ok()),
        Value::String(text) => text.trim().parse::<usize>().ok(),
        _ => None,
    }
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(derive_text_from_value(&value))
}

fn deserialize_text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(l_items) => l_items.iter().map(derive_text_from_value).collect(),
        _ => Vec::new(),
    })
}

fn deserialize_rows<'de, D>(deserializer: D) -> Result<Vec<Vec<Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(l_rows) = value else {
        return Ok(Vec::new());
    };
    Ok(l_rows
        .into_iter()
        .map(|row| match row {
            Value::Array(l_cells) => l_cells,
            _ => Vec::new(),
        })
        .collect())
}

/// Decode a list item by item, dropping items with the wrong shape.
fn deserialize_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(l_items) = value else {
        return Ok(Vec::new());
    };
    Ok(l_items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn deserialize_index<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(derive_index_from_value(&value))
}

fn deserialize_name_column<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(derive_default_name_column());
    }
    Ok(derive_index_from_value(&value))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
