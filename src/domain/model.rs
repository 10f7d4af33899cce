use serde::{Deserialize, Serialize};
use std::fmt;

pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8";
pub const CSV_EXTENSION: &str = "csv";

/// One scalar cell of an exported table.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl CellValue {
    /// 將 JSON 值轉為儲存格；巢狀陣列/物件以精簡 JSON 文字保存
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Null,
            serde_json::Value::Bool(b) => CellValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Integer(i),
                None => CellValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => CellValue::Text(s),
            nested @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                CellValue::Text(nested.to_string())
            }
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(x) => f.write_str(&js_number(*x)),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Null => Ok(()),
        }
    }
}

/// Formats a float the way the dashboard's JavaScript prints numbers: `3` not `3.0`,
/// plain decimals in `[1e-6, 1e21)`, exponent form (`1e-7`, `1e+21`) outside it.
fn js_number(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if x == 0.0 {
        // -0 也印成 0
        return "0".to_string();
    }
    let magnitude = x.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{}", x);
    }
    let exponent = format!("{:e}", x);
    match exponent.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => exponent,
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

/// One row: field names in insertion order, each mapped to a cell.
///
/// Inserting an existing field replaces its value in place and keeps its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CellValue>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds a record from a JSON object, keeping the object's key order.
    pub fn from_json_object(object: serde_json::Map<String, serde_json::Value>) -> Self {
        let fields = object
            .into_iter()
            .map(|(k, v)| (k, CellValue::from_json(v)))
            .collect();
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum HeaderQuoting {
    /// Quote a header name only when it contains a comma, quote or line break.
    #[default]
    AsNeeded,
    Always,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum RecordPolicy {
    /// Missing fields become empty cells and extra fields are dropped, with a warning.
    #[default]
    Lenient,
    /// Any record whose keys differ from the header row is an error.
    Strict,
}

/// Encoding policies for the two cases the dashboard never defined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub header_quoting: HeaderQuoting,
    pub record_policy: RecordPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub records: Vec<Record>,
    /// Base file name, without extension.
    pub file_name: String,
}

impl ExportRequest {
    pub fn new(records: Vec<Record>, file_name: impl Into<String>) -> Self {
        Self {
            records,
            file_name: file_name.into(),
        }
    }
}

/// The in-memory file handed to a sink. Lives only for a single export call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDownload {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl CsvDownload {
    pub fn new(base_name: &str, text: String) -> Self {
        Self {
            file_name: format!("{}.{}", base_name, CSV_EXTENSION),
            mime_type: CSV_MIME_TYPE,
            bytes: text.into_bytes(),
        }
    }

    pub fn text(&self) -> &str {
        // bytes 只由 String 建立
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Nothing to export; no download was offered.
    Skipped,
    Delivered {
        file_name: String,
        location: String,
        rows: usize,
    },
}

impl ExportOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, ExportOutcome::Delivered { .. })
    }
}
