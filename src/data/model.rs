use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde_json::Value as JsonValue;

use crate::classify::MethodLabel;
use crate::measure::MeasurementRange;
use crate::mentions;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the source table
// ---------------------------------------------------------------------------

/// A dynamically-typed table cell mirroring common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// JSON array of strings, e.g. a saved mentions list.
    List(Vec<String>),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::List(items) => f.write_str(&mentions::flatten(items)),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Infer a type from a text cell (CSV). Empty cells are `Null`.
    pub fn guess(s: &str) -> Self {
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }

    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Text content of the cell; `Null` reads as an empty note.
    pub fn as_text(&self) -> String {
        self.to_string()
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            CellValue::String(s) => JsonValue::String(s.clone()),
            CellValue::Integer(i) => JsonValue::from(*i),
            CellValue::Float(f) => JsonValue::from(*f),
            CellValue::Bool(b) => JsonValue::Bool(*b),
            CellValue::List(items) => JsonValue::from(items.clone()),
            CellValue::Null => JsonValue::Null,
        }
    }
}

impl From<&JsonValue> for CellValue {
    fn from(val: &JsonValue) -> Self {
        match val {
            JsonValue::String(s) => CellValue::String(s.clone()),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CellValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    CellValue::Float(f)
                } else {
                    CellValue::String(n.to_string())
                }
            }
            JsonValue::Bool(b) => CellValue::Bool(*b),
            JsonValue::Null => CellValue::Null,
            JsonValue::Array(items) if items.iter().all(JsonValue::is_string) => CellValue::List(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            other => CellValue::String(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// NoteRecord – one row of the notes table
// ---------------------------------------------------------------------------

/// A clinical note moving through the pipeline. Loaders fill `id`,
/// `raw_text` and `extra`; each stage fills one more field.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteRecord {
    pub id: CellValue,
    pub raw_text: String,
    pub clean_text: String,
    /// Matched phrase spans, in match order.
    pub mentions: Vec<String>,
    pub method: Option<MethodLabel>,
    pub measurement: Option<MeasurementRange>,
    /// Pass-through columns: column_name → value.
    pub extra: BTreeMap<String, CellValue>,
}

impl NoteRecord {
    pub fn new(id: CellValue, raw_text: impl Into<String>) -> Self {
        Self {
            id,
            raw_text: raw_text.into(),
            clean_text: String::new(),
            mentions: Vec::new(),
            method: None,
            measurement: None,
            extra: BTreeMap::new(),
        }
    }

    /// Mentions flattened into one string, the input of method
    /// classification and measurement extraction.
    pub fn mention_text(&self) -> String {
        mentions::flatten(&self.mentions)
    }
}

// ---------------------------------------------------------------------------
// NoteDataset – the complete loaded table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteDataset {
    pub records: Vec<NoteRecord>,
    /// Ordered list of pass-through column names.
    pub extra_columns: Vec<String>,
}

impl NoteDataset {
    /// Build the pass-through column index from the loaded records.
    pub fn from_records(records: Vec<NoteRecord>) -> Self {
        let columns: BTreeSet<String> = records
            .iter()
            .flat_map(|r| r.extra.keys().cloned())
            .collect();
        NoteDataset {
            records,
            extra_columns: columns.into_iter().collect(),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
