use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

/// Single OCR-extracted field from the first page of a result.
///
/// `value` is kept as the raw JSON value the backend sent (it may be a string,
/// `null`, or occasionally a number) so that truthiness is judged on what was
/// actually returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: Value,
    pub confidence: Option<f64>,
}

/// A `fields[]` entry exactly as the backend sent it. Every member is
/// optional and untyped; [`RawField::into_field`] decides what is usable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawField {
    pub name: Value,
    pub value: Value,
    pub confidence: Value,
}

impl RawField {
    /// `None` when the entry has no truthy `name`. Non-string names are keyed
    /// by their JSON text; a non-numeric confidence is dropped.
    pub fn into_field(self) -> Option<Field> {
        if !is_truthy(&self.name) {
            return None;
        }
        let name = match self.name {
            Value::String(s) => s,
            other => other.to_string(),
        };
        Some(Field {
            name,
            value: self.value,
            confidence: self.confidence.as_f64(),
        })
    }
}

impl Field {
    /// Text to show for this field, or `None` when the value is falsy
    /// (missing, `null`, `""`, `false`, `0`).
    pub fn display_value(&self) -> Option<String> {
        if !is_truthy(&self.value) {
            return None;
        }
        match &self.value {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Field name -> field, built from `pages[0].fields`. Later duplicates win.
pub type FieldMap = HashMap<String, Field>;

/// One row of the formatted view: display label and canonical field key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayField {
    pub label: &'static str,
    pub key: &'static str,
}

/// Fields eligible for the formatted view, in display order.
pub const DISPLAY_FIELDS: &[DisplayField] = &[
    DisplayField { label: "Name", key: "name" },
    DisplayField { label: "Phone", key: "phone" },
    DisplayField { label: "Email", key: "email" },
    DisplayField { label: "Address", key: "address" },
    DisplayField { label: "Postcode", key: "postcode" },
    DisplayField { label: "Date of Birth", key: "dob" },
];

/// A file chosen through the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub mime: &'static str,
}

/// Presentation mode of a displayed result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Formatted,
    Raw,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Formatted => ViewMode::Raw,
            ViewMode::Raw => ViewMode::Formatted,
        }
    }
}

/// JSON truthiness as the web frontend of this service judges it.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
