//! Projections of an extraction result for display and export.
//!
//! All functions here are pure over the result except [`export_json`], and
//! none of them mutate the result they are given. Results are assumed to be
//! tree-shaped (as any parsed JSON document is), so traversal always ends.

use crate::error::ExportError;
use crate::types::{DisplayField, Field, FieldMap, RawField, ViewMode};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIDENCE_KEY: &str = "confidence";
const ABSENT: &str = "—";

/// Flatten `result.pages[0].fields` into a name-keyed map.
///
/// Missing result, missing or empty `pages`, or missing `fields` all give an
/// empty map. Entries without a truthy `name` are skipped.
pub fn build_field_map(result: Option<&Value>) -> FieldMap {
    let mut map = FieldMap::new();
    let Some(first_page) = result
        .and_then(|r| r.get("pages"))
        .and_then(|p| p.as_array())
        .and_then(|pages| pages.first())
    else {
        return map;
    };
    let Some(fields) = first_page.get("fields").and_then(|f| f.as_array()) else {
        return map;
    };
    for entry in fields.iter().filter(|e| e.is_object()) {
        if let Some(field) = RawField::deserialize(entry).ok().and_then(RawField::into_field) {
            map.insert(field.name.clone(), field);
        }
    }
    map
}

/// Display text for `key`, or `None` if the field is absent or its value falsy.
pub fn render_value(field_map: &FieldMap, key: &str) -> Option<String> {
    field_map.get(key).and_then(Field::display_value)
}

/// Entries of `spec` whose field has a truthy value, in `spec` order.
pub fn available_fields(field_map: &FieldMap, spec: &[DisplayField]) -> Vec<DisplayField> {
    spec.iter()
        .filter(|f| render_value(field_map, f.key).is_some())
        .copied()
        .collect()
}

/// Deep copy of `node` with every object key named `confidence` removed at any depth.
pub fn filter_confidence(node: &Value) -> Value {
    match node {
        Value::Array(items) => Value::Array(items.iter().map(filter_confidence).collect()),
        Value::Object(obj) => Value::Object(
            obj.iter()
                .filter(|(k, _)| k.as_str() != CONFIDENCE_KEY)
                .map(|(k, v)| (k.clone(), filter_confidence(v)))
                .collect::<Map<String, Value>>(),
        ),
        scalar => scalar.clone(),
    }
}

/// Confidence-filtered result, pretty-printed with two-space indentation.
pub fn filtered_json(result: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&filter_confidence(result))
}

/// File name used for exports taken at `timestamp_ms`.
pub fn export_file_name(timestamp_ms: i64) -> String {
    format!("extracted-data-{}.json", timestamp_ms)
}

/// Write the confidence-filtered result into `dir` as
/// `extracted-data-<epoch-millis>.json` and return the written path.
pub fn export_json(result: &Value, dir: &Path) -> Result<PathBuf, ExportError> {
    let timestamp = chrono::Utc::now().timestamp_millis();
    export_json_at(result, dir, timestamp)
}

pub(crate) fn export_json_at(
    result: &Value,
    dir: &Path,
    timestamp_ms: i64,
) -> Result<PathBuf, ExportError> {
    let body = filtered_json(result)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(timestamp_ms));
    fs::write(&path, body.as_bytes())?;
    log::info!("[export] wrote {}", path.display());
    Ok(path)
}

/// Table of the available display fields, or the "no fields" notice.
pub fn render_formatted(result: &Value, spec: &[DisplayField]) -> String {
    let field_map = build_field_map(Some(result));
    let rows = available_fields(&field_map, spec);

    let mut out = String::new();
    if let Some(doc_type) = result.get("document_type").and_then(|d| d.as_str()) {
        let _ = writeln!(out, "Document type: {}", doc_type);
    }
    if rows.is_empty() {
        out.push_str("No fields found in this document.\n");
        return out;
    }

    let width = rows.iter().map(|r| r.label.chars().count()).max().unwrap_or(0);
    for row in rows {
        let value = render_value(&field_map, row.key).unwrap_or_else(|| ABSENT.to_string());
        let mut lines = value.lines();
        let first = lines.next().unwrap_or("");
        let _ = writeln!(out, "{:<width$}  {}", row.label, first, width = width);
        // Multi-line values (addresses) stay aligned under the value column.
        for line in lines {
            let _ = writeln!(out, "{:<width$}  {}", "", line, width = width);
        }
    }
    out
}

/// Render `result` in the given mode.
pub fn render(
    result: &Value,
    mode: ViewMode,
    spec: &[DisplayField],
) -> Result<String, serde_json::Error> {
    match mode {
        ViewMode::Formatted => Ok(render_formatted(result, spec)),
        ViewMode::Raw => filtered_json(result).map(|mut s| {
            s.push('\n');
            s
        }),
    }
}
