//! Single-column inline edits.
//!
//! Admin tables are edited one cell at a time. Each table exposes a closed
//! enum of editable fields; the enum supplies the column name and the kind of
//! value it holds, so no caller-provided string ever reaches SQL as an
//! identifier. Raw values arrive as strings and an empty string clears the
//! column.

use chrono::NaiveDate;
use serde::Deserialize;

/// The storage kind of an editable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Real,
    Integer,
    Date,
    /// One of a fixed set of lowercase string values.
    Choice(&'static [&'static str]),
}

/// A parsed value ready to be bound to an UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Real(f64),
    Integer(i64),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

/// A column that can be edited in place.
pub trait EditableField: Copy + std::fmt::Debug {
    /// Column name in the backing table.
    fn column(&self) -> &'static str;

    fn kind(&self) -> FieldKind;

    /// Whether the column rejects NULL.
    fn required(&self) -> bool {
        false
    }
}

/// Request body for a single inline edit.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldUpdate<F> {
    pub field: F,
    #[serde(default)]
    pub value: Option<String>,
}

/// Parse a raw cell value for `field`.
///
/// Blank input becomes [`FieldValue::Null`]; required fields reject it.
pub fn parse_field_value<F: EditableField>(
    field: F,
    raw: Option<&str>,
) -> Result<FieldValue, String> {
    let column = field.column();
    let trimmed = raw.map(str::trim).unwrap_or_default();

    if trimmed.is_empty() {
        if field.required() {
            return Err(format!("'{column}' cannot be empty"));
        }
        return Ok(FieldValue::Null);
    }

    match field.kind() {
        FieldKind::Text => Ok(FieldValue::Text(trimmed.to_string())),
        FieldKind::Real => trimmed
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(FieldValue::Real)
            .ok_or_else(|| format!("'{column}' must be a number")),
        FieldKind::Integer => trimmed
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|_| format!("'{column}' must be a whole number")),
        FieldKind::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(FieldValue::Date)
            .map_err(|_| format!("'{column}' must be a date in YYYY-MM-DD format")),
        FieldKind::Choice(allowed) => {
            let lowered = trimmed.to_lowercase();
            if allowed.contains(&lowered.as_str()) {
                Ok(FieldValue::Text(lowered))
            } else {
                Err(format!(
                    "'{column}' must be one of: {}",
                    allowed.join(", ")
                ))
            }
        }
    }
}
