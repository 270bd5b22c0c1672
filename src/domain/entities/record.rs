use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::entities::table::{ColumnId, ColumnType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub i64);

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId(value)
    }
}

/// Server-confirmed field-value mapping for one row.
pub type Record = BTreeMap<ColumnId, CellValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Text(String),
    Number(f64),
    Boolean(bool),
    Date(NaiveDate),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Parses user input for a column of the given type. Empty input maps
    /// to NULL; whether NULL is acceptable is the backend's decision, not
    /// the parser's.
    pub fn parse_input(column_type: ColumnType, input: &str) -> Result<CellValue, String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(CellValue::Null);
        }
        match column_type {
            ColumnType::Text => Ok(CellValue::Text(trimmed.to_string())),
            ColumnType::Number => parse_numeric_value(trimmed)
                .map(CellValue::Number)
                .ok_or_else(|| format!("not a number: {trimmed}")),
            ColumnType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(CellValue::Boolean(true)),
                "false" | "0" | "no" => Ok(CellValue::Boolean(false)),
                _ => Err(format!("not a boolean: {trimmed}")),
            },
            ColumnType::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(CellValue::Date)
                .map_err(|_| format!("not a date (expected YYYY-MM-DD): {trimmed}")),
        }
    }

    /// Display rendering. NULL renders as an empty string here; the cell
    /// renderer substitutes the dimmed NULL sentinel.
    pub fn display(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Text(text) => text.clone(),
            CellValue::Number(value) => format_number(*value),
            CellValue::Boolean(value) => value.to_string(),
            CellValue::Date(date) => date.format("%Y-%m-%d").to_string(),
        }
    }

    /// Text the editor is seeded with when editing starts.
    pub fn edit_text(&self) -> String {
        self.display()
    }
}

pub fn parse_numeric_value(value: &str) -> Option<f64> {
    let cleaned = value.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|parsed| parsed.is_finite())
}

pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    if value.fract().abs() < f64::EPSILON {
        format!("{}", value as i64)
    } else {
        let mut text = format!("{value:.6}");
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
        text
    }
}

/// One grid row: an ordered position plus a possibly-absent backing
/// record. Rows added locally carry `is_new` until the create commit
/// succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub position: usize,
    pub record_id: Option<RecordId>,
    pub record: Option<Record>,
    pub is_new: bool,
}

impl Row {
    pub fn from_record(position: usize, record_id: RecordId, record: Record) -> Self {
        Self {
            position,
            record_id: Some(record_id),
            record: Some(record),
            is_new: false,
        }
    }

    pub fn blank(position: usize) -> Self {
        Self {
            position,
            record_id: None,
            record: None,
            is_new: true,
        }
    }

    pub fn committed_value(&self, column: ColumnId) -> CellValue {
        self.record
            .as_ref()
            .and_then(|record| record.get(&column).cloned())
            .unwrap_or(CellValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_input_maps_empty_to_null() {
        let parsed = CellValue::parse_input(ColumnType::Text, "   ");
        assert_eq!(parsed, Ok(CellValue::Null));
    }

    #[test]
    fn parse_input_accepts_grouped_numbers() {
        let parsed = CellValue::parse_input(ColumnType::Number, "1,234.5");
        assert_eq!(parsed, Ok(CellValue::Number(1234.5)));
    }

    #[test]
    fn parse_input_rejects_malformed_dates() {
        let parsed = CellValue::parse_input(ColumnType::Date, "2026/01/02");
        assert!(parsed.is_err(), "slash-separated dates should be rejected");
    }

    #[test]
    fn format_number_trims_trailing_zeroes() {
        assert_eq!(format_number(1234.0), "1234");
        assert_eq!(format_number(0.125), "0.125");
        assert_eq!(format_number(2.500000), "2.5");
    }

    #[test]
    fn blank_rows_have_no_backing_record() {
        let row = Row::blank(3);
        assert!(row.is_new);
        assert_eq!(row.record_id, None);
        assert_eq!(row.committed_value(ColumnId(1)), CellValue::Null);
    }
}
