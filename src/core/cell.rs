use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

/// A typed cell value flowing through a processor chain.
///
/// Cells enter a read chain as [`CellValue::Text`] (or [`CellValue::Null`] for
/// an empty unquoted field) and may leave it as any other variant. Write chains
/// go the other way and the final value is rendered with its `Display` impl.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Char(char),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Name of the variant, used in type mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Null => "null",
            CellValue::Text(_) => "text",
            CellValue::Integer(_) => "integer",
            CellValue::Float(_) => "float",
            CellValue::Boolean(_) => "boolean",
            CellValue::Char(_) => "char",
            CellValue::Date(_) => "date",
            CellValue::DateTime(_) => "datetime",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CellValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            CellValue::Float(value) => Some(*value),
            CellValue::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::DateTime(value) => Some(*value),
            _ => None,
        }
    }

    /// Converts the value into the cell text written by a writer (`None` for null).
    pub fn into_cell(self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Text(text) => Some(text),
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Text(text) => f.write_str(text),
            CellValue::Integer(value) => write!(f, "{}", value),
            CellValue::Float(value) => write!(f, "{}", value),
            CellValue::Boolean(value) => write!(f, "{}", value),
            CellValue::Char(value) => write!(f, "{}", value),
            CellValue::Date(value) => write!(f, "{}", value),
            CellValue::DateTime(value) => write!(f, "{}", value),
        }
    }
}

impl From<Option<String>> for CellValue {
    fn from(cell: Option<String>) -> Self {
        cell.map_or(CellValue::Null, CellValue::Text)
    }
}

impl From<String> for CellValue {
    fn from(text: String) -> Self {
        CellValue::Text(text)
    }
}

impl From<&str> for CellValue {
    fn from(text: &str) -> Self {
        CellValue::Text(text.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Integer(value.into())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<char> for CellValue {
    fn from(value: char) -> Self {
        CellValue::Char(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}
