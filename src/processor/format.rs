//! Processors rendering typed values as text, for write chains.

use std::fmt::Write;

use crate::{
    core::{
        cell::CellValue,
        context::CsvContext,
        processor::{CellProcessor, CellProcessorResult, Outcome},
    },
    error::{CsvError, CsvResult},
};

use super::{null_input, type_mismatch};

/// Renders with a `strftime` pattern; an invalid pattern is reported instead of panicking.
fn render(value: impl std::fmt::Display, format: &str, context: &CsvContext) -> CsvResult<CellValue> {
    let mut text = String::new();
    write!(text, "{}", value).map_err(|_| CsvError::CellParse {
        value: String::new(),
        message: format!("invalid format pattern '{}'", format),
        context: context.clone(),
    })?;
    Ok(CellValue::Text(text))
}

/// Renders a boolean as one of two strings.
#[derive(Debug, Clone)]
pub struct FmtBool {
    true_value: String,
    false_value: String,
}

impl FmtBool {
    pub fn new(true_value: impl Into<String>, false_value: impl Into<String>) -> Self {
        Self {
            true_value: true_value.into(),
            false_value: false_value.into(),
        }
    }
}

impl CellProcessor for FmtBool {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        match value {
            CellValue::Boolean(true) => Ok(Outcome::Continue(CellValue::Text(self.true_value.clone()))),
            CellValue::Boolean(false) => Ok(Outcome::Continue(CellValue::Text(self.false_value.clone()))),
            CellValue::Null => Err(null_input(context)),
            other => Err(type_mismatch("boolean", &other, context)),
        }
    }
}

/// Renders a date with a `strftime` pattern.
#[derive(Debug, Clone)]
pub struct FmtDate {
    format: String,
}

impl FmtDate {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl CellProcessor for FmtDate {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        match value {
            CellValue::Date(date) => {
                render(date.format(&self.format), &self.format, context).map(Outcome::Continue)
            }
            CellValue::Null => Err(null_input(context)),
            other => Err(type_mismatch("date", &other, context)),
        }
    }
}

/// Renders a date and time with a `strftime` pattern.
#[derive(Debug, Clone)]
pub struct FmtDateTime {
    format: String,
}

impl FmtDateTime {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl CellProcessor for FmtDateTime {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        match value {
            CellValue::DateTime(datetime) => {
                render(datetime.format(&self.format), &self.format, context).map(Outcome::Continue)
            }
            CellValue::Null => Err(null_input(context)),
            other => Err(type_mismatch("datetime", &other, context)),
        }
    }
}

/// Renders a number with a fixed count of decimal places.
#[derive(Debug, Clone, Copy)]
pub struct FmtNumber {
    decimal_places: usize,
}

impl FmtNumber {
    pub fn new(decimal_places: usize) -> Self {
        Self { decimal_places }
    }
}

impl CellProcessor for FmtNumber {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        let number = match value {
            CellValue::Float(number) => number,
            CellValue::Integer(number) => number as f64,
            CellValue::Null => return Err(null_input(context)),
            other => return Err(type_mismatch("number", &other, context)),
        };
        Ok(Outcome::Continue(CellValue::Text(format!(
            "{:.*}",
            self.decimal_places, number
        ))))
    }
}
