//! Processors turning text into typed values.
//!
//! A parser accepts text and the type it produces, which it passes through
//! untouched, so a chain stays valid when a value was already converted.
//! Anything else is a type mismatch.

use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    core::{
        cell::CellValue,
        context::CsvContext,
        processor::{CellProcessor, CellProcessorResult, Outcome},
    },
    error::CsvResult,
};

use super::{null_input, parse_error, type_mismatch};

fn text_input<'a>(value: &'a CellValue, expected: &'static str, context: &CsvContext) -> CsvResult<&'a str> {
    match value {
        CellValue::Null => Err(null_input(context)),
        CellValue::Text(text) => Ok(text),
        other => Err(type_mismatch(expected, other, context)),
    }
}

/// Parses text into an [`CellValue::Integer`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ParseInt;

impl ParseInt {
    pub fn new() -> Self {
        Self
    }
}

impl CellProcessor for ParseInt {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        if let CellValue::Integer(_) = value {
            return Ok(Outcome::Continue(value));
        }
        let text = text_input(&value, "text or integer", context)?;
        let parsed = text
            .parse::<i64>()
            .map_err(|error| parse_error(text, format!("not a valid integer: {}", error), context))?;
        Ok(Outcome::Continue(CellValue::Integer(parsed)))
    }
}

/// Parses text into a [`CellValue::Float`]; integers are widened.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParseDouble;

impl ParseDouble {
    pub fn new() -> Self {
        Self
    }
}

impl CellProcessor for ParseDouble {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        match value {
            CellValue::Float(_) => Ok(Outcome::Continue(value)),
            CellValue::Integer(integer) => Ok(Outcome::Continue(CellValue::Float(integer as f64))),
            value => {
                let text = text_input(&value, "text or float", context)?;
                let parsed = text.parse::<f64>().map_err(|error| {
                    parse_error(text, format!("not a valid floating point number: {}", error), context)
                })?;
                Ok(Outcome::Continue(CellValue::Float(parsed)))
            }
        }
    }
}

/// Parses text into a [`CellValue::Boolean`] against two vocabularies.
///
/// The defaults are `true`, `t`, `yes`, `y`, `1` and `false`, `f`, `no`,
/// `n`, `0`, matched without regard to case.
#[derive(Debug, Clone)]
pub struct ParseBool {
    true_values: Vec<String>,
    false_values: Vec<String>,
    ignore_case: bool,
}

impl Default for ParseBool {
    fn default() -> Self {
        Self::with_values(["true", "t", "yes", "y", "1"], ["false", "f", "no", "n", "0"])
    }
}

impl ParseBool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<T, F>(true_values: T, false_values: F) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            true_values: true_values.into_iter().map(Into::into).collect(),
            false_values: false_values.into_iter().map(Into::into).collect(),
            ignore_case: true,
        }
    }

    pub fn ignore_case(mut self, yes: bool) -> Self {
        self.ignore_case = yes;
        self
    }

    fn matches(&self, candidates: &[String], text: &str) -> bool {
        candidates.iter().any(|candidate| {
            if self.ignore_case {
                candidate.eq_ignore_ascii_case(text)
            } else {
                candidate == text
            }
        })
    }
}

impl CellProcessor for ParseBool {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        if let CellValue::Boolean(_) = value {
            return Ok(Outcome::Continue(value));
        }
        let text = text_input(&value, "text or boolean", context)?;
        if self.matches(&self.true_values, text) {
            Ok(Outcome::Continue(CellValue::Boolean(true)))
        } else if self.matches(&self.false_values, text) {
            Ok(Outcome::Continue(CellValue::Boolean(false)))
        } else {
            Err(parse_error(text, "not a valid boolean", context))
        }
    }
}

/// Parses a single-character text into a [`CellValue::Char`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ParseChar;

impl ParseChar {
    pub fn new() -> Self {
        Self
    }
}

impl CellProcessor for ParseChar {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        if let CellValue::Char(_) = value {
            return Ok(Outcome::Continue(value));
        }
        let text = text_input(&value, "text or char", context)?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Outcome::Continue(CellValue::Char(c))),
            _ => Err(parse_error(text, "expected exactly one character", context)),
        }
    }
}

/// Parses text into a [`CellValue::Date`] with a `strftime` pattern.
#[derive(Debug, Clone)]
pub struct ParseDate {
    format: String,
}

impl ParseDate {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl CellProcessor for ParseDate {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        if let CellValue::Date(_) = value {
            return Ok(Outcome::Continue(value));
        }
        let text = text_input(&value, "text or date", context)?;
        let date = NaiveDate::parse_from_str(text, &self.format).map_err(|error| {
            parse_error(
                text,
                format!("not a valid date for the format '{}': {}", self.format, error),
                context,
            )
        })?;
        Ok(Outcome::Continue(CellValue::Date(date)))
    }
}

/// Parses text into a [`CellValue::DateTime`] with a `strftime` pattern.
#[derive(Debug, Clone)]
pub struct ParseDateTime {
    format: String,
}

impl ParseDateTime {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl CellProcessor for ParseDateTime {
    fn execute(&self, value: CellValue, context: &CsvContext) -> CellProcessorResult {
        if let CellValue::DateTime(_) = value {
            return Ok(Outcome::Continue(value));
        }
        let text = text_input(&value, "text or datetime", context)?;
        let datetime = NaiveDateTime::parse_from_str(text, &self.format).map_err(|error| {
            parse_error(
                text,
                format!("not a valid date and time for the format '{}': {}", self.format, error),
                context,
            )
        })?;
        Ok(Outcome::Continue(CellValue::DateTime(datetime)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CsvError;

    fn context() -> CsvContext {
        CsvContext::new(5, 4, 2).with_column_name(Some("value".to_string()))
    }

    fn run(processor: &dyn CellProcessor, value: impl Into<CellValue>) -> CsvResult<CellValue> {
        processor.execute(value.into(), &context()).map(Outcome::into_value)
    }

    #[test]
    fn parse_int_should_parse_and_report_failures() {
        assert_eq!(run(&ParseInt::new(), "-17").unwrap(), CellValue::Integer(-17));
        assert_eq!(run(&ParseInt::new(), 3).unwrap(), CellValue::Integer(3));

        let error = run(&ParseInt::new(), "12a").unwrap_err();
        assert!(matches!(error, CsvError::CellParse { .. }));
        assert_eq!(error.value(), Some("12a"));
        assert_eq!(error.context(), Some(&context()));
    }

    #[test]
    fn parse_int_should_reject_other_types() {
        let error = run(&ParseInt::new(), true).unwrap_err();

        match error {
            CsvError::TypeMismatch { expected, actual, .. } => {
                assert_eq!(expected, "text or integer");
                assert_eq!(actual, "boolean");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn parsers_should_reject_null() {
        let error = run(&ParseDouble::new(), CellValue::Null).unwrap_err();

        assert!(matches!(error, CsvError::CellParse { .. }));
        assert!(error.to_string().contains("Optional"));
    }

    #[test]
    fn parse_double_should_widen_integers() {
        assert_eq!(run(&ParseDouble::new(), "2.5").unwrap(), CellValue::Float(2.5));
        assert_eq!(run(&ParseDouble::new(), 2).unwrap(), CellValue::Float(2.0));
        assert!(run(&ParseDouble::new(), "two").is_err());
    }

    #[test]
    fn parse_bool_should_use_vocabularies() {
        let default = ParseBool::new();
        assert_eq!(run(&default, "YES").unwrap(), CellValue::Boolean(true));
        assert_eq!(run(&default, "0").unwrap(), CellValue::Boolean(false));
        assert!(run(&default, "maybe").is_err());

        let strict = ParseBool::with_values(["oui"], ["non"]).ignore_case(false);
        assert_eq!(run(&strict, "oui").unwrap(), CellValue::Boolean(true));
        assert!(run(&strict, "OUI").is_err());
        assert!(run(&strict, "true").is_err());
    }

    #[test]
    fn parse_char_should_require_one_character() {
        assert_eq!(run(&ParseChar::new(), "é").unwrap(), CellValue::Char('é'));
        assert!(run(&ParseChar::new(), "").is_err());
        assert!(run(&ParseChar::new(), "ab").is_err());
    }

    #[test]
    fn parse_date_should_follow_format() {
        let parse = ParseDate::new("%d/%m/%Y");

        assert_eq!(
            run(&parse, "24/12/2023").unwrap(),
            CellValue::Date(NaiveDate::from_ymd_opt(2023, 12, 24).unwrap())
        );
        let error = run(&parse, "2023-12-24").unwrap_err();
        assert!(error.to_string().contains("%d/%m/%Y"));
    }

    #[test]
    fn parse_datetime_should_follow_format() {
        let parse = ParseDateTime::new("%Y-%m-%d %H:%M:%S");

        let expected = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(13, 45, 0)
            .unwrap();
        assert_eq!(run(&parse, "2024-02-29 13:45:00").unwrap(), CellValue::DateTime(expected));
        assert!(run(&parse, "2024-02-29").is_err());
    }
}
