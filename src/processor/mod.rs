//! Built-in cell processors.
//!
//! Processors are grouped by what they do to a cell:
//!
//! - [`conversion`]: reshape a value without changing its meaning
//!   ([`Optional`], [`ConvertNullTo`], [`Trim`], [`Truncate`], [`StrReplace`],
//!   [`HashMapper`]),
//! - [`parse`]: turn text into typed values, usually at the start of a read chain,
//! - [`format`]: turn typed values into text, usually at the end of a write chain,
//! - [`constraint`]: validate a value and pass it on unchanged.
//!
//! Except for [`Optional`], [`ConvertNullTo`], [`NotNull`] and
//! [`StrNotNullOrEmpty`], processors refuse null input: put an [`Optional`]
//! in front of them when a column may be empty.
//!
//! # Examples
//!
//! ```
//! use super_csv::core::{cell::CellValue, context::CsvContext, processor::Chain};
//! use super_csv::processor::{FmtDate, ParseDate, StrRegEx};
//!
//! let reformat = Chain::new()
//!     .then(StrRegEx::new(r"\d{2}/\d{2}/\d{4}").unwrap())
//!     .then(ParseDate::new("%d/%m/%Y"))
//!     .then(FmtDate::new("%Y-%m-%d"));
//!
//! let context = CsvContext::new(1, 1, 1);
//! assert_eq!(
//!     reformat.execute("24/12/2023".into(), &context).unwrap(),
//!     CellValue::from("2023-12-24")
//! );
//! ```

use crate::{
    core::{cell::CellValue, context::CsvContext},
    error::{CsvError, CsvResult},
};

pub mod constraint;
pub mod conversion;
pub mod format;
pub mod parse;

pub use constraint::{
    DMinMax, Equals, ForbidSubStr, IsIncludedIn, LMinMax, NotNull, RequireSubStr, StrMinMax,
    StrNotNullOrEmpty, StrRegEx, Strlen, Unique,
};
pub use conversion::{ConvertNullTo, HashMapper, Optional, StrReplace, Trim, Truncate};
pub use format::{FmtBool, FmtDate, FmtDateTime, FmtNumber};
pub use parse::{ParseBool, ParseChar, ParseDate, ParseDateTime, ParseDouble, ParseInt};

/// Error raised when a processor that needs a value receives null.
pub(crate) fn null_input(context: &CsvContext) -> CsvError {
    CsvError::CellParse {
        value: String::new(),
        message: "this processor does not accept null input, \
                  chain an Optional processor in front of it if the column is optional"
            .to_string(),
        context: context.clone(),
    }
}

pub(crate) fn parse_error(value: &str, message: impl Into<String>, context: &CsvContext) -> CsvError {
    CsvError::CellParse {
        value: value.to_string(),
        message: message.into(),
        context: context.clone(),
    }
}

pub(crate) fn type_mismatch(expected: &'static str, value: &CellValue, context: &CsvContext) -> CsvError {
    CsvError::TypeMismatch {
        expected,
        actual: value.type_name().to_string(),
        value: value.to_string(),
        context: context.clone(),
    }
}

pub(crate) fn violation(rule: impl Into<String>, value: &CellValue, context: &CsvContext) -> CsvError {
    CsvError::Constraint {
        rule: rule.into(),
        value: value.to_string(),
        context: context.clone(),
    }
}

/// Text of a non-null value; typed values are rendered with `Display`.
pub(crate) fn text_of(value: &CellValue, context: &CsvContext) -> CsvResult<String> {
    match value {
        CellValue::Null => Err(null_input(context)),
        CellValue::Text(text) => Ok(text.clone()),
        other => Ok(other.to_string()),
    }
}
