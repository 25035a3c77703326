use thiserror::Error;

use crate::core::context::CsvContext;

/// Result type used throughout the crate.
pub type CsvResult<T> = Result<T, CsvError>;

#[derive(Error, Debug)]
/// Errors raised while tokenizing, processing or writing CSV data.
///
/// Every variant raised while a row is being handled carries the
/// [`CsvContext`] of the failure, so callers always know the row, the
/// physical line and the column that caused it.
pub enum CsvError {
    /// The character stream could not be split into a record.
    #[error("{message} ({context})")]
    Parse { message: String, context: CsvContext },

    /// A parsing cell processor rejected its input.
    #[error("could not parse '{value}': {message} ({context})")]
    CellParse {
        value: String,
        message: String,
        context: CsvContext,
    },

    /// A cell processor received a value of a type it cannot handle.
    #[error("expected {expected} but got {actual} '{value}' ({context})")]
    TypeMismatch {
        expected: &'static str,
        actual: String,
        value: String,
        context: CsvContext,
    },

    /// A constraint cell processor rejected its input.
    #[error("constraint violated: {rule}, value '{value}' ({context})")]
    Constraint {
        rule: String,
        value: String,
        context: CsvContext,
    },

    /// A record does not have as many columns as there are processors or names.
    #[error("expected {expected} columns but the record has {actual} ({context})")]
    ColumnCount {
        expected: usize,
        actual: usize,
        context: CsvContext,
    },

    /// Invalid preferences or reader/writer setup.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CsvError {
    /// A column count mismatch, positioned on the first missing or extra column.
    pub fn column_count(expected: usize, actual: usize, record: &CsvContext) -> Self {
        CsvError::ColumnCount {
            expected,
            actual,
            context: record.at_column(expected.min(actual) + 1, None),
        }
    }

    /// Returns the position of the failure, if it happened while handling a row.
    pub fn context(&self) -> Option<&CsvContext> {
        match self {
            CsvError::Parse { context, .. }
            | CsvError::CellParse { context, .. }
            | CsvError::TypeMismatch { context, .. }
            | CsvError::Constraint { context, .. }
            | CsvError::ColumnCount { context, .. } => Some(context),
            CsvError::Configuration(_) | CsvError::Io(_) => None,
        }
    }

    /// Returns the offending raw value, when the failure concerns a single cell.
    pub fn value(&self) -> Option<&str> {
        match self {
            CsvError::CellParse { value, .. }
            | CsvError::TypeMismatch { value, .. }
            | CsvError::Constraint { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Whether the failure only concerns the current row.
    ///
    /// Cell processor failures and column count mismatches happen after the
    /// record was fully tokenized, so a caller may skip the row and continue.
    /// Tokenization, I/O and configuration failures have no safe
    /// resynchronization point.
    pub fn is_row_recoverable(&self) -> bool {
        matches!(
            self,
            CsvError::CellParse { .. }
                | CsvError::TypeMismatch { .. }
                | CsvError::Constraint { .. }
                | CsvError::ColumnCount { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> CsvContext {
        CsvContext::new(4, 3, 2).with_column_name(Some("age".to_string()))
    }

    #[test]
    fn constraint_message_should_contain_position_rule_and_value() {
        let error = CsvError::Constraint {
            rule: "value must be unique".to_string(),
            value: "42".to_string(),
            context: context(),
        };

        let message = error.to_string();
        assert!(message.contains("value must be unique"));
        assert!(message.contains("'42'"));
        assert!(message.contains("row 3"));
        assert!(message.contains("line 4"));
        assert!(message.contains("column 2 (\"age\")"));
        assert_eq!(error.value(), Some("42"));
        assert!(error.is_row_recoverable());
    }

    #[test]
    fn type_mismatch_should_expose_offending_value() {
        let error = CsvError::TypeMismatch {
            expected: "boolean",
            actual: "text".to_string(),
            value: "maybe".to_string(),
            context: context(),
        };

        assert_eq!(error.value(), Some("maybe"));
        assert!(error.to_string().contains("expected boolean but got text 'maybe'"));
        assert!(error.is_row_recoverable());
    }

    #[test]
    fn column_count_should_point_at_first_mismatched_column() {
        let record = CsvContext::new(4, 3, 0);

        let missing = CsvError::column_count(4, 2, &record);
        assert_eq!(missing.context().map(|c| c.column_number), Some(3));
        let extra = CsvError::column_count(2, 3, &record);
        assert_eq!(extra.context().map(|c| c.column_number), Some(3));
        assert!(extra.to_string().contains("row 3, line 4, column 3"));
    }

    #[test]
    fn parse_error_should_not_be_recoverable() {
        let error = CsvError::Parse {
            message: "unterminated quoted field".to_string(),
            context: context(),
        };

        assert!(!error.is_row_recoverable());
        assert_eq!(error.context().map(|c| c.line_number), Some(4));
        assert_eq!(error.value(), None);
    }

    #[test]
    fn io_error_should_convert() {
        let error: CsvError = std::io::Error::from(std::io::ErrorKind::PermissionDenied).into();

        assert!(matches!(error, CsvError::Io(_)));
        assert!(error.context().is_none());
        assert!(!error.is_row_recoverable());
    }
}
