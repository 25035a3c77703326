use std::fmt;

/// Position of the cell currently being tokenized, processed or written.
///
/// A context is created per cell and handed to every processor of the column's
/// chain. Processors only read it, to attach it to the errors they raise.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CsvContext {
    /// Physical line (1-based) the current record ended on.
    pub line_number: usize,
    /// Logical record (1-based) being handled, the header included.
    pub row_number: usize,
    /// Column (1-based). 0 only in the record-level context readers and
    /// writers derive cell contexts from; errors always name a column.
    pub column_number: usize,
    /// Header name of the column, when a header was read or written.
    pub column_name: Option<String>,
}

impl CsvContext {
    pub fn new(line_number: usize, row_number: usize, column_number: usize) -> Self {
        Self {
            line_number,
            row_number,
            column_number,
            column_name: None,
        }
    }

    pub fn with_column_name(mut self, column_name: Option<String>) -> Self {
        self.column_name = column_name;
        self
    }

    /// Returns the same position moved to another column of the record.
    pub fn at_column(&self, column_number: usize, column_name: Option<&str>) -> Self {
        Self {
            line_number: self.line_number,
            row_number: self.row_number,
            column_number,
            column_name: column_name.map(str::to_string),
        }
    }
}

impl fmt::Display for CsvContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}, line {}", self.row_number, self.line_number)?;
        if self.column_number > 0 {
            write!(f, ", column {}", self.column_number)?;
            if let Some(name) = &self.column_name {
                write!(f, " ({:?})", name)?;
            }
        }
        Ok(())
    }
}
