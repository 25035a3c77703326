//! Renders cells as CSV text.
//!
//! The encoder decides, cell by cell, whether a value has to be quoted:
//!
//! 1. the [`QuoteMode`](crate::prefs::quote::QuoteMode) forces it for this column,
//! 2. the value contains the delimiter, the quote character, `\r` or `\n`
//!    (the end-of-line symbols are validated to be made of these two),
//! 3. surrounding spaces need quotes and the value starts or ends with whitespace,
//! 4. it is an empty string and empty quoted fields read back as empty strings.
//!
//! Otherwise the value is written as is. Inside a quoted value the quote
//! character is escaped; delimiters and line terminators are written literally.
//! A record whose line would match the comment matcher gets its first cell
//! quoted. If the line still matches, or the first cell cannot be quoted
//! without changing how it reads back, the record is refused.

use crate::{
    core::context::CsvContext,
    error::{CsvError, CsvResult},
    prefs::{CsvPreference, EmptyColumnParsing},
};

/// Encodes cells and records for one [`CsvPreference`].
#[derive(Debug, Clone)]
pub struct CsvEncoder {
    preference: CsvPreference,
}

impl CsvEncoder {
    pub fn new(preference: CsvPreference) -> Self {
        Self { preference }
    }

    pub fn preference(&self) -> &CsvPreference {
        &self.preference
    }

    /// Encodes one cell; `None` is written as an empty unquoted field.
    ///
    /// # Examples
    ///
    /// ```
    /// use super_csv::core::context::CsvContext;
    /// use super_csv::item::csv::encoder::CsvEncoder;
    /// use super_csv::prefs::CsvPreference;
    ///
    /// let encoder = CsvEncoder::new(CsvPreference::standard());
    /// let context = CsvContext::new(1, 1, 1);
    ///
    /// assert_eq!(encoder.encode(Some("plain"), &context), "plain");
    /// assert_eq!(encoder.encode(Some("a,b"), &context), "\"a,b\"");
    /// assert_eq!(encoder.encode(Some("say \"hi\""), &context), "\"say \"\"hi\"\"\"");
    /// assert_eq!(encoder.encode(None, &context), "");
    /// ```
    pub fn encode(&self, cell: Option<&str>, context: &CsvContext) -> String {
        match cell {
            None => String::new(),
            Some(value) if self.needs_quotes(value, context) => self.quote(value),
            Some(value) => value.to_string(),
        }
    }

    /// Encodes a whole record, without the end-of-line symbols.
    ///
    /// `context` locates the record; its column number is set for each cell.
    /// When the line would be mistaken for a comment on read, its first cell
    /// is quoted. A null first cell becomes `""`, which reads back as null
    /// unless empty columns are parsed as empty strings.
    ///
    /// Fails with [`CsvError::Configuration`] when the record would still be
    /// read back as a comment.
    pub fn encode_record<S: AsRef<str>>(&self, cells: &[Option<S>], context: &CsvContext) -> CsvResult<String> {
        let line = self.join(cells, context, false);
        if !self.preference.is_comment(&line) {
            return Ok(line);
        }

        let quotable = match cells.first() {
            Some(Some(_)) => true,
            Some(None) => self.preference.empty_column_parsing() == EmptyColumnParsing::AsNull,
            None => false,
        };
        if quotable {
            let quoted = self.join(cells, context, true);
            if !self.preference.is_comment(&quoted) {
                return Ok(quoted);
            }
        }

        Err(CsvError::Configuration(format!(
            "row {} would be read back as a comment: {}",
            context.row_number, line
        )))
    }

    fn join<S: AsRef<str>>(&self, cells: &[Option<S>], context: &CsvContext, quote_first: bool) -> String {
        let mut line = String::new();
        for (index, cell) in cells.iter().enumerate() {
            if index > 0 {
                line.push(self.preference.delimiter());
            }
            let cell_context = CsvContext {
                column_number: index + 1,
                ..context.clone()
            };
            let cell = cell.as_ref().map(|c| <S as AsRef<str>>::as_ref(c));
            if index == 0 && quote_first {
                line.push_str(&self.quote(cell.unwrap_or_default()));
            } else {
                line.push_str(&self.encode(cell, &cell_context));
            }
        }
        line
    }

    fn needs_quotes(&self, value: &str, context: &CsvContext) -> bool {
        if self.preference.quote_mode().quotes_required(context) {
            return true;
        }

        let delimiter = self.preference.delimiter();
        let quote = self.preference.quote_char();
        if value
            .chars()
            .any(|c| c == delimiter || c == quote || c == '\r' || c == '\n')
        {
            return true;
        }

        if self.preference.surrounding_spaces_need_quotes()
            && (value.starts_with(char::is_whitespace) || value.ends_with(char::is_whitespace))
        {
            return true;
        }

        value.is_empty()
            && self.preference.empty_column_parsing() == EmptyColumnParsing::AsEmptyString
    }

    fn quote(&self, value: &str) -> String {
        let quote = self.preference.quote_char();
        let escape = self.preference.quote_escape_char();

        let mut quoted = String::with_capacity(value.len() + 2);
        quoted.push(quote);
        for c in value.chars() {
            if c == quote || (c == escape && escape != quote) {
                quoted.push(escape);
            }
            quoted.push(c);
        }
        quoted.push(quote);
        quoted
    }
}
