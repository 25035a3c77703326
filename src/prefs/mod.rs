//! # Preferences
//!
//! A [`CsvPreference`] is the dialect shared by tokenizers and encoders: the
//! quote character, the delimiter, the end-of-line symbols written after each
//! record and the behavioural flags that go with them.
//!
//! Preferences are immutable once built. Cloning one is cheap and the same
//! value can back any number of readers and writers, on any thread.
//!
//! ## Examples
//!
//! ```
//! use super_csv::prefs::{comment::CommentStartsWith, quote::QuoteMode, CsvPreference};
//!
//! # fn example() -> Result<(), super_csv::CsvError> {
//! let preference = CsvPreference::builder('\'', '|', "\n")
//!     .surrounding_spaces_need_quotes(true)
//!     .skip_comments(CommentStartsWith::new("#")?)
//!     .quote_mode(QuoteMode::Always)
//!     .max_lines_per_record(10)
//!     .build()?;
//!
//! assert_eq!(preference.delimiter(), '|');
//! assert_eq!(CsvPreference::excel_north_europe().delimiter(), ';');
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::error::{CsvError, CsvResult};

use self::{comment::CommentMatcher, quote::QuoteMode};

/// Comment line matchers.
pub mod comment;

/// Serde-friendly dialect configuration.
pub mod config;

/// Quote policies used on write.
pub mod quote;

/// How an empty field is handed to the processors on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyColumnParsing {
    /// Both `,,` and `,"",` read as null.
    #[default]
    AsNull,
    /// `,,` reads as null but `,"",` reads as an empty string.
    AsEmptyString,
}

/// The immutable dialect used to tokenize and encode records.
#[derive(Clone)]
pub struct CsvPreference {
    quote_char: char,
    delimiter: char,
    end_of_line_symbols: String,
    surrounding_spaces_need_quotes: bool,
    ignore_empty_lines: bool,
    max_lines_per_record: usize,
    quote_mode: QuoteMode,
    quote_escape_char: char,
    comment_matcher: Option<Arc<dyn CommentMatcher>>,
    empty_column_parsing: EmptyColumnParsing,
}

impl CsvPreference {
    /// `"` quoted, `,` delimited, `\r\n` terminated.
    pub fn standard() -> Self {
        Self::preset(',', "\r\n")
    }

    /// `"` quoted, `,` delimited, `\n` terminated.
    pub fn excel() -> Self {
        Self::preset(',', "\n")
    }

    /// `"` quoted, `;` delimited, `\n` terminated.
    pub fn excel_north_europe() -> Self {
        Self::preset(';', "\n")
    }

    /// `"` quoted, tab delimited, `\n` terminated.
    pub fn tab() -> Self {
        Self::preset('\t', "\n")
    }

    fn preset(delimiter: char, end_of_line_symbols: &str) -> Self {
        Self {
            quote_char: '"',
            delimiter,
            end_of_line_symbols: end_of_line_symbols.to_string(),
            surrounding_spaces_need_quotes: false,
            ignore_empty_lines: true,
            max_lines_per_record: 0,
            quote_mode: QuoteMode::Normal,
            quote_escape_char: '"',
            comment_matcher: None,
            empty_column_parsing: EmptyColumnParsing::AsNull,
        }
    }

    /// Starts a custom dialect from its three mandatory symbols.
    pub fn builder(
        quote_char: char,
        delimiter: char,
        end_of_line_symbols: impl Into<String>,
    ) -> CsvPreferenceBuilder {
        let mut preference = Self::preset(delimiter, "");
        preference.quote_char = quote_char;
        preference.quote_escape_char = quote_char;
        preference.end_of_line_symbols = end_of_line_symbols.into();
        CsvPreferenceBuilder { preference }
    }

    /// Starts a builder initialised with this dialect.
    pub fn to_builder(&self) -> CsvPreferenceBuilder {
        CsvPreferenceBuilder {
            preference: self.clone(),
        }
    }

    pub fn quote_char(&self) -> char {
        self.quote_char
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn end_of_line_symbols(&self) -> &str {
        &self.end_of_line_symbols
    }

    pub fn surrounding_spaces_need_quotes(&self) -> bool {
        self.surrounding_spaces_need_quotes
    }

    pub fn ignore_empty_lines(&self) -> bool {
        self.ignore_empty_lines
    }

    /// Maximum number of physical lines a record may span, 0 when unbounded.
    pub fn max_lines_per_record(&self) -> usize {
        self.max_lines_per_record
    }

    pub fn quote_mode(&self) -> &QuoteMode {
        &self.quote_mode
    }

    pub fn quote_escape_char(&self) -> char {
        self.quote_escape_char
    }

    pub fn comment_matcher(&self) -> Option<&dyn CommentMatcher> {
        self.comment_matcher.as_deref()
    }

    pub fn empty_column_parsing(&self) -> EmptyColumnParsing {
        self.empty_column_parsing
    }

    /// Whether a physical line starting a record is a comment.
    pub fn is_comment(&self, line: &str) -> bool {
        self.comment_matcher
            .as_ref()
            .is_some_and(|matcher| matcher.is_comment(line))
    }

    fn validate(&self) -> CsvResult<()> {
        if self.quote_char == self.delimiter {
            return Err(CsvError::Configuration(format!(
                "quote character and delimiter cannot be the same character: '{}'",
                self.quote_char
            )));
        }
        if self.quote_escape_char == self.delimiter {
            return Err(CsvError::Configuration(format!(
                "quote escape character and delimiter cannot be the same character: '{}'",
                self.delimiter
            )));
        }
        for symbol in [self.quote_char, self.delimiter, self.quote_escape_char] {
            if symbol == '\r' || symbol == '\n' {
                return Err(CsvError::Configuration(
                    "quote, escape and delimiter characters cannot be line terminators"
                        .to_string(),
                ));
            }
        }
        if self.end_of_line_symbols.is_empty()
            || !self
                .end_of_line_symbols
                .chars()
                .all(|c| c == '\r' || c == '\n')
        {
            return Err(CsvError::Configuration(format!(
                "end of line symbols should be made of '\\r' and '\\n' only, got {:?}",
                self.end_of_line_symbols
            )));
        }
        Ok(())
    }
}

impl Default for CsvPreference {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for CsvPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvPreference")
            .field("quote_char", &self.quote_char)
            .field("delimiter", &self.delimiter)
            .field("end_of_line_symbols", &self.end_of_line_symbols)
            .field(
                "surrounding_spaces_need_quotes",
                &self.surrounding_spaces_need_quotes,
            )
            .field("ignore_empty_lines", &self.ignore_empty_lines)
            .field("max_lines_per_record", &self.max_lines_per_record)
            .field("quote_mode", &self.quote_mode)
            .field("quote_escape_char", &self.quote_escape_char)
            .field("skip_comments", &self.comment_matcher.is_some())
            .field("empty_column_parsing", &self.empty_column_parsing)
            .finish()
    }
}

/// A builder for [`CsvPreference`].
///
/// Every setter consumes and returns the builder; [`CsvPreferenceBuilder::build`]
/// validates the whole dialect.
pub struct CsvPreferenceBuilder {
    preference: CsvPreference,
}

impl CsvPreferenceBuilder {
    pub fn quote_char(mut self, quote_char: char) -> Self {
        // keep doubled-quote escaping unless a distinct escape was chosen
        if self.preference.quote_escape_char == self.preference.quote_char {
            self.preference.quote_escape_char = quote_char;
        }
        self.preference.quote_char = quote_char;
        self
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.preference.delimiter = delimiter;
        self
    }

    pub fn end_of_line_symbols(mut self, end_of_line_symbols: impl Into<String>) -> Self {
        self.preference.end_of_line_symbols = end_of_line_symbols.into();
        self
    }

    /// When enabled, unquoted leading and trailing spaces are trimmed on read
    /// and values with surrounding spaces are quoted on write.
    pub fn surrounding_spaces_need_quotes(mut self, yes: bool) -> Self {
        self.preference.surrounding_spaces_need_quotes = yes;
        self
    }

    pub fn ignore_empty_lines(mut self, yes: bool) -> Self {
        self.preference.ignore_empty_lines = yes;
        self
    }

    /// Limits the number of physical lines a single record may span.
    ///
    /// A record still open after that many lines almost always comes from an
    /// unterminated quote; the tokenizer fails instead of reading the rest of
    /// the stream into one field. `0` disables the limit.
    pub fn max_lines_per_record(mut self, max_lines: usize) -> Self {
        self.preference.max_lines_per_record = max_lines;
        self
    }

    pub fn quote_mode(mut self, quote_mode: QuoteMode) -> Self {
        self.preference.quote_mode = quote_mode;
        self
    }

    /// Character escaping the quote character inside quoted fields.
    ///
    /// Defaults to the quote character itself (`""` escaping).
    pub fn quote_escape_char(mut self, quote_escape_char: char) -> Self {
        self.preference.quote_escape_char = quote_escape_char;
        self
    }

    pub fn skip_comments(mut self, matcher: impl CommentMatcher + 'static) -> Self {
        self.preference.comment_matcher = Some(Arc::new(matcher));
        self
    }

    pub fn empty_column_parsing(mut self, empty_column_parsing: EmptyColumnParsing) -> Self {
        self.preference.empty_column_parsing = empty_column_parsing;
        self
    }

    pub fn build(self) -> CsvResult<CsvPreference> {
        self.preference.validate()?;
        Ok(self.preference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::comment::CommentStartsWith;

    #[test]
    fn presets_should_match_conventions() {
        let standard = CsvPreference::standard();
        assert_eq!(standard.quote_char(), '"');
        assert_eq!(standard.delimiter(), ',');
        assert_eq!(standard.end_of_line_symbols(), "\r\n");
        assert!(standard.ignore_empty_lines());
        assert_eq!(standard.max_lines_per_record(), 0);

        assert_eq!(CsvPreference::excel().end_of_line_symbols(), "\n");
        assert_eq!(CsvPreference::excel_north_europe().delimiter(), ';');
        assert_eq!(CsvPreference::tab().delimiter(), '\t');
    }

    #[test]
    fn delimiter_equal_to_quote_should_be_rejected() {
        let result = CsvPreference::builder('"', '"', "\n").build();
        assert!(matches!(result, Err(CsvError::Configuration(_))));
    }

    #[test]
    fn invalid_end_of_line_should_be_rejected() {
        assert!(CsvPreference::builder('"', ',', "").build().is_err());
        assert!(CsvPreference::builder('"', ',', ";").build().is_err());
        assert!(CsvPreference::builder('"', '\n', "\n").build().is_err());
    }

    #[test]
    fn escape_char_should_follow_quote_char_unless_set() {
        let preference = CsvPreference::standard()
            .to_builder()
            .quote_char('\'')
            .build()
            .unwrap();
        assert_eq!(preference.quote_escape_char(), '\'');

        let preference = CsvPreference::standard()
            .to_builder()
            .quote_escape_char('\\')
            .quote_char('\'')
            .build()
            .unwrap();
        assert_eq!(preference.quote_escape_char(), '\\');
    }

    #[test]
    fn builder_should_keep_comment_matcher() {
        let preference = CsvPreference::excel()
            .to_builder()
            .skip_comments(CommentStartsWith::new("#").unwrap())
            .build()
            .unwrap();

        assert!(preference.is_comment("#x"));
        assert!(!CsvPreference::excel().is_comment("#x"));
    }
}
