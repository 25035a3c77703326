//! Splits a character stream into logical records.
//!
//! The tokenizer works on physical lines read from a [`BufRead`]. A logical
//! record usually is one physical line, but a quoted field may contain line
//! terminators, in which case the record goes on over the following lines.
//! The terminator actually found in the stream (`\n`, `\r\n` or `\r`) is kept
//! verbatim inside such a field.
//!
//! Before a record starts, blank lines (when `ignore_empty_lines` is set) and
//! comment lines are skipped. Neither consumes a row number. Lines continuing
//! a quoted field are never checked against the comment matcher.

use std::{io::BufRead, mem, ops::RangeInclusive};

use log::debug;

use crate::{
    core::context::CsvContext,
    error::{CsvError, CsvResult},
    prefs::{CsvPreference, EmptyColumnParsing},
};

/// One logical record and the physical lines it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    cells: Vec<Option<String>>,
    first_line: usize,
    last_line: usize,
    row_number: usize,
}

impl Record {
    /// Cells of the record; `None` stands for an empty unquoted field.
    pub fn cells(&self) -> &[Option<String>] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Option<String>> {
        self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at a 0-based index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).and_then(|cell| cell.as_deref())
    }

    pub fn first_line(&self) -> usize {
        self.first_line
    }

    pub fn last_line(&self) -> usize {
        self.last_line
    }

    /// Physical lines (1-based, inclusive) the record spans.
    pub fn line_range(&self) -> RangeInclusive<usize> {
        self.first_line..=self.last_line
    }

    /// Logical position (1-based) of the record in the stream.
    pub fn row_number(&self) -> usize {
        self.row_number
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    FieldStart,
    InUnquotedField,
    InQuotedField,
    /// A quote was just read inside a quoted field: either the first half of
    /// a doubled quote or the closing quote.
    QuoteInQuotedField,
    /// A distinct escape character was just read inside a quoted field.
    EscapeInQuotedField,
    AfterQuotedField,
}

struct PhysicalLine {
    content: String,
    /// Empty when the stream ended without a terminator.
    terminator: &'static str,
}

/// Accumulates the characters of the field being read.
#[derive(Default)]
struct Field {
    text: String,
    pending_spaces: usize,
    quoted: bool,
}

impl Field {
    fn push(&mut self, c: char) {
        self.push_spaces();
        self.text.push(c);
    }

    fn push_str(&mut self, s: &str) {
        self.push_spaces();
        self.text.push_str(s);
    }

    fn push_spaces(&mut self) {
        self.text.extend(std::iter::repeat_n(' ', self.pending_spaces));
        self.pending_spaces = 0;
    }

    fn finish(&mut self, keep_spaces: bool, empty_column_parsing: EmptyColumnParsing) -> Option<String> {
        if keep_spaces {
            self.push_spaces();
        }
        let field = mem::take(self);
        if !field.text.is_empty() {
            Some(field.text)
        } else if field.quoted && empty_column_parsing == EmptyColumnParsing::AsEmptyString {
            Some(String::new())
        } else {
            None
        }
    }
}

/// Reads logical records from a character stream under a [`CsvPreference`].
///
/// # Examples
///
/// ```
/// use super_csv::item::csv::tokenizer::Tokenizer;
/// use super_csv::prefs::CsvPreference;
///
/// let input = "\"a,\nb\",c\n\"say \"\"hi\"\"\",d\n";
/// let mut tokenizer = Tokenizer::new(input.as_bytes(), CsvPreference::excel());
///
/// let record = tokenizer.read_record().unwrap().unwrap();
/// assert_eq!(record.get(0), Some("a,\nb"));
/// assert_eq!(record.get(1), Some("c"));
/// assert_eq!(record.line_range(), 1..=2);
///
/// let record = tokenizer.read_record().unwrap().unwrap();
/// assert_eq!(record.get(0), Some("say \"hi\""));
///
/// assert!(tokenizer.read_record().unwrap().is_none());
/// ```
pub struct Tokenizer<R> {
    reader: R,
    preference: CsvPreference,
    line_number: usize,
    row_number: usize,
    untokenized_row: String,
}

impl<R: BufRead> Tokenizer<R> {
    pub fn new(reader: R, preference: CsvPreference) -> Self {
        Self {
            reader,
            preference,
            line_number: 0,
            row_number: 0,
            untokenized_row: String::new(),
        }
    }

    pub fn preference(&self) -> &CsvPreference {
        &self.preference
    }

    /// Number of physical lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Number of logical records returned so far.
    pub fn row_number(&self) -> usize {
        self.row_number
    }

    /// Raw text of the last record read, its lines joined with their terminators.
    pub fn untokenized_row(&self) -> &str {
        &self.untokenized_row
    }

    /// Reads the next logical record, or `None` at the end of the stream.
    ///
    /// A failure leaves the stream positioned after the offending line. Since
    /// a broken quote has no reliable resynchronization point, callers should
    /// stop reading after a tokenization error.
    pub fn read_record(&mut self) -> CsvResult<Option<Record>> {
        self.untokenized_row.clear();

        let mut line = loop {
            let Some(line) = self.read_line(1, false)? else {
                return Ok(None);
            };
            if self.preference.ignore_empty_lines() && line.content.is_empty() {
                continue;
            }
            if self.preference.is_comment(&line.content) {
                debug!("Skipping comment on line {}", self.line_number);
                continue;
            }
            break line;
        };

        let delimiter = self.preference.delimiter();
        let quote = self.preference.quote_char();
        let escape = self.preference.quote_escape_char();
        let keep_spaces = !self.preference.surrounding_spaces_need_quotes();
        let empty_column_parsing = self.preference.empty_column_parsing();

        let first_line = self.line_number;
        let mut quote_start_line = first_line;
        let mut cells = Vec::new();
        let mut field = Field::default();
        let mut state = State::FieldStart;

        loop {
            self.untokenized_row.push_str(&line.content);

            for c in line.content.chars() {
                state = match state {
                    State::FieldStart => {
                        if c == delimiter {
                            cells.push(field.finish(keep_spaces, empty_column_parsing));
                            State::FieldStart
                        } else if c == quote {
                            if keep_spaces {
                                field.push_spaces();
                            } else {
                                field.pending_spaces = 0;
                            }
                            field.quoted = true;
                            quote_start_line = self.line_number;
                            State::InQuotedField
                        } else if c == ' ' {
                            field.pending_spaces += 1;
                            State::FieldStart
                        } else {
                            if !keep_spaces {
                                field.pending_spaces = 0;
                            }
                            field.push(c);
                            State::InUnquotedField
                        }
                    }
                    State::InUnquotedField => {
                        if c == delimiter {
                            cells.push(field.finish(keep_spaces, empty_column_parsing));
                            State::FieldStart
                        } else if c == ' ' {
                            field.pending_spaces += 1;
                            State::InUnquotedField
                        } else {
                            field.push(c);
                            State::InUnquotedField
                        }
                    }
                    State::InQuotedField => {
                        if c == escape && escape != quote {
                            State::EscapeInQuotedField
                        } else if c == quote {
                            State::QuoteInQuotedField
                        } else {
                            field.push(c);
                            State::InQuotedField
                        }
                    }
                    State::EscapeInQuotedField => {
                        if c != quote && c != escape {
                            field.push(escape);
                        }
                        field.push(c);
                        State::InQuotedField
                    }
                    State::QuoteInQuotedField => {
                        if c == quote && escape == quote {
                            field.push(quote);
                            State::InQuotedField
                        } else if c == delimiter {
                            cells.push(field.finish(false, empty_column_parsing));
                            State::FieldStart
                        } else if c == ' ' {
                            State::AfterQuotedField
                        } else {
                            return Err(self.malformed_quote(c, cells.len() + 1));
                        }
                    }
                    State::AfterQuotedField => {
                        if c == delimiter {
                            cells.push(field.finish(false, empty_column_parsing));
                            State::FieldStart
                        } else if c == ' ' {
                            State::AfterQuotedField
                        } else {
                            return Err(self.malformed_quote(c, cells.len() + 1));
                        }
                    }
                };
            }

            match state {
                State::InQuotedField | State::EscapeInQuotedField => {
                    if state == State::EscapeInQuotedField {
                        field.push(escape);
                        state = State::InQuotedField;
                    }
                    let column = cells.len() + 1;
                    if line.terminator.is_empty() {
                        return Err(self.unterminated_quote(quote_start_line, column));
                    }
                    field.push_str(line.terminator);
                    self.untokenized_row.push_str(line.terminator);

                    let max_lines = self.preference.max_lines_per_record();
                    if max_lines > 0 && self.line_number - first_line + 1 >= max_lines {
                        return Err(self.parse_error(
                            format!(
                                "max number of lines to read exceeded while reading quoted column \
                                 beginning on line {} and ending on line {}",
                                quote_start_line, self.line_number
                            ),
                            column,
                        ));
                    }

                    line = match self.read_line(column, true)? {
                        Some(next) => next,
                        None => return Err(self.unterminated_quote(quote_start_line, column)),
                    };
                }
                State::FieldStart | State::InUnquotedField => {
                    cells.push(field.finish(keep_spaces, empty_column_parsing));
                    break;
                }
                State::QuoteInQuotedField | State::AfterQuotedField => {
                    cells.push(field.finish(false, empty_column_parsing));
                    break;
                }
            }
        }

        self.row_number += 1;
        debug!(
            "Read record {} ({} columns) from lines {}..={}",
            self.row_number,
            cells.len(),
            first_line,
            self.line_number
        );

        Ok(Some(Record {
            cells,
            first_line,
            last_line: self.line_number,
            row_number: self.row_number,
        }))
    }

    /// Reads one physical line. `column` and `in_quotes` describe the field the
    /// line starts in, to locate a decoding failure.
    fn read_line(&mut self, column: usize, in_quotes: bool) -> CsvResult<Option<PhysicalLine>> {
        let mut bytes = Vec::new();
        let mut terminator = "";

        loop {
            let buffer = self.reader.fill_buf()?;
            if buffer.is_empty() {
                break;
            }
            match buffer.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(index) => {
                    bytes.extend_from_slice(&buffer[..index]);
                    let found = buffer[index];
                    self.reader.consume(index + 1);
                    if found == b'\n' {
                        terminator = "\n";
                    } else if self.reader.fill_buf()?.first() == Some(&b'\n') {
                        self.reader.consume(1);
                        terminator = "\r\n";
                    } else {
                        terminator = "\r";
                    }
                    break;
                }
                None => {
                    let length = buffer.len();
                    bytes.extend_from_slice(buffer);
                    self.reader.consume(length);
                }
            }
        }

        if bytes.is_empty() && terminator.is_empty() {
            return Ok(None);
        }

        self.line_number += 1;
        let content = String::from_utf8(bytes).map_err(|error| {
            let valid = &error.as_bytes()[..error.utf8_error().valid_up_to()];
            let column = self.column_at(valid, column, in_quotes);
            self.parse_error(format!("line is not valid UTF-8: {}", error.utf8_error()), column)
        })?;

        Ok(Some(PhysicalLine {
            content,
            terminator,
        }))
    }

    /// Column reached after the valid prefix of an undecodable line.
    fn column_at(&self, valid: &[u8], mut column: usize, mut in_quotes: bool) -> usize {
        let delimiter = self.preference.delimiter();
        let quote = self.preference.quote_char();
        let escape = self.preference.quote_escape_char();
        let mut escaped = false;
        for c in String::from_utf8_lossy(valid).chars() {
            if escaped {
                escaped = false;
            } else if in_quotes && c == escape && escape != quote {
                escaped = true;
            } else if c == quote {
                in_quotes = !in_quotes;
            } else if c == delimiter && !in_quotes {
                column += 1;
            }
        }
        column
    }

    fn parse_error(&self, message: String, column_number: usize) -> CsvError {
        CsvError::Parse {
            message,
            context: CsvContext::new(self.line_number, self.row_number + 1, column_number),
        }
    }

    fn malformed_quote(&self, c: char, column_number: usize) -> CsvError {
        self.parse_error(
            format!(
                "malformed quoted column: unexpected character {:?} after the closing quote",
                c
            ),
            column_number,
        )
    }

    fn unterminated_quote(&self, quote_start_line: usize, column_number: usize) -> CsvError {
        self.parse_error(
            format!(
                "unexpected end of file while reading quoted column beginning on line {} \
                 and ending on line {}",
                quote_start_line, self.line_number
            ),
            column_number,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::prefs::comment::CommentStartsWith;

    fn tokenizer(input: &str, preference: CsvPreference) -> Tokenizer<Cursor<Vec<u8>>> {
        Tokenizer::new(Cursor::new(input.as_bytes().to_vec()), preference)
    }

    fn read_all(input: &str, preference: CsvPreference) -> Vec<Vec<Option<String>>> {
        let mut tokenizer = tokenizer(input, preference);
        let mut records = Vec::new();
        while let Some(record) = tokenizer.read_record().unwrap() {
            records.push(record.into_cells());
        }
        records
    }

    fn cells(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn should_split_simple_records() {
        let records = read_all("a,b,c\r\n1,2,3\r\n", CsvPreference::standard());

        assert_eq!(
            records,
            vec![
                cells(&[Some("a"), Some("b"), Some("c")]),
                cells(&[Some("1"), Some("2"), Some("3")]),
            ]
        );
    }

    #[test]
    fn empty_unquoted_fields_should_be_null() {
        let records = read_all(",a,,\n", CsvPreference::excel());

        assert_eq!(records, vec![cells(&[None, Some("a"), None, None])]);
    }

    #[test]
    fn quoted_empty_field_depends_on_empty_column_parsing() {
        assert_eq!(
            read_all("\"\",x\n", CsvPreference::excel()),
            vec![cells(&[None, Some("x")])]
        );

        let preference = CsvPreference::excel()
            .to_builder()
            .empty_column_parsing(EmptyColumnParsing::AsEmptyString)
            .build()
            .unwrap();
        assert_eq!(
            read_all("\"\",,x\n", preference),
            vec![cells(&[Some(""), None, Some("x")])]
        );
    }

    #[test]
    fn multi_line_quoted_field_should_span_lines() {
        let mut tokenizer = tokenizer("\"a,\nb\",c\nd,e\n", CsvPreference::excel());

        let record = tokenizer.read_record().unwrap().unwrap();
        assert_eq!(record.cells(), cells(&[Some("a,\nb"), Some("c")]).as_slice());
        assert_eq!(record.line_range(), 1..=2);
        assert_eq!(record.row_number(), 1);
        assert_eq!(tokenizer.untokenized_row(), "\"a,\nb\",c");

        let record = tokenizer.read_record().unwrap().unwrap();
        assert_eq!(record.line_range(), 3..=3);
        assert_eq!(record.row_number(), 2);
    }

    #[test]
    fn embedded_terminator_should_be_kept_verbatim() {
        let records = read_all("\"a\r\nb\",\"c\rd\"\r\n", CsvPreference::standard());

        assert_eq!(records, vec![cells(&[Some("a\r\nb"), Some("c\rd")])]);
    }

    #[test]
    fn lone_carriage_return_should_end_record() {
        let records = read_all("a,b\rc,d", CsvPreference::standard());

        assert_eq!(
            records,
            vec![cells(&[Some("a"), Some("b")]), cells(&[Some("c"), Some("d")])]
        );
    }

    #[test]
    fn doubled_quote_should_be_unescaped() {
        assert_eq!(
            read_all("\"a\"\"b\"\n", CsvPreference::excel()),
            vec![cells(&[Some("a\"b")])]
        );
    }

    #[test]
    fn quote_inside_unquoted_field_should_be_literal() {
        assert_eq!(
            read_all("ab\"c,d\n", CsvPreference::excel()),
            vec![cells(&[Some("ab\"c"), Some("d")])]
        );
    }

    #[test]
    fn distinct_escape_char_should_escape_quote_and_itself() {
        let preference = CsvPreference::excel()
            .to_builder()
            .quote_escape_char('\\')
            .build()
            .unwrap();

        let records = read_all("\"a\\\"b\",\"c\\\\d\",\"e\\f\"\n", preference);

        assert_eq!(
            records,
            vec![cells(&[Some("a\"b"), Some("c\\d"), Some("e\\f")])]
        );
    }

    #[test]
    fn comments_should_be_skipped_without_consuming_rows() {
        let preference = CsvPreference::excel()
            .to_builder()
            .skip_comments(CommentStartsWith::new("#").unwrap())
            .build()
            .unwrap();
        let mut tokenizer = tokenizer("# header comment\na,b\n#x,y\nc,d\n", preference);

        let first = tokenizer.read_record().unwrap().unwrap();
        assert_eq!(first.row_number(), 1);
        assert_eq!(first.line_range(), 2..=2);

        let second = tokenizer.read_record().unwrap().unwrap();
        assert_eq!(second.row_number(), 2);
        assert_eq!(second.get(0), Some("c"));
        assert_eq!(second.line_range(), 4..=4);

        assert!(tokenizer.read_record().unwrap().is_none());
    }

    #[test]
    fn comment_like_line_inside_quoted_field_should_be_content() {
        let preference = CsvPreference::excel()
            .to_builder()
            .skip_comments(CommentStartsWith::new("#").unwrap())
            .build()
            .unwrap();

        let records = read_all("\"first\n# not a comment\",x\n", preference);

        assert_eq!(
            records,
            vec![cells(&[Some("first\n# not a comment"), Some("x")])]
        );
    }

    #[test]
    fn empty_lines_should_be_skipped_unless_disabled() {
        assert_eq!(
            read_all("a\n\n\nb\n", CsvPreference::excel()),
            vec![cells(&[Some("a")]), cells(&[Some("b")])]
        );

        let preference = CsvPreference::excel()
            .to_builder()
            .ignore_empty_lines(false)
            .build()
            .unwrap();
        assert_eq!(
            read_all("a\n\nb\n", preference),
            vec![cells(&[Some("a")]), cells(&[None]), cells(&[Some("b")])]
        );
    }

    #[test]
    fn unterminated_quote_should_report_last_line() {
        let mut tokenizer = tokenizer("x\n\"abc\ndef", CsvPreference::excel());
        tokenizer.read_record().unwrap();

        let error = tokenizer.read_record().unwrap_err();

        match error {
            CsvError::Parse { message, context } => {
                assert!(message.contains("unexpected end of file"));
                assert!(message.contains("beginning on line 2"));
                assert_eq!(context.line_number, 3);
                assert_eq!(context.row_number, 2);
                assert_eq!(context.column_number, 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn unterminated_quote_on_single_line_should_fail() {
        let error = tokenizer("\"abc", CsvPreference::excel())
            .read_record()
            .unwrap_err();

        assert_eq!(error.context().map(|c| c.line_number), Some(1));
        assert!(!error.is_row_recoverable());
    }

    #[test]
    fn max_lines_per_record_should_stop_runaway_quote() {
        let preference = CsvPreference::excel()
            .to_builder()
            .max_lines_per_record(3)
            .build()
            .unwrap();
        let mut tokenizer = tokenizer("\"a\nb\nc\nd\ne\",f\n", preference);

        let error = tokenizer.read_record().unwrap_err();

        match error {
            CsvError::Parse { message, context } => {
                assert!(message.contains("max number of lines"));
                assert_eq!(context.line_number, 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(tokenizer.line_number(), 3);
    }

    #[test]
    fn max_lines_per_record_should_allow_records_within_limit() {
        let preference = CsvPreference::excel()
            .to_builder()
            .max_lines_per_record(3)
            .build()
            .unwrap();

        assert_eq!(
            read_all("\"a\nb\nc\",d\n", preference),
            vec![cells(&[Some("a\nb\nc"), Some("d")])]
        );
    }

    #[test]
    fn character_after_closing_quote_should_be_malformed() {
        let error = tokenizer("a,\"b\"c,d\n", CsvPreference::excel())
            .read_record()
            .unwrap_err();

        match error {
            CsvError::Parse { message, context } => {
                assert!(message.contains("malformed"));
                assert_eq!(context.column_number, 2);
                assert_eq!(context.line_number, 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn spaces_after_closing_quote_should_be_ignored() {
        assert_eq!(
            read_all("\"a\"  ,\"b\" \n", CsvPreference::excel()),
            vec![cells(&[Some("a"), Some("b")])]
        );
    }

    #[test]
    fn surrounding_spaces_should_be_kept_by_default() {
        assert_eq!(
            read_all("  a b  , \"c\" \n", CsvPreference::excel()),
            vec![cells(&[Some("  a b  "), Some(" c")])]
        );
    }

    #[test]
    fn surrounding_spaces_should_be_trimmed_when_they_need_quotes() {
        let preference = CsvPreference::excel()
            .to_builder()
            .surrounding_spaces_need_quotes(true)
            .build()
            .unwrap();

        assert_eq!(
            read_all("  a b  , \" c \" ,   \n", preference),
            vec![cells(&[Some("a b"), Some(" c "), None])]
        );
    }

    #[test]
    fn custom_dialect_should_be_honoured() {
        let preference = CsvPreference::builder('\'', '|', "\n").build().unwrap();

        assert_eq!(
            read_all("'a|b'|'it''s'|\"x\"\n", preference),
            vec![cells(&[Some("a|b"), Some("it's"), Some("\"x\"")])]
        );
    }

    #[test]
    fn invalid_utf8_should_fail_with_line() {
        let mut tokenizer = Tokenizer::new(
            Cursor::new(b"ok\n\xff\xfe\n".to_vec()),
            CsvPreference::excel(),
        );
        tokenizer.read_record().unwrap();

        let error = tokenizer.read_record().unwrap_err();
        assert_eq!(error.context().map(|c| c.line_number), Some(2));
        assert_eq!(error.context().map(|c| c.column_number), Some(1));
    }

    #[test]
    fn invalid_utf8_should_report_the_column_it_occurs_in() {
        let mut tokenizer = Tokenizer::new(
            Cursor::new(b"a,\"b,c\",d\xff,e\n".to_vec()),
            CsvPreference::excel(),
        );

        let error = tokenizer.read_record().unwrap_err();

        assert!(matches!(error, CsvError::Parse { .. }));
        assert_eq!(error.context().map(|c| c.column_number), Some(3));
    }

    #[test]
    fn invalid_utf8_inside_multi_line_field_should_report_its_column() {
        let mut tokenizer = Tokenizer::new(
            Cursor::new(b"a,\"b\nc,\xff\"\n".to_vec()),
            CsvPreference::excel(),
        );

        let error = tokenizer.read_record().unwrap_err();

        let context = error.context().unwrap();
        assert_eq!(context.line_number, 2);
        assert_eq!(context.column_number, 2);
    }

    #[test]
    fn empty_stream_should_have_no_record() {
        let mut tokenizer = tokenizer("", CsvPreference::standard());

        assert!(tokenizer.read_record().unwrap().is_none());
        assert_eq!(tokenizer.line_number(), 0);
        assert_eq!(tokenizer.row_number(), 0);
    }
}
