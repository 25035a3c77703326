use std::{
    cell::{Cell, RefCell},
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    rc::Rc,
};

use log::debug;

use crate::{
    core::{
        cell::CellValue,
        context::CsvContext,
        item::{ItemWriter, ItemWriterResult},
        processor::Chain,
    },
    error::{CsvError, CsvResult},
    prefs::CsvPreference,
};

use super::{encoder::CsvEncoder, row::Header};

/// Writes rows as CSV records.
///
/// Every row goes through the [`CsvEncoder`], which quotes and escapes only
/// what needs it, and is followed by the preference's end-of-line symbols.
/// The writer counts the physical lines it emits, so a failure in a chain is
/// reported at the line the row would have started on.
///
/// # Examples
///
/// ```
/// use super_csv::core::cell::CellValue;
/// use super_csv::item::csv::csv_writer::CsvListWriterBuilder;
/// use super_csv::prefs::CsvPreference;
///
/// let writer = CsvListWriterBuilder::new()
///     .preference(CsvPreference::excel())
///     .from_writer(Vec::new());
///
/// writer.write_header(&["name", "comment"]).unwrap();
/// writer.write(&[CellValue::from("Ada"), CellValue::from("says \"hi\"")]).unwrap();
/// writer.write(&[CellValue::from("Bob"), CellValue::Null]).unwrap();
///
/// let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(output, "name,comment\nAda,\"says \"\"hi\"\"\"\nBob,\n");
/// ```
pub struct CsvListWriter<W: Write> {
    writer: RefCell<W>,
    encoder: CsvEncoder,
    processors: Vec<Chain>,
    header: RefCell<Option<Rc<Header>>>,
    pending_header: RefCell<Option<Vec<String>>>,
    line_number: Cell<usize>,
    row_number: Cell<usize>,
}

impl<W: Write> CsvListWriter<W> {
    /// Writes the header row; it must be the first row written.
    pub fn write_header<S: AsRef<str>>(&self, names: &[S]) -> CsvResult<()> {
        if self.row_number.get() > 0 {
            return Err(CsvError::Configuration(format!(
                "the header must be the first row written, but {} rows have already been written",
                self.row_number.get()
            )));
        }
        let names: Vec<String> = names.iter().map(|name| name.as_ref().to_string()).collect();
        if !self.processors.is_empty() && self.processors.len() != names.len() {
            return Err(CsvError::Configuration(format!(
                "the number of processors ({}) does not match the number of header columns ({})",
                self.processors.len(),
                names.len()
            )));
        }

        self.pending_header.replace(None);
        let cells: Vec<Option<&str>> = names.iter().map(|name| Some(name.as_str())).collect();
        self.write_record(&cells)?;
        self.header.replace(Some(Rc::new(Header::new(names))));
        Ok(())
    }

    /// Writes values rendered with their `Display` impl; nulls become empty columns.
    pub fn write(&self, values: &[CellValue]) -> CsvResult<()> {
        self.write_pending_header()?;
        let cells: Vec<Option<String>> = values.iter().cloned().map(CellValue::into_cell).collect();
        self.write_record(&cells)
    }

    /// Writes a row of strings.
    pub fn write_strings<S: AsRef<str>>(&self, values: &[S]) -> CsvResult<()> {
        self.write_pending_header()?;
        let cells: Vec<Option<&str>> = values.iter().map(|value| Some(value.as_ref())).collect();
        self.write_record(&cells)
    }

    /// Runs each value through the chain of its column, then writes the row.
    ///
    /// Nothing is written when a chain fails.
    pub fn write_with(&self, values: &[CellValue], processors: &[Chain]) -> CsvResult<()> {
        self.write_pending_header()?;
        let context = self.next_context();
        if values.len() != processors.len() {
            return Err(CsvError::column_count(processors.len(), values.len(), &context));
        }

        let header = self.header.borrow().clone();
        let cells = values
            .iter()
            .zip(processors)
            .enumerate()
            .map(|(index, (value, chain))| {
                let name = header.as_ref().and_then(|header| header.name(index));
                chain
                    .execute(value.clone(), &context.at_column(index + 1, name))
                    .map(CellValue::into_cell)
            })
            .collect::<CsvResult<Vec<Option<String>>>>()?;
        self.write_record(&cells)
    }

    /// Writes a comment line verbatim, followed by the end-of-line symbols.
    ///
    /// Comments do not count as rows.
    pub fn write_comment(&self, comment: &str) -> CsvResult<()> {
        self.write_line(comment)
    }

    pub fn flush(&self) -> CsvResult<()> {
        self.write_pending_header()?;
        self.writer.borrow_mut().flush()?;
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> CsvResult<W> {
        self.flush()?;
        Ok(self.writer.into_inner())
    }

    pub fn header(&self) -> Option<Rc<Header>> {
        self.header.borrow().clone()
    }

    /// Physical lines written so far.
    pub fn line_number(&self) -> usize {
        self.line_number.get()
    }

    /// Rows written so far, the header included.
    pub fn row_number(&self) -> usize {
        self.row_number.get()
    }

    pub fn preference(&self) -> &CsvPreference {
        self.encoder.preference()
    }

    fn next_context(&self) -> CsvContext {
        CsvContext::new(self.line_number.get() + 1, self.row_number.get() + 1, 0)
    }

    pub(crate) fn write_pending_header(&self) -> CsvResult<()> {
        let pending = self.pending_header.borrow_mut().take();
        match pending {
            Some(names) => self.write_header(&names),
            None => Ok(()),
        }
    }

    fn write_record<S: AsRef<str>>(&self, cells: &[Option<S>]) -> CsvResult<()> {
        let line = self.encoder.encode_record(cells, &self.next_context())?;
        self.write_line(&line)?;
        self.row_number.set(self.row_number.get() + 1);
        debug!("CSV row {} written: {}", self.row_number.get(), line);
        Ok(())
    }

    fn write_line(&self, line: &str) -> CsvResult<()> {
        let mut writer = self.writer.borrow_mut();
        writer.write_all(line.as_bytes())?;
        writer.write_all(self.encoder.preference().end_of_line_symbols().as_bytes())?;
        self.line_number
            .set(self.line_number.get() + 1 + count_line_breaks(line));
        Ok(())
    }
}

impl<W: Write> ItemWriter<Vec<CellValue>> for CsvListWriter<W> {
    /// Writes the row through the builder's processors, if any.
    fn write(&self, item: &Vec<CellValue>) -> ItemWriterResult {
        if self.processors.is_empty() {
            CsvListWriter::write(self, item)
        } else {
            self.write_with(item, &self.processors)
        }
    }

    fn flush(&self) -> ItemWriterResult {
        CsvListWriter::flush(self)
    }
}

/// Counts the line terminators embedded in an encoded record.
fn count_line_breaks(line: &str) -> usize {
    let mut count = 0;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\n' => count += 1,
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                count += 1;
            }
            _ => {}
        }
    }
    count
}

/// Configures a [`CsvListWriter`].
///
/// # Examples
///
/// ```
/// use super_csv::core::cell::CellValue;
/// use super_csv::core::item::ItemWriter;
/// use super_csv::item::csv::csv_writer::CsvListWriterBuilder;
///
/// let writer = CsvListWriterBuilder::new()
///     .header(vec!["id".to_string(), "label".to_string()])
///     .from_writer(Vec::new());
///
/// ItemWriter::write(&writer, &vec![CellValue::Integer(1), CellValue::from("one")]).unwrap();
///
/// let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(output, "id,label\r\n1,one\r\n");
/// ```
#[derive(Default)]
pub struct CsvListWriterBuilder {
    preference: CsvPreference,
    processors: Vec<Chain>,
    header: Option<Vec<String>>,
}

impl CsvListWriterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preference(mut self, preference: CsvPreference) -> Self {
        self.preference = preference;
        self
    }

    /// One chain per column, used by the [`ItemWriter`] implementation.
    pub fn processors(mut self, processors: Vec<Chain>) -> Self {
        self.processors = processors;
        self
    }

    /// Header written before the first row.
    pub fn header(mut self, names: Vec<String>) -> Self {
        self.header = Some(names);
        self
    }

    pub fn from_writer<W: Write>(self, wtr: W) -> CsvListWriter<W> {
        CsvListWriter {
            writer: RefCell::new(wtr),
            encoder: CsvEncoder::new(self.preference),
            processors: self.processors,
            header: RefCell::new(None),
            pending_header: RefCell::new(self.header),
            line_number: Cell::new(0),
            row_number: Cell::new(0),
        }
    }

    pub fn from_path<P: AsRef<Path>>(self, path: P) -> CsvResult<CsvListWriter<BufWriter<File>>> {
        let file = File::create(path)?;
        Ok(self.from_writer(BufWriter::new(file)))
    }
}
