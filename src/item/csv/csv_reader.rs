use std::{
    cell::{Cell, RefCell},
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    rc::Rc,
};

use log::debug;

use crate::{
    core::{
        cell::CellValue,
        context::CsvContext,
        item::{ItemReader, ItemReaderResult},
        processor::Chain,
    },
    error::{CsvError, CsvResult},
    prefs::CsvPreference,
};

use super::{
    row::{FromRow, Header, Row},
    tokenizer::{Record, Tokenizer},
};

/// Reads CSV records as lists of cells.
///
/// The reader pulls one logical record at a time from its [`Tokenizer`] and,
/// when asked to, runs every cell through the chain bound to its column.
/// Methods take `&self`; the tokenizer sits behind a `RefCell`, the same way
/// every item reader of this crate keeps its cursor.
///
/// # Examples
///
/// ```
/// use super_csv::core::cell::CellValue;
/// use super_csv::core::processor::Chain;
/// use super_csv::item::csv::csv_reader::CsvListReaderBuilder;
/// use super_csv::processor::{NotNull, Optional, ParseInt};
///
/// let data = "name,age\nAlice,30\nBob,\n";
/// let reader = CsvListReaderBuilder::new().from_reader(data.as_bytes());
///
/// let header = reader.read_header(true).unwrap().unwrap();
/// assert_eq!(header, vec!["name", "age"]);
///
/// let processors = vec![
///     Chain::new().then(NotNull::new()),
///     Chain::new().then(Optional::new()).then(ParseInt::new()),
/// ];
/// let alice = reader.read_with(&processors).unwrap().unwrap();
/// assert_eq!(alice, vec![CellValue::from("Alice"), CellValue::Integer(30)]);
///
/// let bob = reader.read_with(&processors).unwrap().unwrap();
/// assert_eq!(bob, vec![CellValue::from("Bob"), CellValue::Null]);
///
/// assert!(reader.read().unwrap().is_none());
/// ```
pub struct CsvListReader<R> {
    tokenizer: RefCell<Tokenizer<R>>,
    header: RefCell<Option<Rc<Header>>>,
    header_pending: Cell<bool>,
    processors: Vec<Chain>,
    length: Cell<usize>,
}

impl<R: BufRead> CsvListReader<R> {
    /// Reads the header record.
    ///
    /// With `first_record_check`, fails when records were already read, so a
    /// data row is never silently taken for a header. Null cells become empty
    /// names. The header is kept and its names are attached to the context of
    /// every processed cell.
    pub fn read_header(&self, first_record_check: bool) -> CsvResult<Option<Vec<String>>> {
        {
            let tokenizer = self.tokenizer.borrow();
            if first_record_check && tokenizer.row_number() > 0 {
                return Err(CsvError::Configuration(format!(
                    "CSV header must be fetched as the first read operation, but {} lines have already been read",
                    tokenizer.line_number()
                )));
            }
        }
        self.header_pending.set(false);

        let Some(record) = self.next_record()? else {
            return Ok(None);
        };
        let names: Vec<String> = record
            .into_cells()
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();

        if !self.processors.is_empty() && self.processors.len() != names.len() {
            return Err(CsvError::Configuration(format!(
                "the number of processors ({}) does not match the number of header columns ({})",
                self.processors.len(),
                names.len()
            )));
        }

        debug!("CSV header: {:?}", names);
        self.header.replace(Some(Rc::new(Header::new(names.clone()))));
        Ok(Some(names))
    }

    /// Reads the next record without processing; `None` cells are empty columns.
    pub fn read(&self) -> CsvResult<Option<Vec<Option<String>>>> {
        self.consume_pending_header()?;
        Ok(self.next_record()?.map(Record::into_cells))
    }

    /// Reads the next record and runs each cell through the chain of its column.
    ///
    /// There must be exactly one chain per column; a record of another width
    /// fails with [`CsvError::ColumnCount`] and the reader moves on to the
    /// next record.
    pub fn read_with(&self, processors: &[Chain]) -> CsvResult<Option<Vec<CellValue>>> {
        self.consume_pending_header()?;
        match self.next_record()? {
            Some(record) => self.execute_processors(record, processors).map(Some),
            None => Ok(None),
        }
    }

    /// Reads the next record through the processors given to the builder.
    ///
    /// Without configured processors cells are passed through as text.
    pub fn read_row(&self) -> CsvResult<Option<Row>> {
        self.consume_pending_header()?;
        let Some(record) = self.next_record()? else {
            return Ok(None);
        };
        let row_number = record.row_number();
        let values = if self.processors.is_empty() {
            record.into_cells().into_iter().map(CellValue::from).collect()
        } else {
            self.execute_processors(record, &self.processors)?
        };
        Ok(Some(Row::new(values, self.header.borrow().clone(), row_number)))
    }

    /// Reads the next row and maps it onto `T`.
    pub fn read_into<T: FromRow>(&self) -> CsvResult<Option<T>> {
        match self.read_row()? {
            Some(row) => T::from_row(&row).map(Some),
            None => Ok(None),
        }
    }

    /// Header read so far, if any.
    pub fn header(&self) -> Option<Rc<Header>> {
        self.header.borrow().clone()
    }

    /// Physical lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.tokenizer.borrow().line_number()
    }

    /// Logical records read so far, the header included.
    pub fn row_number(&self) -> usize {
        self.tokenizer.borrow().row_number()
    }

    /// Raw text of the last record read.
    pub fn untokenized_row(&self) -> String {
        self.tokenizer.borrow().untokenized_row().to_string()
    }

    /// Number of columns of the last record read.
    pub fn length(&self) -> usize {
        self.length.get()
    }

    pub fn preference(&self) -> CsvPreference {
        self.tokenizer.borrow().preference().clone()
    }

    fn consume_pending_header(&self) -> CsvResult<()> {
        if self.header_pending.get() {
            self.read_header(true)?;
        }
        Ok(())
    }

    fn next_record(&self) -> CsvResult<Option<Record>> {
        let record = self.tokenizer.borrow_mut().read_record()?;
        if let Some(record) = &record {
            self.length.set(record.len());
        }
        Ok(record)
    }

    pub(crate) fn execute_processors(
        &self,
        record: Record,
        processors: &[Chain],
    ) -> CsvResult<Vec<CellValue>> {
        let context = CsvContext::new(record.last_line(), record.row_number(), 0);
        if record.len() != processors.len() {
            return Err(CsvError::column_count(processors.len(), record.len(), &context));
        }

        let header = self.header.borrow();
        record
            .into_cells()
            .into_iter()
            .zip(processors)
            .enumerate()
            .map(|(index, (cell, chain))| {
                let name = header.as_ref().and_then(|header| header.name(index));
                chain.execute(CellValue::from(cell), &context.at_column(index + 1, name))
            })
            .collect()
    }
}

impl<R: BufRead> ItemReader<Vec<CellValue>> for CsvListReader<R> {
    /// Reads the next row through the builder's processors.
    fn read(&self) -> ItemReaderResult<Vec<CellValue>> {
        Ok(self.read_row()?.map(Row::into_values))
    }
}

/// Configures a [`CsvListReader`].
///
/// # Examples
///
/// ```
/// use super_csv::core::item::ItemReader;
/// use super_csv::core::cell::CellValue;
/// use super_csv::item::csv::csv_reader::CsvListReaderBuilder;
/// use super_csv::prefs::CsvPreference;
///
/// let reader = CsvListReaderBuilder::new()
///     .preference(CsvPreference::excel_north_europe())
///     .has_headers(true)
///     .from_reader("city;country\nOslo;Norway\n".as_bytes());
///
/// let row = ItemReader::read(&reader).unwrap().unwrap();
/// assert_eq!(row, vec![CellValue::from("Oslo"), CellValue::from("Norway")]);
/// assert_eq!(reader.header().unwrap().names(), ["city", "country"]);
/// ```
#[derive(Default)]
pub struct CsvListReaderBuilder {
    preference: CsvPreference,
    processors: Vec<Chain>,
    has_headers: bool,
}

impl CsvListReaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preference(mut self, preference: CsvPreference) -> Self {
        self.preference = preference;
        self
    }

    /// One chain per column, used by `read_row`, `read_into` and the
    /// [`ItemReader`] implementation.
    pub fn processors(mut self, processors: Vec<Chain>) -> Self {
        self.processors = processors;
        self
    }

    /// Whether the first record is a header, consumed before the first row.
    pub fn has_headers(mut self, yes: bool) -> Self {
        self.has_headers = yes;
        self
    }

    pub fn from_reader<R: Read>(self, rdr: R) -> CsvListReader<BufReader<R>> {
        self.from_buf_reader(BufReader::new(rdr))
    }

    pub fn from_buf_reader<R: BufRead>(self, rdr: R) -> CsvListReader<R> {
        CsvListReader {
            tokenizer: RefCell::new(Tokenizer::new(rdr, self.preference)),
            header: RefCell::new(None),
            header_pending: Cell::new(self.has_headers),
            processors: self.processors,
            length: Cell::new(0),
        }
    }

    pub fn from_path<P: AsRef<Path>>(self, path: P) -> CsvResult<CsvListReader<BufReader<File>>> {
        let file = File::open(path)?;
        Ok(self.from_reader(file))
    }
}
