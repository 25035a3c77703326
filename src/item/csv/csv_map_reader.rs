use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    rc::Rc,
};

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
    csv_reader::{CsvListReader, CsvListReaderBuilder},
    row::Header,
};

/// Reads CSV records as maps from column name to value.
///
/// Columns are named by a name mapping given on each read, usually the
/// header. A `None` entry skips its column.
///
/// # Examples
///
/// ```
/// use super_csv::core::cell::CellValue;
/// use super_csv::item::csv::csv_map_reader::CsvMapReaderBuilder;
///
/// let reader = CsvMapReaderBuilder::new().from_reader("id,name,notes\n1,Ada,x\n".as_bytes());
/// reader.read_header(true).unwrap();
///
/// let row = reader.read_map(&[Some("id"), Some("name"), None]).unwrap().unwrap();
/// assert_eq!(row.get("name"), Some(&CellValue::from("Ada")));
/// assert!(!row.contains_key("notes"));
/// ```
pub struct CsvMapReader<R> {
    inner: CsvListReader<R>,
}

impl<R: BufRead> CsvMapReader<R> {
    pub fn read_header(&self, first_record_check: bool) -> CsvResult<Option<Vec<String>>> {
        self.inner.read_header(first_record_check)
    }

    /// Reads the next record as text, keyed by `name_mapping`.
    pub fn read_map(&self, name_mapping: &[Option<&str>]) -> CsvResult<Option<HashMap<String, CellValue>>> {
        check_name_mapping(name_mapping)?;
        let Some(cells) = self.inner.read()? else {
            return Ok(None);
        };
        let values: Vec<CellValue> = cells.into_iter().map(CellValue::from).collect();
        self.to_map(name_mapping, values).map(Some)
    }

    /// Reads the next record through one chain per column, keyed by `name_mapping`.
    pub fn read_map_with(
        &self,
        name_mapping: &[Option<&str>],
        processors: &[Chain],
    ) -> CsvResult<Option<HashMap<String, CellValue>>> {
        check_name_mapping(name_mapping)?;
        match self.inner.read_with(processors)? {
            Some(values) => self.to_map(name_mapping, values).map(Some),
            None => Ok(None),
        }
    }

    pub fn header(&self) -> Option<Rc<Header>> {
        self.inner.header()
    }

    pub fn line_number(&self) -> usize {
        self.inner.line_number()
    }

    pub fn row_number(&self) -> usize {
        self.inner.row_number()
    }

    pub fn untokenized_row(&self) -> String {
        self.inner.untokenized_row()
    }

    pub fn length(&self) -> usize {
        self.inner.length()
    }

    fn to_map(
        &self,
        name_mapping: &[Option<&str>],
        values: Vec<CellValue>,
    ) -> CsvResult<HashMap<String, CellValue>> {
        if values.len() != name_mapping.len() {
            let record = CsvContext::new(self.inner.line_number(), self.inner.row_number(), 0);
            return Err(CsvError::column_count(name_mapping.len(), values.len(), &record));
        }

        Ok(name_mapping
            .iter()
            .zip(values)
            .filter_map(|(name, value)| name.map(|name| (name.to_string(), value)))
            .collect())
    }
}

impl<R: BufRead> ItemReader<HashMap<String, CellValue>> for CsvMapReader<R> {
    /// Reads the next row keyed by the header, which is read first if needed.
    fn read(&self) -> ItemReaderResult<HashMap<String, CellValue>> {
        if self.inner.header().is_none() && self.inner.read_header(true)?.is_none() {
            return Ok(None);
        }
        let (Some(row), Some(header)) = (self.inner.read_row()?, self.inner.header()) else {
            return Ok(None);
        };
        let names: Vec<Option<&str>> = header.names().iter().map(|name| Some(name.as_str())).collect();
        self.to_map(&names, row.into_values()).map(Some)
    }
}

fn check_name_mapping(name_mapping: &[Option<&str>]) -> CsvResult<()> {
    let mut seen = HashSet::new();
    for name in name_mapping.iter().flatten() {
        if !seen.insert(*name) {
            return Err(CsvError::Configuration(format!(
                "the name mapping contains the duplicate column name '{}'",
                name
            )));
        }
    }
    Ok(())
}

/// Configures a [`CsvMapReader`].
#[derive(Default)]
pub struct CsvMapReaderBuilder {
    inner: CsvListReaderBuilder,
}

impl CsvMapReaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preference(mut self, preference: CsvPreference) -> Self {
        self.inner = self.inner.preference(preference);
        self
    }

    /// One chain per column, used by the [`ItemReader`] implementation.
    pub fn processors(mut self, processors: Vec<Chain>) -> Self {
        self.inner = self.inner.processors(processors);
        self
    }

    pub fn from_reader<R: Read>(self, rdr: R) -> CsvMapReader<BufReader<R>> {
        CsvMapReader {
            inner: self.inner.from_reader(rdr),
        }
    }

    pub fn from_path<P: AsRef<Path>>(self, path: P) -> CsvResult<CsvMapReader<BufReader<File>>> {
        Ok(CsvMapReader {
            inner: self.inner.from_path(path)?,
        })
    }
}
