use std::{
    collections::HashMap,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{
    core::{
        cell::CellValue,
        item::{ItemWriter, ItemWriterResult},
        processor::Chain,
    },
    error::{CsvError, CsvResult},
    prefs::CsvPreference,
};

use super::csv_writer::{CsvListWriter, CsvListWriterBuilder};

/// Writes maps as CSV records, in the column order of a name mapping.
///
/// Keys missing from a map are written as null.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use super_csv::core::cell::CellValue;
/// use super_csv::item::csv::csv_map_writer::CsvMapWriterBuilder;
/// use super_csv::prefs::CsvPreference;
///
/// let writer = CsvMapWriterBuilder::new()
///     .preference(CsvPreference::excel())
///     .from_writer(Vec::new());
/// let columns = ["id", "name"];
///
/// writer.write_header(&columns).unwrap();
/// let row = HashMap::from([("name".to_string(), CellValue::from("Ada"))]);
/// writer.write_map(&row, &columns).unwrap();
///
/// let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(output, "id,name\n,Ada\n");
/// ```
pub struct CsvMapWriter<W: Write> {
    inner: CsvListWriter<W>,
}

impl<W: Write> CsvMapWriter<W> {
    pub fn write_header<S: AsRef<str>>(&self, names: &[S]) -> CsvResult<()> {
        self.inner.write_header(names)
    }

    /// Writes the values of `map` named by `name_mapping`, in that order.
    pub fn write_map<S: AsRef<str>>(&self, map: &HashMap<String, CellValue>, name_mapping: &[S]) -> CsvResult<()> {
        self.inner.write(&values_of(map, name_mapping))
    }

    /// Like [`CsvMapWriter::write_map`], running each value through the chain of its column.
    pub fn write_map_with<S: AsRef<str>>(
        &self,
        map: &HashMap<String, CellValue>,
        name_mapping: &[S],
        processors: &[Chain],
    ) -> CsvResult<()> {
        self.inner
            .write_with(&values_of(map, name_mapping), processors)
    }

    pub fn write_comment(&self, comment: &str) -> CsvResult<()> {
        self.inner.write_comment(comment)
    }

    pub fn flush(&self) -> CsvResult<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> CsvResult<W> {
        self.inner.into_inner()
    }

    pub fn line_number(&self) -> usize {
        self.inner.line_number()
    }

    pub fn row_number(&self) -> usize {
        self.inner.row_number()
    }
}

fn values_of<S: AsRef<str>>(map: &HashMap<String, CellValue>, name_mapping: &[S]) -> Vec<CellValue> {
    name_mapping
        .iter()
        .map(|name| map.get(name.as_ref()).cloned().unwrap_or_default())
        .collect()
}

impl<W: Write> ItemWriter<HashMap<String, CellValue>> for CsvMapWriter<W> {
    /// Writes the map in the order of the header given to the builder.
    fn write(&self, item: &HashMap<String, CellValue>) -> ItemWriterResult {
        self.inner.write_pending_header()?;
        let Some(header) = self.inner.header() else {
            return Err(CsvError::Configuration(
                "a header is required to write maps as items".to_string(),
            ));
        };
        let values = values_of(item, header.names());
        ItemWriter::write(&self.inner, &values)
    }

    fn flush(&self) -> ItemWriterResult {
        self.inner.flush()
    }
}

/// Configures a [`CsvMapWriter`].
#[derive(Default)]
pub struct CsvMapWriterBuilder {
    inner: CsvListWriterBuilder,
}

impl CsvMapWriterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preference(mut self, preference: CsvPreference) -> Self {
        self.inner = self.inner.preference(preference);
        self
    }

    pub fn processors(mut self, processors: Vec<Chain>) -> Self {
        self.inner = self.inner.processors(processors);
        self
    }

    /// Header written before the first row; it also orders the maps written as items.
    pub fn header(mut self, names: Vec<String>) -> Self {
        self.inner = self.inner.header(names);
        self
    }

    pub fn from_writer<W: Write>(self, wtr: W) -> CsvMapWriter<W> {
        CsvMapWriter {
            inner: self.inner.from_writer(wtr),
        }
    }

    pub fn from_path<P: AsRef<Path>>(self, path: P) -> CsvResult<CsvMapWriter<BufWriter<File>>> {
        Ok(CsvMapWriter {
            inner: self.inner.from_path(path)?,
        })
    }
}
