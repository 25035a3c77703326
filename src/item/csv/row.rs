//! Header lookup and explicit row-to-struct mapping.
//!
//! Rows are bound to user types by hand-written [`FromRow`] / [`ToRow`]
//! implementations. The mapping is ordinary code, checked by the compiler,
//! and sits on top of the reader and writer without changing them.

use std::{collections::HashMap, rc::Rc};

use crate::{
    core::cell::CellValue,
    error::{CsvError, CsvResult},
};

/// Column names and their positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Header {
    /// Builds a header; when a name repeats, lookups return its first position.
    pub fn new(names: Vec<String>) -> Self {
        let mut positions = HashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            positions.entry(name.clone()).or_insert(index);
        }
        Self { names, positions }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// 0-based position of a column.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Name of the column at a 0-based position.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }
}

/// A processed row, optionally bound to the header it was read under.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<CellValue>,
    header: Option<Rc<Header>>,
    row_number: usize,
}

impl Row {
    pub fn new(values: Vec<CellValue>, header: Option<Rc<Header>>, row_number: usize) -> Self {
        Self {
            values,
            header,
            row_number,
        }
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<CellValue> {
        self.values
    }

    pub fn header(&self) -> Option<&Header> {
        self.header.as_deref()
    }

    pub fn row_number(&self) -> usize {
        self.row_number
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at a 0-based position.
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.values.get(index)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&CellValue> {
        self.header
            .as_ref()
            .and_then(|header| header.position(name))
            .and_then(|index| self.values.get(index))
    }

    /// Like [`Row::get_by_name`], failing when the header has no such column.
    pub fn require(&self, name: &str) -> CsvResult<&CellValue> {
        self.get_by_name(name).ok_or_else(|| {
            CsvError::Configuration(format!(
                "row {} has no column named '{}'",
                self.row_number, name
            ))
        })
    }
}

/// Builds a value from a processed row.
///
/// # Examples
///
/// ```
/// use super_csv::core::cell::CellValue;
/// use super_csv::item::csv::row::{FromRow, Row};
/// use super_csv::CsvResult;
///
/// struct City {
///     name: String,
///     population: i64,
/// }
///
/// impl FromRow for City {
///     fn from_row(row: &Row) -> CsvResult<Self> {
///         Ok(City {
///             name: row.require("name")?.to_string(),
///             population: row.require("population")?.as_integer().unwrap_or_default(),
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> CsvResult<Self>;
}

/// Flattens a value into the cells of a row, in column order.
pub trait ToRow {
    fn to_row(&self) -> Vec<CellValue>;
}
