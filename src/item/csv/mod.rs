//! CSV reading and writing.
//!
//! The lower layer turns characters into records and back:
//!
//! - [`tokenizer`] splits a character stream into logical records, handling
//!   quoted fields that span several physical lines,
//! - [`encoder`] decides, cell by cell, whether and how to quote on write.
//!
//! On top of it, readers and writers run each column through its
//! [`Chain`](crate::core::processor::Chain) of cell processors:
//!
//! - [`csv_reader::CsvListReader`] and [`csv_writer::CsvListWriter`] handle rows
//!   as lists of cells,
//! - [`csv_map_reader::CsvMapReader`] and [`csv_map_writer::CsvMapWriter`] handle
//!   rows as maps keyed by column name,
//! - [`row`] maps rows onto user types with explicit [`FromRow`](row::FromRow)
//!   and [`ToRow`](row::ToRow) implementations.
//!
//! Readers and writers are built with builders and implement the
//! [`ItemReader`](crate::core::item::ItemReader) and
//! [`ItemWriter`](crate::core::item::ItemWriter) traits, so they plug into a
//! [`Step`](crate::core::step::Step).
//!
//! A reader or writer owns mutable state (its stream position, and the
//! history of any [`Unique`](crate::processor::Unique) in its chains) and is
//! meant to be used from one thread. Preferences are immutable and can be
//! shared freely.

pub mod encoder;
pub mod row;
pub mod tokenizer;

pub mod csv_map_reader;
pub mod csv_map_writer;
pub mod csv_reader;
pub mod csv_writer;
