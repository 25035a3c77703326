#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # Super CSV for Rust

 A CSV library built around two ideas: a tokenizer and an encoder that get
 quoting exactly right, and a per-column pipeline of **cell processors** that
 convert and validate every cell on its way in or out.

 ## Core Concepts

- **CsvPreference:** the immutable dialect: quote character, delimiter,
  end-of-line symbols, comment matcher, quoting policy and a few behaviour
  switches. Presets cover the usual conventions.
- **Tokenizer / Encoder:** turn a character stream into records and records
  back into text. A quoted field may contain delimiters, quotes and line
  breaks.
- **Cell processors:** small stages (`ParseInt`, `Optional`, `LMinMax`,
  `Unique`, `FmtDate`...) composed into one `Chain` per column. A chain stops
  at the first failure, which is reported with the row, line and column.
- **Readers and writers:** list and map flavours, implementing the
  `ItemReader` / `ItemWriter` traits.
- **Step:** copies rows from a reader to a writer, skipping rows that fail
  a cell processor up to a limit.

 ## Features

| **Feature**   | **Description**                                               |
|---------------|---------------------------------------------------------------|
| logger        | Enables a logger `ItemWriter`, useful for debugging purposes  |
| full          | Enables all available features                                |

 ## Getting Started

```rust
use super_csv::{
    core::{cell::CellValue, processor::Chain},
    item::csv::{csv_reader::CsvListReaderBuilder, csv_writer::CsvListWriterBuilder},
    prefs::CsvPreference,
    processor::{FmtNumber, LMinMax, NotNull, Optional, ParseDouble, ParseInt, Unique},
    CsvError,
};

fn main() -> Result<(), CsvError> {
    let csv = "id,name,age,score
1,\"Lovelace, Ada\",36,97.5
2,Bob,,81
";

    let reader = CsvListReaderBuilder::new()
        .preference(CsvPreference::excel())
        .from_reader(csv.as_bytes());
    reader.read_header(true)?;

    let read_processors = vec![
        Chain::new().then(ParseInt::new()).then(Unique::new()),
        Chain::new().then(NotNull::new()),
        Chain::new().then(Optional::new()).then(ParseInt::new()).then(LMinMax::new(0, 150)?),
        Chain::new().then(ParseDouble::new()),
    ];
    let write_processors = vec![
        Chain::new(),
        Chain::new(),
        Chain::new(),
        Chain::new().then(FmtNumber::new(1)),
    ];

    let writer = CsvListWriterBuilder::new()
        .preference(CsvPreference::excel_north_europe())
        .from_writer(Vec::new());
    writer.write_header(&["id", "name", "age", "score"])?;

    while let Some(row) = reader.read_with(&read_processors)? {
        writer.write_with(&row, &write_processors)?;
    }

    let output = String::from_utf8(writer.into_inner()?).unwrap();
    assert_eq!(output, "id;name;age;score\n1;Lovelace, Ada;36;97.5\n2;Bob;;81.0\n");
    Ok(())
}
```

 ## Errors

 Every failure is a [`CsvError`]. Failures raised while a row is handled
 carry a [`core::context::CsvContext`] with the row number, the physical line
 and the column. Cell processor failures only concern their row:
 [`CsvError::is_row_recoverable`] tells whether reading may go on.
 */

/// Core abstractions: cell values, contexts, processors, item traits and the step loop
pub mod core;

/// Error types
pub mod error;

#[doc(inline)]
pub use error::*;

/// CSV readers and writers, and other item writers
pub mod item;

/// CSV dialects
pub mod prefs;

/// Built-in cell processors
pub mod processor;
