//! Row-at-a-time copy loop with a skip policy.
//!
//! A [`Step`] pulls rows from an [`ItemReader`], hands them to an
//! [`ItemProcessor`] and pushes the results to an [`ItemWriter`]. Rows
//! failing with a row-recoverable error (see [`CsvError::is_row_recoverable`])
//! are skipped until more than `skip_limit` of them were seen; any other
//! error stops the step.

use std::{
    cell::Cell,
    time::{Duration, Instant},
};

use log::{debug, error, info, warn};

use crate::error::{CsvError, CsvResult};

use super::item::{DefaultProcessor, ItemProcessor, ItemReader, ItemWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Success,
    Error,
}

#[derive(Debug)]
pub struct StepResult {
    pub start: Instant,
    pub end: Instant,
    pub duration: Duration,
    pub status: StepStatus,
    pub read_count: usize,
    pub write_count: usize,
    pub skip_count: usize,
    /// The error that stopped the step, if any.
    pub error: Option<CsvError>,
}

/// Copies rows from a reader to a writer.
///
/// # Examples
///
/// ```
/// use super_csv::core::processor::Chain;
/// use super_csv::core::step::{StepBuilder, StepStatus};
/// use super_csv::item::csv::csv_reader::CsvListReaderBuilder;
/// use super_csv::item::csv::csv_writer::CsvListWriterBuilder;
/// use super_csv::prefs::CsvPreference;
/// use super_csv::processor::ParseInt;
///
/// let reader = CsvListReaderBuilder::new()
///     .preference(CsvPreference::excel())
///     .has_headers(true)
///     .processors(vec![Chain::new(), Chain::new().then(ParseInt::new())])
///     .from_reader("name,age\nAda,36\nBob,??\nEve,29\n".as_bytes());
/// let writer = CsvListWriterBuilder::new()
///     .preference(CsvPreference::excel())
///     .from_writer(Vec::new());
///
/// let step = StepBuilder::new()
///     .reader(&reader)
///     .writer(&writer)
///     .skip_limit(1)
///     .build()
///     .unwrap();
/// let result = step.execute();
///
/// assert_eq!(result.status, StepStatus::Success);
/// assert_eq!((result.read_count, result.write_count, result.skip_count), (2, 2, 1));
/// drop(step);
/// assert_eq!(String::from_utf8(writer.into_inner().unwrap()).unwrap(), "Ada,36\nEve,29\n");
/// ```
pub struct Step<'a, R, W> {
    reader: &'a dyn ItemReader<R>,
    processor: &'a dyn ItemProcessor<R, W>,
    writer: &'a dyn ItemWriter<W>,
    skip_limit: usize,
    read_count: Cell<usize>,
    write_count: Cell<usize>,
    skip_count: Cell<usize>,
}

impl<R, W> Step<'_, R, W> {
    pub fn execute(&self) -> StepResult {
        let start = Instant::now();
        info!("Start of step");

        let outcome = self.run().and_then(|_| self.writer.flush());
        let (status, error) = match outcome {
            Ok(()) => (StepStatus::Success, None),
            Err(err) => {
                error!("Step stopped: {}", err);
                (StepStatus::Error, Some(err))
            }
        };

        info!(
            "End of step: {:?}, {} read, {} written, {} skipped",
            status,
            self.read_count.get(),
            self.write_count.get(),
            self.skip_count.get()
        );

        StepResult {
            start,
            end: Instant::now(),
            duration: start.elapsed(),
            status,
            read_count: self.read_count.get(),
            write_count: self.write_count.get(),
            skip_count: self.skip_count.get(),
            error,
        }
    }

    fn run(&self) -> CsvResult<()> {
        loop {
            let item = match self.reader.read() {
                Ok(Some(item)) => item,
                Ok(None) => return Ok(()),
                Err(err) => {
                    self.skip(err)?;
                    continue;
                }
            };
            self.read_count.set(self.read_count.get() + 1);

            let written = self
                .processor
                .process(&item)
                .and_then(|processed| self.writer.write(&processed));
            match written {
                Ok(()) => self.write_count.set(self.write_count.get() + 1),
                Err(err) => self.skip(err)?,
            }
        }
    }

    /// Counts a skipped row, or gives the error back when it cannot be skipped.
    fn skip(&self, err: CsvError) -> CsvResult<()> {
        if !err.is_row_recoverable() {
            return Err(err);
        }
        self.skip_count.set(self.skip_count.get() + 1);
        if self.skip_count.get() > self.skip_limit {
            return Err(err);
        }
        warn!("Skipping row: {}", err);
        Ok(())
    }
}

pub struct StepBuilder<'a, R, W> {
    reader: Option<&'a dyn ItemReader<R>>,
    processor: Option<&'a dyn ItemProcessor<R, W>>,
    writer: Option<&'a dyn ItemWriter<W>>,
    skip_limit: usize,
}

impl<R, W> Default for StepBuilder<'_, R, W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, R, W> StepBuilder<'a, R, W> {
    pub fn new() -> Self {
        Self {
            reader: None,
            processor: None,
            writer: None,
            skip_limit: 0,
        }
    }

    pub fn reader(mut self, reader: &'a impl ItemReader<R>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn processor(mut self, processor: &'a impl ItemProcessor<R, W>) -> Self {
        self.processor = Some(processor);
        self
    }

    pub fn writer(mut self, writer: &'a impl ItemWriter<W>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Number of rows that may be skipped before the step fails.
    pub fn skip_limit(mut self, skip_limit: usize) -> Self {
        self.skip_limit = skip_limit;
        self
    }

    pub fn build(self) -> CsvResult<Step<'a, R, W>>
    where
        DefaultProcessor: ItemProcessor<R, W>,
    {
        let default_processor = &DefaultProcessor;
        let reader = self
            .reader
            .ok_or_else(|| CsvError::Configuration("a step needs a reader".to_string()))?;
        let writer = self
            .writer
            .ok_or_else(|| CsvError::Configuration("a step needs a writer".to_string()))?;
        debug!("Step built with skip limit {}", self.skip_limit);

        Ok(Step {
            reader,
            processor: self.processor.unwrap_or(default_processor),
            writer,
            skip_limit: self.skip_limit,
            read_count: Cell::new(0),
            write_count: Cell::new(0),
            skip_count: Cell::new(0),
        })
    }
}
