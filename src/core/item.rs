use crate::error::CsvError;

/// Represents the result of reading an item from the reader.
///
/// - `Ok(Some(item))` when a row was read
/// - `Ok(None)` at the end of the stream
/// - `Err(error)` when the row could not be read or processed
pub type ItemReaderResult<R> = Result<Option<R>, CsvError>;

/// Represents the result of processing an item by the processor.
pub type ItemProcessorResult<W> = Result<W, CsvError>;

/// Represents the result of writing an item by the writer.
pub type ItemWriterResult = Result<(), CsvError>;

/// A source of rows, read one at a time.
pub trait ItemReader<R> {
    fn read(&self) -> ItemReaderResult<R>;
}

/// Turns a row read by an [`ItemReader`] into the row handed to an [`ItemWriter`].
pub trait ItemProcessor<R, W> {
    fn process(&self, item: &R) -> ItemProcessorResult<W>;
}

/// A destination of rows, written one at a time.
pub trait ItemWriter<W> {
    fn write(&self, item: &W) -> ItemWriterResult;

    fn flush(&self) -> ItemWriterResult {
        Ok(())
    }
}

/// Passes items through unchanged.
#[derive(Default)]
pub struct DefaultProcessor;

impl<R: Clone> ItemProcessor<R, R> for DefaultProcessor {
    fn process(&self, item: &R) -> ItemProcessorResult<R> {
        Ok(item.clone())
    }
}
