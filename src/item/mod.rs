#[cfg(feature = "logger")]
/// A writer logging every row, useful for debugging purposes.
pub mod logger;

/// CSV tokenizer, encoder, readers and writers.
pub mod csv;
