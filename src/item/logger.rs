use std::fmt::Debug;

use log::info;

use crate::core::item::{ItemWriter, ItemWriterResult};

/// Logs every row it is given, for debugging a step.
#[derive(Default)]
pub struct LoggerWriter {}

impl<T> ItemWriter<T> for LoggerWriter
where
    T: Debug,
{
    fn write(&self, item: &T) -> ItemWriterResult {
        info!("Record:{:?}", item);
        Ok(())
    }
}
