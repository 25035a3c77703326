use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::context::CsvContext;

/// Rule deciding when a written cell is quoted even though its content does
/// not require it.
///
/// Content that contains the delimiter, the quote character or a line
/// terminator is always quoted, whatever the mode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "columns")]
pub enum QuoteMode {
    /// Quote only when the content requires it.
    #[default]
    Normal,
    /// Quote every non-null cell.
    Always,
    /// Quote every non-null cell of the given 1-based columns.
    Columns(BTreeSet<usize>),
}

impl QuoteMode {
    pub fn columns(columns: impl IntoIterator<Item = usize>) -> Self {
        QuoteMode::Columns(columns.into_iter().collect())
    }

    /// Whether the cell at `context` must be quoted regardless of its content.
    pub fn quotes_required(&self, context: &CsvContext) -> bool {
        match self {
            QuoteMode::Normal => false,
            QuoteMode::Always => true,
            QuoteMode::Columns(columns) => columns.contains(&context.column_number),
        }
    }
}
