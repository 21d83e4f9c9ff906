//! Cleaned rows for one table, ready to insert.

use super::table::{Column, TableSchema};
use super::value::CellValue;

#[derive(Debug, Clone, PartialEq)]
pub struct TableBatch {
    pub table: &'static TableSchema,
    /// Columns present in the source, in source order.
    pub columns: Vec<&'static Column>,
    /// One entry per source row, aligned with `columns`.
    pub rows: Vec<Vec<CellValue>>,
}

impl TableBatch {
    #[must_use]
    pub fn new(table: &'static TableSchema, columns: Vec<&'static Column>) -> Self {
        Self {
            table,
            columns,
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `column` in row `index`, if both exist.
    #[must_use]
    pub fn value(&self, index: usize, column: &str) -> Option<&CellValue> {
        let position = self.columns.iter().position(|c| c.name == column)?;
        self.rows.get(index)?.get(position)
    }
}
