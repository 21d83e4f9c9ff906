//! Bulk insertion port used by the fixture loader.

use crate::domain::batch::TableBatch;
use crate::error::Result;

/// Destination for cleaned fixture batches.
pub trait TableSink {
    /// Insert every row of `batch` in a single transaction.
    ///
    /// Rows that collide with an existing unique key are skipped silently.
    /// Any other failure rolls the whole batch back. Returns the number of
    /// rows actually inserted.
    fn insert_batch(&mut self, batch: &TableBatch) -> Result<usize>;
}
