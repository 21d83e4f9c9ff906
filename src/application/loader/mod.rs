//! Fixture loading: read, clean and batch-insert CSV files table by table.
//!
//! Tables are loaded in [`LOAD_ORDER`] so every foreign key points at a table
//! that was loaded earlier. Each table is its own transaction: a failure rolls
//! back that table only and the remaining tables are still attempted.

pub mod clean;
pub mod literal;
pub mod reader;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::table::{self, TableSchema, LOAD_ORDER};
use crate::error::{DataError, Result};
use crate::port::outbound::sink::TableSink;

/// How loading one table ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableStatus {
    Loaded { rows_read: usize, inserted: usize },
    MissingFile { path: PathBuf },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableOutcome {
    pub table: &'static str,
    #[serde(flatten)]
    pub status: TableStatus,
}

impl TableOutcome {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        matches!(self.status, TableStatus::Loaded { .. })
    }

    /// Rows present in the file but skipped because their key already existed.
    #[must_use]
    pub fn skipped(&self) -> usize {
        match self.status {
            TableStatus::Loaded { rows_read, inserted } => rows_read.saturating_sub(inserted),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub outcomes: Vec<TableOutcome>,
}

impl LoadSummary {
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    /// A load is successful only when every attempted table loaded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.succeeded() == self.attempted()
    }

    #[must_use]
    pub fn outcome(&self, table: &str) -> Option<&TableOutcome> {
        self.outcomes.iter().find(|o| o.table == table)
    }
}

/// Loads fixture files from a directory into a [`TableSink`].
pub struct DataLoader<S> {
    sink: S,
    data_dir: PathBuf,
}

impl<S: TableSink> DataLoader<S> {
    pub fn new(sink: S, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            sink,
            data_dir: data_dir.into(),
        }
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Load every fixture table in dependency order.
    pub fn load_all(&mut self) -> LoadSummary {
        info!(data_dir = %self.data_dir.display(), tables = LOAD_ORDER.len(), "Starting data load");

        let outcomes = LOAD_ORDER
            .iter()
            .copied()
            .map(|schema| {
                let path = self.data_dir.join(schema.file_name());
                self.load_schema(schema, &path)
            })
            .collect();
        let summary = LoadSummary { outcomes };

        info!(
            succeeded = summary.succeeded(),
            attempted = summary.attempted(),
            "Data load finished"
        );
        summary
    }

    /// Load one named table from `path`.
    ///
    /// # Errors
    /// Returns [`DataError::UnknownTable`] when `table` is not in the catalog.
    pub fn load_table(&mut self, table: &str, path: &Path) -> Result<TableOutcome> {
        let schema =
            table::table(table).ok_or_else(|| DataError::UnknownTable(table.to_string()))?;
        Ok(self.load_schema(schema, path))
    }

    fn load_schema(&mut self, schema: &'static TableSchema, path: &Path) -> TableOutcome {
        let status = if path.is_file() {
            match self.read_and_insert(schema, path) {
                Ok((rows_read, inserted)) => {
                    info!(
                        table = schema.name,
                        rows_read,
                        inserted,
                        skipped = rows_read - inserted.min(rows_read),
                        "Table loaded"
                    );
                    TableStatus::Loaded { rows_read, inserted }
                }
                Err(err) => {
                    warn!(table = schema.name, error = %err, "Table load failed, rolled back");
                    TableStatus::Failed {
                        reason: err.to_string(),
                    }
                }
            }
        } else {
            warn!(table = schema.name, path = %path.display(), "CSV file not found, skipping");
            TableStatus::MissingFile {
                path: path.to_path_buf(),
            }
        };

        TableOutcome {
            table: schema.name,
            status,
        }
    }

    fn read_and_insert(&mut self, schema: &'static TableSchema, path: &Path) -> Result<(usize, usize)> {
        let batch = reader::read_file(schema, path)?;
        info!(table = schema.name, records = batch.len(), file = %path.display(), "Loading table");
        let inserted = self.sink.insert_batch(&batch)?;
        Ok((batch.len(), inserted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::batch::TableBatch;
    use crate::error::Error;

    /// Records batches; fails for the tables it is told to.
    #[derive(Default)]
    struct RecordingSink {
        batches: Vec<TableBatch>,
        fail_on: Vec<&'static str>,
    }

    impl TableSink for RecordingSink {
        fn insert_batch(&mut self, batch: &TableBatch) -> Result<usize> {
            if self.fail_on.contains(&batch.table.name) {
                return Err(Error::Database("FOREIGN KEY constraint failed".into()));
            }
            self.batches.push(batch.clone());
            Ok(batch.len())
        }
    }

    fn write(dir: &Path, table: &str, contents: &str) {
        std::fs::write(dir.join(format!("{table}.csv")), contents).unwrap();
    }

    #[test]
    fn missing_file_fails_only_that_table() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "locations", "location_id,location_name,location_type\n1,Online,online_only\n");
        write(dir.path(), "orders", "order_id,order_date,order_status,subtotal,total_amount\n1,2024-01-02 10:00:00,completed,10,11\n");

        let mut loader = DataLoader::new(RecordingSink::default(), dir.path());
        let summary = loader.load_all();

        assert_eq!(summary.attempted(), LOAD_ORDER.len());
        assert_eq!(summary.succeeded(), 2);
        assert!(!summary.is_success());
        assert!(matches!(
            summary.outcome("customers").unwrap().status,
            TableStatus::MissingFile { .. }
        ));
        assert!(summary.outcome("orders").unwrap().succeeded());

        let loaded: Vec<_> = loader.into_sink().batches.iter().map(|b| b.table.name).collect();
        assert_eq!(loaded, vec!["locations", "orders"]);
    }

    #[test]
    fn tables_are_attempted_in_dependency_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = DataLoader::new(RecordingSink::default(), dir.path());
        let summary = loader.load_all();
        let order: Vec<_> = summary.outcomes.iter().map(|o| o.table).collect();
        let expected: Vec<_> = LOAD_ORDER.iter().map(|t| t.name).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn sink_failure_is_reported_and_later_tables_continue() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "orders", "order_id,order_date,order_status,subtotal,total_amount\n1,2024-01-02,completed,10,11\n");
        write(dir.path(), "payments", "payment_id,order_id,payment_date,amount,payment_method,payment_status,net_amount\n1,1,2024-01-02,11,card,completed,10.5\n");

        let sink = RecordingSink {
            fail_on: vec!["orders"],
            ..Default::default()
        };
        let mut loader = DataLoader::new(sink, dir.path());
        let summary = loader.load_all();

        match &summary.outcome("orders").unwrap().status {
            TableStatus::Failed { reason } => assert!(reason.contains("FOREIGN KEY")),
            other => panic!("unexpected status {other:?}"),
        }
        assert!(summary.outcome("payments").unwrap().succeeded());
    }

    #[test]
    fn bad_value_fails_the_table_before_insert() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "customers", "customer_id,total_orders\n1,many\n");

        let mut loader = DataLoader::new(RecordingSink::default(), dir.path());
        let outcome = loader
            .load_table("customers", &dir.path().join("customers.csv"))
            .unwrap();

        assert!(!outcome.succeeded());
        assert!(loader.into_sink().batches.is_empty());
    }

    #[test]
    fn zero_byte_file_fails_the_table() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "locations", "");

        let mut loader = DataLoader::new(RecordingSink::default(), dir.path());
        let outcome = loader
            .load_table("locations", &dir.path().join("locations.csv"))
            .unwrap();

        match outcome.status {
            TableStatus::Failed { reason } => assert!(reason.contains("no header row")),
            other => panic!("unexpected status {other:?}"),
        }
        assert!(loader.into_sink().batches.is_empty());
    }

    #[test]
    fn unknown_table_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = DataLoader::new(RecordingSink::default(), dir.path());
        let err = loader.load_table("sqlite_master", dir.path()).unwrap_err();
        assert!(matches!(err, Error::Data(DataError::UnknownTable(_))));
    }

    #[test]
    fn skipped_counts_duplicate_rows() {
        let outcome = TableOutcome {
            table: "customers",
            status: TableStatus::Loaded {
                rows_read: 10,
                inserted: 4,
            },
        };
        assert_eq!(outcome.skipped(), 6);
    }
}
