//! Bulk fixture insertion.
//!
//! Rows go in as multi-row `INSERT ... ON CONFLICT DO NOTHING` statements of
//! [`PAGE_SIZE`] rows, all inside one transaction per batch. Column names come
//! from the table catalog only; values are always bound.

use std::ops::DerefMut;

use diesel::connection::Connection;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_types::{BigInt, Bool, Nullable, Text};
use diesel::sqlite::Sqlite;
use diesel::{RunQueryDsl, SqliteConnection};
use tracing::debug;

use crate::adapter::outbound::sqlite::database::connection::DbConnection;
use crate::domain::batch::TableBatch;
use crate::domain::value::CellValue;
use crate::error::{Error, Result};
use crate::port::outbound::sink::TableSink;

/// Rows per INSERT statement.
pub const PAGE_SIZE: usize = 100;

/// [`TableSink`] writing batches into SQLite.
pub struct SqliteTableSink<C = DbConnection> {
    conn: C,
}

impl<C> SqliteTableSink<C>
where
    C: DerefMut<Target = SqliteConnection>,
{
    #[must_use]
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

impl<C> TableSink for SqliteTableSink<C>
where
    C: DerefMut<Target = SqliteConnection>,
{
    fn insert_batch(&mut self, batch: &TableBatch) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let table = batch.table.name;
        let columns = batch
            .columns
            .iter()
            .map(|column| column.name)
            .collect::<Vec<_>>()
            .join(", ");
        let width = batch.columns.len();

        self.conn.transaction::<_, Error, _>(|conn| {
            let mut inserted = 0;
            for (index, page) in batch.rows.chunks(PAGE_SIZE).enumerate() {
                let count = insert_page(conn, table, &columns, width, page)?;
                debug!(table, page = index + 1, rows = page.len(), inserted = count, "Page inserted");
                inserted += count;
            }
            Ok(inserted)
        })
    }
}

fn insert_page(
    conn: &mut SqliteConnection,
    table: &str,
    columns: &str,
    width: usize,
    rows: &[Vec<CellValue>],
) -> Result<usize> {
    let placeholders = format!("({})", vec!["?"; width].join(", "));
    let values = vec![placeholders; rows.len()].join(", ");
    let sql = format!("INSERT INTO {table} ({columns}) VALUES {values} ON CONFLICT DO NOTHING");

    let mut query = diesel::sql_query(sql).into_boxed::<Sqlite>();
    for row in rows {
        for cell in row {
            query = bind_cell(query, cell);
        }
    }
    Ok(query.execute(conn)?)
}

fn bind_cell(
    query: BoxedSqlQuery<'static, Sqlite, SqlQuery>,
    cell: &CellValue,
) -> BoxedSqlQuery<'static, Sqlite, SqlQuery> {
    match cell {
        CellValue::Bool(value) => query.bind::<Bool, _>(*value),
        CellValue::Integer(value) => query.bind::<BigInt, _>(*value),
        other => query.bind::<Nullable<Text>, _>(other.storage_text()),
    }
}
