//! SQLite persistence adapters.
//!
//! The warehouse repository used by the sync adapters, the bulk sink used
//! by the fixture loader and the read-side report, all on Diesel.

pub mod bulk;
pub mod database;
pub mod report;
pub mod warehouse;

pub use bulk::SqliteTableSink;
pub use report::SqliteReport;
pub use warehouse::SqliteWarehouse;
