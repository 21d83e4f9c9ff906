//! closet-sync - business data warehouse for a small vintage clothing shop.
//!
//! Square point-of-sale data (locations, customers, catalog, orders) and
//! Instagram/Facebook engagement are synchronized into a SQLite warehouse.
//! CSV fixtures can be generated and bulk-loaded into the same warehouse.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - [`domain`] - Table catalog, cleaned values, synced entities, summaries
//! - [`port`] - Traits the application depends on (warehouse, sink, report, sync)
//! - [`application`] - Fixture loader and generator, sync orchestration, scheduler
//! - [`adapter`] - SQLite, Square and Graph API adapters plus the CLI
//! - [`infrastructure`] - Settings, logging and the composition root
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use closet_sync::adapter::outbound::sqlite::SqliteTableSink;
//! use closet_sync::application::loader::DataLoader;
//! use closet_sync::infrastructure::bootstrap::open_warehouse;
//! use closet_sync::infrastructure::config::settings::Settings;
//!
//! let settings = Settings::from_env()?;
//! let pool = open_warehouse(&settings.database)?;
//! let conn = pool.get().expect("connection");
//! let summary = DataLoader::new(SqliteTableSink::new(conn), "data").load_all();
//! println!("{}/{} tables loaded", summary.succeeded(), summary.attempted());
//! # Ok::<(), closet_sync::error::Error>(())
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;
