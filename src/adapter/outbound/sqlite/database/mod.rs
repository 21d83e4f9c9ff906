//! SQLite database modules.
//!
//! Connection pooling with the warehouse pragmas, the embedded schema
//! migrations, Diesel table definitions and row types.

pub mod connection;
pub mod model;
pub mod schema;
