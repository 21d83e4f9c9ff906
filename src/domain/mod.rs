//! Storage-agnostic types: the table catalog, cleaned values, synced
//! entities and the read-side summaries.

pub mod aggregate;
pub mod batch;
pub mod entity;
pub mod health;
pub mod money;
pub mod report;
pub mod social;
pub mod table;
pub mod value;
