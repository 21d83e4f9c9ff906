//! Outbound adapters (driven side).

pub mod memory;
pub mod social;
pub mod sqlite;
pub mod square;
