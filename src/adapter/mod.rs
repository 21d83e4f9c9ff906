//! Implementations of ports (hexagonal adapters).
//!
//! - [`inbound`] - Driving side: the command-line interface
//! - [`outbound`] - Driven side: SQLite warehouse, Square and Graph API clients

pub mod inbound;
pub mod outbound;
