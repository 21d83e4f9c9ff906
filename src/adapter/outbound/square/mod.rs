//! Square point-of-sale adapter: locations, customers, catalog and orders.

pub mod client;
pub mod dto;
pub mod mapping;
pub mod sync;

pub use client::SquareClient;
pub use sync::SquareSync;
