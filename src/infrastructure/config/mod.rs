//! Environment-driven configuration.

pub mod logging;
pub mod settings;
