//! Infrastructure layer.
//!
//! Configuration, logging set-up and the composition root that wires
//! adapters into the application services.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Settings loading, validation and logging

pub mod bootstrap;
pub mod config;
