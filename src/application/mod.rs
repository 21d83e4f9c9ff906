//! Application services (use cases).
//!
//! Fixture loading and generation, and the cross-platform sync orchestration.
//! Services here talk to storage and remote APIs only through the ports.

pub mod fixture;
pub mod loader;
pub mod sync;
