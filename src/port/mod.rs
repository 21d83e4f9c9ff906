//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     ▼                         ▼                             ▼
//! ┌──────────┐           ┌─────────────┐              ┌─────────────┐
//! │  Square  │           │  Warehouse  │              │   Social    │
//! │ Adapter  │           │  (SQLite)   │              │  Adapters   │
//! └──────────┘           └─────────────┘              └─────────────┘
//! ```

pub mod outbound;
