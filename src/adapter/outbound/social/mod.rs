//! Social platform adapters over the Graph API.

pub mod client;
pub mod dto;
pub mod mapping;
pub mod sync;

pub use client::GraphClient;
pub use sync::SocialSync;
