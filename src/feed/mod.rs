//! Hacker News feed access: the newest-stories index and per-item metadata.

mod client;
pub mod types;

pub use client::FeedClient;
pub use types::{FeedError, ItemDetails, ItemId};
