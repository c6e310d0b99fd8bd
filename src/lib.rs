#![deny(missing_docs)]

//! Core library for the Hacker News summarizer.

/// Environment-driven configuration management.
pub mod config;
/// Article download and main-text extraction.
pub mod extract;
/// Hacker News index and item API client.
pub mod feed;
/// Text-generation provider abstraction and adapters.
pub mod generation;
/// Concurrent ingestion of newest stories into documents.
pub mod ingestion;
/// Structured logging and tracing setup.
pub mod logging;
/// Plain-text and JSON rendering of summaries.
pub mod output;
/// Sequential summarization with per-document failure isolation.
pub mod summary;
