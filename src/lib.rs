#![deny(missing_docs)]

//! Core library for turning subject-matter PDFs into a searchable heading store.

/// Environment-driven configuration management.
pub mod config;
/// Font-size based heading extraction from PDF layouts.
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Ingestion metrics helpers.
pub mod metrics;
/// Chunking, flattening, and the knowledge service.
pub mod processing;
/// Search engine integration.
pub mod search;
/// Global heading store and persistence.
pub mod store;
