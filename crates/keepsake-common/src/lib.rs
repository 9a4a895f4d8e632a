//! Keepsake common types, errors, and configuration.
//!
//! This crate provides shared definitions used across all Keepsake components.

pub mod config;
pub mod error;
pub mod record;

pub use config::{CatalogConfig, RemovalPolicy};
pub use error::{KeepsakeError, Result};
pub use record::{Record, RecordId, RecordStore};
