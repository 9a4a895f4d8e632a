//! Recommendation catalog for Keepsake.
//!
//! This crate provides:
//! - `Catalog`: owns the record store, the ring and the price tree, and
//!   routes each recommendation to the index that fits the query
//! - `SharedCatalog`: `RwLock`-guarded handle for multi-threaded callers
//!
//! ```text
//! add(...) -> store -> RingIndex.insert
//!                   -> PriceTree.insert
//!
//! recommend(count, category, min, max)
//!   min & max given -> PriceTree.range_query -> category filter ┐
//!   otherwise       -> RingIndex.scan(count, category) ─────────┤
//!                                       sort by rating desc, take count
//! ```

mod catalog;
mod shared;

pub use catalog::Catalog;
pub use keepsake_common::{
    CatalogConfig, KeepsakeError, Record, RecordId, RemovalPolicy, Result,
};
pub use shared::SharedCatalog;
