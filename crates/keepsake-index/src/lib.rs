//! Record indexes for Keepsake.
//!
//! This crate provides two independent indexes over the same record store:
//! - `RingIndex`: circular doubly-linked list for round-robin scans
//! - `PriceTree`: AVL tree keyed by price for range queries
//!
//! Both hold `RecordId`s only. The `RecordStore` in `keepsake-common` owns
//! the records themselves.

mod price_tree;
mod ring;

pub use price_tree::{PriceTree, RotationStats};
pub use ring::{RingIndex, RingIter};
