//! Catalog records and the store that owns them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Identifier of a catalog record. Allocated from 1 and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl RecordId {
    /// First id handed out by a catalog.
    pub const FIRST: RecordId = RecordId(1);

    /// Returns the id that follows this one.
    #[inline]
    pub fn next(self) -> RecordId {
        RecordId(self.0 + 1)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One catalog item. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub rating: f64,
    pub tags: BTreeSet<String>,
    pub stock: u32,
}

impl Record {
    /// Returns true if the record passes an optional exact-match category filter.
    #[inline]
    pub fn matches_category(&self, category: Option<&str>) -> bool {
        category.is_none_or(|c| self.category == c)
    }

    /// Returns true if `min <= price <= max`.
    #[inline]
    pub fn price_within(&self, min: f64, max: f64) -> bool {
        min <= self.price && self.price <= max
    }
}

struct StoreSlot {
    record: Arc<Record>,
    retired: bool,
}

/// Canonical owner of every record added to a catalog.
///
/// Slots are addressed by `id - 1`, so ids must be inserted densely starting
/// at `RecordId::FIRST`. Slots are never freed: a record removed from the
/// ring is only flagged as retired, because the price tree can still point
/// at it.
pub struct RecordStore {
    slots: Vec<StoreSlot>,
}

impl RecordStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Creates an empty store with room for `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Returns the id the next inserted record must carry.
    #[inline]
    pub fn next_id(&self) -> RecordId {
        RecordId(self.slots.len() as u64 + 1)
    }

    /// Appends a record under `next_id()` and returns the shared handle.
    ///
    /// The store owns id allocation: whatever id `record` carries is
    /// replaced, so ids stay dense.
    pub fn insert(&mut self, mut record: Record) -> Arc<Record> {
        record.id = self.next_id();
        let record = Arc::new(record);
        self.slots.push(StoreSlot {
            record: Arc::clone(&record),
            retired: false,
        });
        record
    }

    #[inline]
    fn slot(&self, id: RecordId) -> Option<&StoreSlot> {
        let idx = id.0.checked_sub(1)?;
        self.slots.get(usize::try_from(idx).ok()?)
    }

    /// Gets a record by id, retired or not.
    #[inline]
    pub fn get(&self, id: RecordId) -> Option<&Arc<Record>> {
        self.slot(id).map(|s| &s.record)
    }

    /// Gets a record by id only if it has not been retired.
    #[inline]
    pub fn get_active(&self, id: RecordId) -> Option<&Arc<Record>> {
        self.slot(id).filter(|s| !s.retired).map(|s| &s.record)
    }

    /// Flags a record as retired. Returns false if the id is unknown or
    /// already retired.
    pub fn retire(&mut self, id: RecordId) -> bool {
        let Some(idx) = id.0.checked_sub(1).and_then(|i| usize::try_from(i).ok()) else {
            return false;
        };
        match self.slots.get_mut(idx) {
            Some(slot) if !slot.retired => {
                slot.retired = true;
                true
            }
            _ => false,
        }
    }

    /// Returns true if the record exists and is retired.
    #[inline]
    pub fn is_retired(&self, id: RecordId) -> bool {
        self.slot(id).is_some_and(|s| s.retired)
    }

    /// Total number of records ever inserted.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}
