//! Catalog facade over the ring and price indexes.

use keepsake_common::{CatalogConfig, Record, RecordId, RecordStore, RemovalPolicy};
use keepsake_index::{PriceTree, RingIndex};
use std::sync::Arc;
use tracing::debug;

/// Which index answered a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryPath {
    /// Round-robin walk of the ring.
    Ring,
    /// Price range query on the tree.
    PriceRange,
}

/// In-memory catalog keeping a ring and a price tree over one record store.
///
/// Every `add` touches both indexes. `remove` only unlinks from the ring
/// and retires the record; with `RemovalPolicy::Symmetric` price queries
/// skip retired records, with `RingOnly` they keep returning them.
pub struct Catalog {
    config: CatalogConfig,
    store: RecordStore,
    ring: RingIndex,
    prices: PriceTree,
}

impl Catalog {
    /// Creates an empty catalog with default configuration.
    pub fn new() -> Self {
        Self::with_config(CatalogConfig::default())
    }

    /// Creates an empty catalog.
    pub fn with_config(config: CatalogConfig) -> Self {
        let capacity = config.initial_capacity;
        Self {
            config,
            store: RecordStore::with_capacity(capacity),
            ring: RingIndex::with_capacity(capacity),
            prices: PriceTree::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Number of records currently in the ring.
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    #[inline]
    pub fn ring(&self) -> &RingIndex {
        &self.ring
    }

    #[inline]
    pub fn price_tree(&self) -> &PriceTree {
        &self.prices
    }

    /// Id the next `add` will assign.
    #[inline]
    pub fn next_id(&self) -> RecordId {
        self.store.next_id()
    }

    /// Creates a record with the next id and links it into both indexes.
    pub fn add<S>(
        &mut self,
        name: impl Into<String>,
        category: impl Into<String>,
        price: f64,
        rating: f64,
        tags: impl IntoIterator<Item = S>,
        stock: u32,
    ) -> Arc<Record>
    where
        S: Into<String>,
    {
        let record = self.store.insert(Record {
            id: self.store.next_id(),
            name: name.into(),
            category: category.into(),
            price,
            rating,
            tags: tags.into_iter().map(Into::into).collect(),
            stock,
        });

        self.ring.insert(record.id);
        self.prices.insert(record.price, record.id);

        debug!(
            id = %record.id,
            category = %record.category,
            price = record.price,
            "added record"
        );
        record
    }

    /// Removes a record from the ring.
    ///
    /// Returns None if the id is not in the ring. The price tree is never
    /// modified; the record is retired in the store either way.
    pub fn remove(&mut self, id: RecordId) -> Option<Arc<Record>> {
        let Some(removed) = self.ring.remove(id) else {
            debug!(id = %id, "remove: not found");
            return None;
        };
        self.store.retire(removed);

        debug!(
            id = %id,
            policy = ?self.config.removal,
            remaining = self.ring.len(),
            "removed record"
        );
        self.store.get(removed).cloned()
    }

    /// Returns a record that is still in the ring.
    #[inline]
    pub fn get(&self, id: RecordId) -> Option<Arc<Record>> {
        self.store.get_active(id).cloned()
    }

    /// Returns at most `count` records, best rated first.
    ///
    /// With both `min_price` and `max_price` the price tree answers and the
    /// result is filtered by `category`; otherwise the ring is scanned with
    /// `category` as filter. Either way the candidates are stably sorted by
    /// rating, descending, and truncated to `count`.
    pub fn recommend(
        &self,
        count: usize,
        category: Option<&str>,
        min_price: Option<f64>,
        max_price: Option<f64>,
    ) -> Vec<Arc<Record>> {
        let (path, mut candidates) = match (min_price, max_price) {
            (Some(min), Some(max)) => (
                QueryPath::PriceRange,
                self.price_candidates(min, max, category),
            ),
            _ => (
                QueryPath::Ring,
                self.ring
                    .scan(&self.store, count, category)
                    .into_iter()
                    .cloned()
                    .collect(),
            ),
        };

        let matched = candidates.len();
        // `+ 0.0` folds -0.0 into 0.0 so equal ratings stay tied.
        candidates.sort_by(|a, b| (b.rating + 0.0).total_cmp(&(a.rating + 0.0)));
        candidates.truncate(count);

        debug!(
            ?path,
            count,
            category = category.unwrap_or("*"),
            matched,
            returned = candidates.len(),
            "recommend"
        );
        candidates
    }

    fn price_candidates(&self, min: f64, max: f64, category: Option<&str>) -> Vec<Arc<Record>> {
        let lookup = |id: RecordId| match self.config.removal {
            RemovalPolicy::RingOnly => self.store.get(id),
            RemovalPolicy::Symmetric => self.store.get_active(id),
        };

        self.prices
            .range_query(min, max)
            .into_iter()
            .filter_map(lookup)
            .filter(|record| record.matches_category(category))
            .cloned()
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.add("Smart Watch", "Electronics", 199.99, 4.5, ["tech", "wearable"], 10);
        catalog.add("Coffee Maker", "Kitchen", 49.99, 4.2, ["appliance", "coffee"], 15);
        catalog.add("Book Set", "Books", 29.99, 4.8, ["reading", "collection"], 20);
        catalog.add("Gaming Console", "Electronics", 299.99, 4.7, ["tech", "gaming"], 5);
        catalog.add("Jewelry Box", "Accessories", 79.99, 4.0, ["storage", "decoration"], 12);
        catalog
    }

    fn names(records: &[Arc<Record>]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_add_assigns_increasing_ids() {
        let mut catalog = Catalog::new();
        assert_eq!(catalog.next_id(), RecordId(1));
        let a = catalog.add("a", "x", 1.0, 1.0, Vec::<String>::new(), 0);
        let b = catalog.add("b", "x", 2.0, 1.0, Vec::<String>::new(), 0);
        assert_eq!(a.id, RecordId(1));
        assert_eq!(b.id, RecordId(2));
        assert_eq!(catalog.next_id(), RecordId(3));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.price_tree().len(), 2);
    }

    #[test]
    fn test_add_keeps_fields() {
        let mut catalog = Catalog::new();
        let record = catalog.add("Mug", "Kitchen", -1.5, 3.3, ["gift", "gift", "ceramic"], 7);
        assert_eq!(record.name, "Mug");
        assert_eq!(record.category, "Kitchen");
        assert_eq!(record.price, -1.5);
        assert_eq!(record.rating, 3.3);
        assert_eq!(record.tags.len(), 2);
        assert!(record.tags.contains("ceramic"));
        assert_eq!(record.stock, 7);
    }

    #[test]
    fn test_both_indexes_share_the_record() {
        let mut catalog = Catalog::new();
        let added = catalog.add("a", "x", 5.0, 1.0, ["t"], 1);
        let via_ring = catalog.recommend(1, None, None, None);
        let via_tree = catalog.recommend(1, None, Some(0.0), Some(10.0));
        assert!(Arc::ptr_eq(&added, &via_ring[0]));
        assert!(Arc::ptr_eq(&added, &via_tree[0]));
    }

    #[test]
    fn test_recommend_general_sorted_by_rating() {
        let catalog = sample();
        let top = catalog.recommend(3, None, None, None);
        // Ring yields the first three inserted, then they are rating-sorted.
        assert_eq!(names(&top), vec!["Book Set", "Smart Watch", "Coffee Maker"]);
    }

    #[test]
    fn test_recommend_price_range_with_category() {
        let catalog = sample();
        let hits = catalog.recommend(5, Some("Electronics"), Some(0.0), Some(250.0));
        assert_eq!(names(&hits), vec!["Smart Watch"]);
    }

    #[test]
    fn test_recommend_price_range_truncates_after_sort() {
        let catalog = sample();
        let hits = catalog.recommend(2, None, Some(0.0), Some(1000.0));
        assert_eq!(names(&hits), vec!["Book Set", "Gaming Console"]);
    }

    #[test]
    fn test_recommend_single_bound_uses_ring() {
        let catalog = sample();
        // Only one bound given: price filter is ignored.
        let hits = catalog.recommend(10, None, Some(100.0), None);
        assert_eq!(hits.len(), 5);
        let hits = catalog.recommend(10, None, None, Some(10.0));
        assert_eq!(hits.len(), 5);
    }

    #[test]
    fn test_recommend_zero_count() {
        let catalog = sample();
        assert!(catalog.recommend(0, None, None, None).is_empty());
        assert!(catalog.recommend(0, None, Some(0.0), Some(500.0)).is_empty());
    }

    #[test]
    fn test_rating_ties_keep_scan_order() {
        let mut catalog = Catalog::new();
        for name in ["first", "second", "third"] {
            catalog.add(name, "x", 10.0, 4.0, Vec::<String>::new(), 1);
        }
        let hits = catalog.recommend(3, None, None, None);
        assert_eq!(names(&hits), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_signed_zero_ratings_tie() {
        let mut catalog = Catalog::new();
        catalog.add("a", "x", 10.0, -0.0, Vec::<String>::new(), 1);
        catalog.add("b", "x", 10.0, 0.0, Vec::<String>::new(), 1);

        let hits = catalog.recommend(2, None, None, None);
        assert_eq!(names(&hits), vec!["a", "b"]);

        // Equal prices come out of the tree in insertion order too.
        let hits = catalog.recommend(2, None, Some(0.0), Some(20.0));
        assert_eq!(names(&hits), vec!["a", "b"]);
    }

    #[test]
    fn test_remove_and_get() {
        let mut catalog = sample();
        assert!(catalog.get(RecordId(2)).is_some());

        let removed = catalog.remove(RecordId(2)).unwrap();
        assert_eq!(removed.name, "Coffee Maker");
        assert_eq!(catalog.len(), 4);
        assert!(catalog.get(RecordId(2)).is_none());
        assert!(catalog.remove(RecordId(2)).is_none());
        assert!(catalog.remove(RecordId(99)).is_none());
    }

    #[test]
    fn test_ring_only_removal_leaves_price_index() {
        let mut catalog = sample();
        catalog.remove(RecordId(2));

        let ring_hits = catalog.recommend(10, Some("Kitchen"), None, None);
        assert!(ring_hits.is_empty());

        let range_hits = catalog.recommend(10, Some("Kitchen"), Some(0.0), Some(100.0));
        assert_eq!(names(&range_hits), vec!["Coffee Maker"]);
    }

    #[test]
    fn test_symmetric_removal_hides_from_price_index() {
        let mut catalog = Catalog::with_config(CatalogConfig {
            removal: RemovalPolicy::Symmetric,
            ..Default::default()
        });
        catalog.add("Coffee Maker", "Kitchen", 49.99, 4.2, ["coffee"], 15);
        catalog.add("Kettle", "Kitchen", 39.99, 4.4, ["tea"], 3);

        let removed = catalog.remove(RecordId(1)).unwrap();
        assert_eq!(removed.name, "Coffee Maker");

        let range_hits = catalog.recommend(10, Some("Kitchen"), Some(0.0), Some(100.0));
        assert_eq!(names(&range_hits), vec!["Kettle"]);
        // The tree itself still holds both entries.
        assert_eq!(catalog.price_tree().len(), 2);
    }
}
