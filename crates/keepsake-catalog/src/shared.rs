//! Thread-safe handle over a `Catalog`.

use crate::catalog::Catalog;
use keepsake_common::{CatalogConfig, Record, RecordId};
use parking_lot::{RwLock, RwLockReadGuard};
use std::sync::Arc;

/// Cloneable, lock-guarded catalog.
///
/// `add` and `remove` hold the write lock for the whole operation, so the
/// ring and the price tree are never observed half-updated. Reads share the
/// read lock and run concurrently with each other.
#[derive(Clone)]
pub struct SharedCatalog {
    inner: Arc<RwLock<Catalog>>,
}

impl SharedCatalog {
    /// Wraps an existing catalog.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(catalog)),
        }
    }

    /// Creates an empty shared catalog.
    pub fn with_config(config: CatalogConfig) -> Self {
        Self::new(Catalog::with_config(config))
    }

    pub fn add<S>(
        &self,
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
        self.inner
            .write()
            .add(name, category, price, rating, tags, stock)
    }

    pub fn remove(&self, id: RecordId) -> Option<Arc<Record>> {
        self.inner.write().remove(id)
    }

    pub fn get(&self, id: RecordId) -> Option<Arc<Record>> {
        self.inner.read().get(id)
    }

    pub fn recommend(
        &self,
        count: usize,
        category: Option<&str>,
        min_price: Option<f64>,
        max_price: Option<f64>,
    ) -> Vec<Arc<Record>> {
        self.inner
            .read()
            .recommend(count, category, min_price, max_price)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Read guard for inspecting both indexes under one consistent view.
    pub fn read(&self) -> RwLockReadGuard<'_, Catalog> {
        self.inner.read()
    }
}

impl Default for SharedCatalog {
    fn default() -> Self {
        Self::new(Catalog::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_shared_catalog_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedCatalog>();
    }

    #[test]
    fn test_clones_share_state() {
        let a = SharedCatalog::default();
        let b = a.clone();
        let record = a.add("Lamp", "Home", 25.0, 4.1, ["light"], 2);
        assert_eq!(b.len(), 1);
        assert_eq!(b.get(record.id).unwrap().name, "Lamp");
        assert!(b.remove(record.id).is_some());
        assert!(a.is_empty());
    }

    #[test]
    fn test_read_guard_sees_consistent_indexes() {
        let shared = SharedCatalog::default();
        shared.add("a", "x", 1.0, 1.0, ["t"], 1);
        shared.add("b", "x", 2.0, 1.0, ["t"], 1);

        let guard = shared.read();
        assert_eq!(guard.ring().len(), guard.price_tree().len());
    }

    #[test]
    fn test_concurrent_writers_keep_indexes_in_step() {
        let shared = SharedCatalog::default();
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..250 {
                        shared.add(
                            format!("item-{}-{}", t, i),
                            "Toys",
                            f64::from(i),
                            4.0,
                            Vec::<String>::new(),
                            1,
                        );
                        let _ = shared.recommend(5, Some("Toys"), Some(0.0), Some(50.0));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let guard = shared.read();
        assert_eq!(guard.len(), 1000);
        assert_eq!(guard.price_tree().len(), 1000);
        assert_eq!(guard.next_id(), RecordId(1001));
    }
}
