//! In-memory store adapter
//!
//! Backs a session with plain maps. Used directly by tests and as the
//! default adapter until a durable backend is wired in; `fail_next_saves`
//! lets rollback paths be exercised deterministically.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::RwLock;

use core_kernel::{BusinessId, Collection, Store, StoreError};

/// A `Store` kept entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<(BusinessId, Collection), Vec<serde_json::Value>>>,
    failing_saves: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a collection, bypassing the port (test setup)
    pub fn seed(
        &self,
        business: BusinessId,
        collection: Collection,
        records: Vec<serde_json::Value>,
    ) {
        self.data
            .write()
            .expect("memory store lock poisoned")
            .insert((business, collection), records);
    }

    /// Makes the next `count` saves fail with a transient error
    pub fn fail_next_saves(&self, count: u32) {
        self.failing_saves.store(count, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load(
        &self,
        business: BusinessId,
        collection: Collection,
    ) -> Result<Vec<serde_json::Value>, StoreError> {
        let data = self.data.read().expect("memory store lock poisoned");
        Ok(data
            .get(&(business, collection))
            .cloned()
            .unwrap_or_default())
    }

    async fn save(
        &self,
        business: BusinessId,
        collection: Collection,
        records: Vec<serde_json::Value>,
    ) -> Result<(), StoreError> {
        let remaining = self.failing_saves.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_saves.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Unavailable("injected save failure".into()));
        }

        self.data
            .write()
            .expect("memory store lock poisoned")
            .insert((business, collection), records);
        Ok(())
    }
}
