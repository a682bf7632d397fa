//! The checkpoint interface — resume semantics for interrupted runs.
//! The persistent store itself is an external collaborator; this
//! crate only declares the trait plus an in-memory default.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointProgress {
    pub complete: bool,
}

#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn progress(&self) -> BTreeMap<String, CheckpointProgress>;
    async fn load(&self, extractor_id: &str, slot: &str) -> Option<Value>;
    async fn save(&self, extractor_id: &str, slot: &str, value: Value);
}

/// Default checkpoint store: nothing is ever complete, nothing is
/// ever cached. Sufficient to exercise resume semantics in tests
/// without a real persistence backend.
#[derive(Debug, Default)]
pub struct NullCheckpointStore;

#[async_trait]
impl CheckpointStore for NullCheckpointStore {
    async fn progress(&self) -> BTreeMap<String, CheckpointProgress> {
        BTreeMap::new()
    }

    async fn load(&self, _extractor_id: &str, _slot: &str) -> Option<Value> {
        None
    }

    async fn save(&self, _extractor_id: &str, _slot: &str, _value: Value) {}
}

/// In-memory checkpoint store used by orchestrator resume tests.
#[derive(Debug, Default)]
pub struct InMemoryCheckpointStore {
    complete: Mutex<BTreeMap<String, CheckpointProgress>>,
    cache: Mutex<BTreeMap<(String, String), Value>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_complete(&self, extractor_id: impl Into<String>) {
        self.complete
            .lock()
            .insert(extractor_id.into(), CheckpointProgress { complete: true });
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn progress(&self) -> BTreeMap<String, CheckpointProgress> {
        self.complete.lock().clone()
    }

    async fn load(&self, extractor_id: &str, slot: &str) -> Option<Value> {
        self.cache
            .lock()
            .get(&(extractor_id.to_string(), slot.to_string()))
            .cloned()
    }

    async fn save(&self, extractor_id: &str, slot: &str, value: Value) {
        self.cache
            .lock()
            .insert((extractor_id.to_string(), slot.to_string()), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_store_reports_nothing_complete() {
        let store = NullCheckpointStore;
        assert!(store.progress().await.is_empty());
        assert!(store.load("X", "slot").await.is_none());
    }

    #[tokio::test]
    async fn in_memory_store_round_trips() {
        let store = InMemoryCheckpointStore::new();
        store.save("X", "slot", serde_json::json!({"a": 1})).await;
        let loaded = store.load("X", "slot").await.unwrap();
        assert_eq!(loaded, serde_json::json!({"a": 1}));

        store.mark_complete("X");
        let progress = store.progress().await;
        assert_eq!(progress.get("X"), Some(&CheckpointProgress { complete: true }));
    }
}
