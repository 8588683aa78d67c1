use super::DedupStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

/// Serializable view of a store's contents, sorted for stable output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DedupSnapshot {
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default)]
    pub content_hashes: Vec<String>,
}

#[derive(Debug, Default)]
pub struct MemoryDedupStore {
    ids: RwLock<HashSet<String>>,
    content_hashes: RwLock<HashSet<String>>,
}

impl MemoryDedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: DedupSnapshot) -> Self {
        Self {
            ids: RwLock::new(snapshot.ids.into_iter().collect()),
            content_hashes: RwLock::new(snapshot.content_hashes.into_iter().collect()),
        }
    }

    pub fn snapshot(&self) -> DedupSnapshot {
        let mut ids: Vec<String> = self
            .ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect();
        let mut content_hashes: Vec<String> = self
            .content_hashes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect();
        ids.sort();
        content_hashes.sort();

        DedupSnapshot { ids, content_hashes }
    }
}

fn contains(set: &RwLock<HashSet<String>>, key: &str) -> bool {
    set.read().unwrap_or_else(PoisonError::into_inner).contains(key)
}

fn insert_all(set: &RwLock<HashSet<String>>, keys: &[String]) {
    let mut guard = set.write().unwrap_or_else(PoisonError::into_inner);
    guard.extend(keys.iter().cloned());
}

#[async_trait]
impl DedupStore for MemoryDedupStore {
    async fn contains_id(&self, id: &str) -> bool {
        contains(&self.ids, id)
    }

    async fn add_ids(&self, ids: &[String]) {
        insert_all(&self.ids, ids);
    }

    async fn contains_content_hash(&self, hash: &str) -> bool {
        contains(&self.content_hashes, hash)
    }

    async fn add_content_hashes(&self, hashes: &[String]) {
        insert_all(&self.content_hashes, hashes);
    }
}
