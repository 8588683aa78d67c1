//! Seen-set tracking across runs.
//!
//! Listings are remembered by id and by content fingerprint (text and image
//! fingerprints share one set). Every operation is idempotent.

pub mod json_file;
pub mod memory;

use async_trait::async_trait;

pub use json_file::JsonFileDedupStore;
pub use memory::MemoryDedupStore;

#[async_trait]
pub trait DedupStore: Send + Sync {
    async fn contains_id(&self, id: &str) -> bool;

    async fn add_ids(&self, ids: &[String]);

    async fn contains_content_hash(&self, hash: &str) -> bool;

    async fn add_content_hashes(&self, hashes: &[String]);
}
