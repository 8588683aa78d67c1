use super::memory::{DedupSnapshot, MemoryDedupStore};
use super::DedupStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// In-memory seen-set that is loaded from and saved back to a JSON file
pub struct JsonFileDedupStore {
    path: PathBuf,
    inner: MemoryDedupStore,
}

impl JsonFileDedupStore {
    /// Load the store at `path`; a missing file starts an empty store
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let snapshot = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<DedupSnapshot>(&bytes)
                .with_context(|| format!("Failed to parse dedup store {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No dedup store at {}, starting empty", path.display());
                DedupSnapshot::default()
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read dedup store {}", path.display()));
            }
        };

        debug!(
            ids = snapshot.ids.len(),
            content_hashes = snapshot.content_hashes.len(),
            "Loaded dedup store"
        );

        Ok(Self {
            path,
            inner: MemoryDedupStore::from_snapshot(snapshot),
        })
    }

    /// Write the current contents back to disk
    pub async fn persist(&self) -> Result<()> {
        let snapshot = self.inner.snapshot();
        let json = serde_json::to_string_pretty(&snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write dedup store {}", self.path.display()))?;

        info!(
            "💾 Saved {} ids and {} content hashes to {}",
            snapshot.ids.len(),
            snapshot.content_hashes.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[async_trait]
impl DedupStore for JsonFileDedupStore {
    async fn contains_id(&self, id: &str) -> bool {
        self.inner.contains_id(id).await
    }

    async fn add_ids(&self, ids: &[String]) {
        self.inner.add_ids(ids).await
    }

    async fn contains_content_hash(&self, hash: &str) -> bool {
        self.inner.contains_content_hash(hash).await
    }

    async fn add_content_hashes(&self, hashes: &[String]) {
        self.inner.add_content_hashes(hashes).await
    }
}
