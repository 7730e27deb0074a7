//! History storage backends. A store only moves the raw serialized array;
//! parsing and filtering live in [`crate::history::decode_history`].

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key-value persistence for the single history record.
///
/// Carried by the engine as `Arc<dyn HistoryStore>` so tests can swap in
/// [`MemoryHistoryStore`].
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Returns the raw payload, or `None` if nothing was ever saved.
    async fn load(&self) -> Result<Option<String>, StoreError>;

    /// Replaces the raw payload.
    async fn save(&self, raw: &str) -> Result<(), StoreError>;

    /// Short backend label for logs.
    fn backend(&self) -> &'static str;
}

/// In-process store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    raw: RwLock<Option<String>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with a raw payload, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: RwLock::new(Some(raw.into())),
        }
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.raw.read().await.clone())
    }

    async fn save(&self, raw: &str) -> Result<(), StoreError> {
        *self.raw.write().await = Some(raw.to_string());
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
