use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::info;

use crate::history::store::{HistoryStore, StoreError};

/// Stores the history array as a single string value under a namespaced key.
#[derive(Clone)]
pub struct RedisHistoryStore {
    conn: MultiplexedConnection,
    key: String,
}

impl RedisHistoryStore {
    pub async fn connect(client: &redis::Client, key: impl Into<String>) -> Result<Self, StoreError> {
        let conn = client.get_multiplexed_async_connection().await?;
        let key = key.into();
        info!("Redis history store ready (key: {key})");
        Ok(Self { conn, key })
    }
}

#[async_trait]
impl HistoryStore for RedisHistoryStore {
    async fn load(&self) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(&self.key).await?;
        Ok(raw)
    }

    async fn save(&self, raw: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(&self.key, raw).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
