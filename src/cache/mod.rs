pub mod token;

use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

/// Best-effort JSON store on Redis. Connection and decode failures read as a
/// miss, so callers treat it as an optional second level.
pub struct Cache {
    client: redis::Client,
}

impl Cache {
    pub fn new(redis_url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Cache { client })
    }

    /// Opens the client and pings it; `None` when Redis is not reachable.
    pub async fn connect(redis_url: &str) -> Option<Self> {
        let cache = Cache::new(redis_url).ok()?;
        cache.ping().await.then_some(cache)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.client.get_multiplexed_async_connection().await.ok()?;
        let raw: Option<String> = conn.get(key).await.unwrap_or(None);
        match serde_json::from_str(&raw?) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Discarding undecodable cache entry {key}: {e}");
                None
            }
        }
    }

    pub async fn put_json<T: Serialize>(&self, key: &str, value: &T, ttl_secs: Option<u64>) {
        let Ok(raw) = serde_json::to_string(value) else {
            return;
        };
        if let Ok(mut conn) = self.client.get_multiplexed_async_connection().await {
            let result: redis::RedisResult<()> = match ttl_secs {
                Some(ttl) if ttl > 0 => conn.set_ex(key, raw, ttl).await,
                _ => conn.set(key, raw).await,
            };
            if let Err(e) = result {
                debug!("Cache write for {key} failed: {e}");
            }
        }
    }

    pub async fn delete(&self, key: &str) {
        if let Ok(mut conn) = self.client.get_multiplexed_async_connection().await {
            let _: redis::RedisResult<()> = conn.del(key).await;
        }
    }

    pub async fn ping(&self) -> bool {
        match self.client.get_multiplexed_async_connection().await {
            Ok(mut conn) => {
                let result: redis::RedisResult<String> =
                    redis::cmd("PING").query_async(&mut conn).await;
                result.is_ok()
            }
            Err(_) => false,
        }
    }
}
