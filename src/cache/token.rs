//! Shared access-token cache for the catalog API.
//!
//! One [`TokenCache`] is created at startup and handed to every catalog
//! client. The slot is guarded by an async mutex that stays held across a
//! refresh, so concurrent callers queue behind a single credential exchange
//! instead of each starting their own.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::Cache;

/// A token this close to expiry is treated as expired.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

const TOKEN_CACHE_KEY: &str = "moodmix:catalog_token";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }

    fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        (self.expires_at - now).num_seconds().max(0) as u64
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CredentialError {
    #[error("credential exchange failed: {0}")]
    Exchange(String),
    #[error("credential service returned no token")]
    MissingToken,
}

#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn exchange(&self) -> Result<AccessToken, CredentialError>;
}

pub struct TokenCache {
    slot: Mutex<Option<AccessToken>>,
    store: Option<Arc<Cache>>,
    refreshes: AtomicU64,
}

impl Default for TokenCache {
    fn default() -> Self {
        TokenCache::new(None)
    }
}

impl TokenCache {
    pub fn new(store: Option<Arc<Cache>>) -> Self {
        TokenCache {
            slot: Mutex::new(None),
            store,
            refreshes: AtomicU64::new(0),
        }
    }

    /// Number of credential exchanges performed so far.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }

    pub async fn get(&self, source: &dyn CredentialSource) -> Result<AccessToken, CredentialError> {
        let mut slot = self.slot.lock().await;
        let now = Utc::now();

        if let Some(token) = slot.as_ref().filter(|t| t.is_fresh_at(now)) {
            return Ok(token.clone());
        }

        if slot.is_none() {
            if let Some(token) = self.load_persisted(now).await {
                debug!("Reusing persisted catalog token");
                *slot = Some(token.clone());
                return Ok(token);
            }
        }

        let token = source.exchange().await?;
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        info!(
            "Refreshed catalog token (exchange #{}), valid until {}",
            self.refresh_count(),
            token.expires_at
        );

        if let Some(ref store) = self.store {
            store
                .put_json(TOKEN_CACHE_KEY, &token, Some(token.remaining_secs(now)))
                .await;
        }
        *slot = Some(token.clone());
        Ok(token)
    }

    /// Drops the cached token, e.g. after the API rejected it.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
        if let Some(ref store) = self.store {
            store.delete(TOKEN_CACHE_KEY).await;
        }
        warn!("Catalog token invalidated");
    }

    async fn load_persisted(&self, now: DateTime<Utc>) -> Option<AccessToken> {
        let store = self.store.as_ref()?;
        let token: AccessToken = store.get_json(TOKEN_CACHE_KEY).await?;
        token.is_fresh_at(now).then_some(token)
    }
}
