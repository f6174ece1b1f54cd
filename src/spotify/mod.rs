use async_trait::async_trait;
use reqwest::StatusCode;
use rspotify::{
    http::HttpError,
    model::{Country, Market, SimplifiedArtist},
    ClientCredsSpotify, ClientError, Config as SpotifyConfig, Credentials, Token,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::token::{CredentialSource, TokenCache};
use crate::catalog::{CatalogError, CatalogSearch, Track, TrackDescriptor};
use crate::config::Config;
use crate::mood::AudioProfile;

use self::auth::SpotifyCredentials;

pub mod auth;
pub mod features;
pub mod search;
pub mod seeds;

/// Spotify-backed catalog. The API client never refreshes on its own: each
/// call installs the current token from the shared [`TokenCache`].
pub struct SpotifyCatalog {
    client: ClientCredsSpotify,
    credentials: Arc<dyn CredentialSource>,
    tokens: Arc<TokenCache>,
    market: Option<Market>,
}

pub fn build_spotify_catalog(config: &Config, tokens: Arc<TokenCache>) -> Option<SpotifyCatalog> {
    let (Some(id), Some(secret)) = (&config.client_id, &config.client_secret) else {
        warn!("SPOTIFY_CLIENT_ID/SPOTIFY_CLIENT_SECRET not set, live catalog disabled");
        return None;
    };

    let market = match serde_json::from_value::<Country>(config.market.to_uppercase().into()) {
        Ok(country) => Some(Market::Country(country)),
        Err(_) => {
            warn!("Unknown market {:?}, searching without one", config.market);
            None
        }
    };

    info!("Spotify catalog enabled (market {})", config.market);
    Some(SpotifyCatalog::new(
        Arc::new(SpotifyCredentials::new(id, secret)),
        tokens,
        Credentials::new(id, secret),
        market,
    ))
}

impl SpotifyCatalog {
    pub fn new(
        credentials: Arc<dyn CredentialSource>,
        tokens: Arc<TokenCache>,
        creds: Credentials,
        market: Option<Market>,
    ) -> Self {
        let config = SpotifyConfig {
            token_refreshing: false,
            ..Default::default()
        };
        SpotifyCatalog {
            client: ClientCredsSpotify::with_config(creds, config),
            credentials,
            tokens,
            market,
        }
    }

    /// The API client with a valid token installed.
    async fn authorized(&self) -> Result<&ClientCredsSpotify, CatalogError> {
        let token = self.tokens.get(self.credentials.as_ref()).await?;
        let mut slot = self
            .client
            .token
            .lock()
            .await
            .map_err(|_| CatalogError::Request("token slot unavailable".into()))?;
        *slot = Some(Token {
            access_token: token.value,
            expires_at: Some(token.expires_at),
            ..Default::default()
        });
        Ok(&self.client)
    }

    /// Maps an API failure, dropping the cached token when it was rejected.
    async fn request_failed(&self, err: ClientError) -> CatalogError {
        if rejected_status(&err) == Some(StatusCode::UNAUTHORIZED) {
            self.tokens.invalidate().await;
        }
        CatalogError::Request(err.to_string())
    }
}

/// Status of the response when the API answered with an error code.
pub(crate) fn rejected_status(err: &ClientError) -> Option<StatusCode> {
    match err {
        ClientError::Http(http) => match http.as_ref() {
            HttpError::StatusCode(response) => Some(response.status()),
            _ => None,
        },
        _ => None,
    }
}

pub(crate) fn artist_names(artists: &[SimplifiedArtist]) -> Vec<String> {
    let names: Vec<String> = artists
        .iter()
        .map(|a| a.name.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        vec!["Unknown Artist".to_string()]
    } else {
        names
    }
}

#[async_trait]
impl CatalogSearch for SpotifyCatalog {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Track>, CatalogError> {
        self.search_tracks(query, limit).await
    }

    async fn recommend_by_seeds(
        &self,
        profile: &AudioProfile,
        limit: u32,
    ) -> Result<Vec<Track>, CatalogError> {
        self.mood_recommendations(profile, limit).await
    }

    async fn audio_features(&self, ids: &[String]) -> Result<Vec<TrackDescriptor>, CatalogError> {
        self.track_descriptors(ids).await
    }
}
