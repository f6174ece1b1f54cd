use async_trait::async_trait;
use chrono::Utc;
use rspotify::{ClientCredsSpotify, Config as SpotifyConfig, Credentials};
use tracing::debug;

use crate::cache::token::{AccessToken, CredentialError, CredentialSource};

/// Client-credentials exchange against the Spotify accounts service.
///
/// Only performs the exchange; caching and expiry live in
/// [`TokenCache`](crate::cache::token::TokenCache).
pub struct SpotifyCredentials {
    client: ClientCredsSpotify,
}

impl SpotifyCredentials {
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        let creds = Credentials::new(client_id, client_secret);
        let config = SpotifyConfig {
            token_refreshing: false,
            ..Default::default()
        };
        SpotifyCredentials {
            client: ClientCredsSpotify::with_config(creds, config),
        }
    }
}

#[async_trait]
impl CredentialSource for SpotifyCredentials {
    async fn exchange(&self) -> Result<AccessToken, CredentialError> {
        self.client
            .request_token()
            .await
            .map_err(|e| CredentialError::Exchange(e.to_string()))?;

        let guard = self
            .client
            .token
            .lock()
            .await
            .map_err(|_| CredentialError::MissingToken)?;
        let token = guard.as_ref().ok_or(CredentialError::MissingToken)?;

        let expires_at = token
            .expires_at
            .unwrap_or_else(|| Utc::now() + token.expires_in);
        debug!("Spotify issued a token expiring at {expires_at}");

        Ok(AccessToken {
            value: token.access_token.clone(),
            expires_at,
        })
    }
}
