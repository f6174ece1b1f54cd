use async_trait::async_trait;
use tracing::warn;

use crate::mood::{AudioProfile, Feature};

/// Provider limit for one audio-features call.
pub const FEATURE_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artists: Vec<String>,
    pub language: Option<String>,
}

impl Track {
    pub fn primary_artist(&self) -> &str {
        self.artists.first().map(String::as_str).unwrap_or("Unknown Artist")
    }

    /// Identity used for de-duplication across sources.
    pub fn dedupe_key(&self) -> (String, String) {
        (self.title.to_lowercase(), self.primary_artist().to_lowercase())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackDescriptor {
    pub track_id: String,
    pub valence: Option<f32>,
    pub energy: Option<f32>,
    /// Beats per minute, not normalised.
    pub tempo: Option<f32>,
    pub danceability: Option<f32>,
    pub instrumentalness: Option<f32>,
    pub acousticness: Option<f32>,
    pub mode: Option<f32>,
}

impl TrackDescriptor {
    pub fn get(&self, feature: Feature) -> Option<f32> {
        match feature {
            Feature::Valence => self.valence,
            Feature::Energy => self.energy,
            Feature::Tempo => self.tempo,
            Feature::Danceability => self.danceability,
            Feature::Instrumentalness => self.instrumentalness,
            Feature::Acousticness => self.acousticness,
            Feature::Mode => self.mode,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog credentials unavailable: {0}")]
    Credentials(#[from] crate::cache::token::CredentialError),
    #[error("catalog request failed: {0}")]
    Request(String),
}

#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Free-text track search.
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Track>, CatalogError>;

    /// Seed-genre recommendations steered by the profile's audio targets.
    async fn recommend_by_seeds(
        &self,
        profile: &AudioProfile,
        limit: u32,
    ) -> Result<Vec<Track>, CatalogError>;

    /// Descriptors for at most [`FEATURE_BATCH_SIZE`] ids. Ids the provider
    /// knows nothing about are simply absent from the result.
    async fn audio_features(&self, ids: &[String]) -> Result<Vec<TrackDescriptor>, CatalogError>;
}

/// Fetches descriptors in provider-sized batches. A failed batch is logged and
/// skipped; the tracks it covered just go without descriptors.
pub async fn fetch_descriptors(catalog: &dyn CatalogSearch, tracks: &[Track]) -> Vec<TrackDescriptor> {
    let ids: Vec<String> = tracks.iter().map(|t| t.id.clone()).collect();
    let mut descriptors = Vec::with_capacity(ids.len());

    for (i, batch) in ids.chunks(FEATURE_BATCH_SIZE).enumerate() {
        match catalog.audio_features(batch).await {
            Ok(found) => descriptors.extend(found),
            Err(e) => warn!("Audio feature batch {i} ({} ids) failed: {e}", batch.len()),
        }
    }
    descriptors
}
