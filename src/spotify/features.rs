use rspotify::{
    model::{AudioFeatures, Modality, TrackId},
    prelude::*,
};
use tracing::debug;

use super::SpotifyCatalog;
use crate::catalog::{CatalogError, TrackDescriptor, FEATURE_BATCH_SIZE};

pub(crate) fn descriptor_from(features: &AudioFeatures) -> TrackDescriptor {
    TrackDescriptor {
        track_id: features.id.id().to_string(),
        valence: Some(features.valence),
        energy: Some(features.energy),
        tempo: Some(features.tempo),
        danceability: Some(features.danceability),
        instrumentalness: Some(features.instrumentalness),
        acousticness: Some(features.acousticness),
        mode: match features.mode {
            Modality::Major => Some(1.0),
            Modality::Minor => Some(0.0),
            _ => None,
        },
    }
}

impl SpotifyCatalog {
    pub(super) async fn track_descriptors(&self, ids: &[String]) -> Result<Vec<TrackDescriptor>, CatalogError> {
        let track_ids: Vec<TrackId<'static>> = ids
            .iter()
            .take(FEATURE_BATCH_SIZE)
            .filter_map(|id| match TrackId::from_id(id.clone()) {
                Ok(tid) => Some(tid),
                Err(_) => {
                    debug!("Skipping non-Spotify id {id}");
                    None
                }
            })
            .collect();
        if track_ids.is_empty() {
            return Ok(vec![]);
        }

        let sp = self.authorized().await?;
        let features = match sp.tracks_features(track_ids).await {
            Ok(features) => features,
            Err(e) => return Err(self.request_failed(e).await),
        };

        Ok(features
            .unwrap_or_default()
            .iter()
            .map(descriptor_from)
            .collect())
    }
}
