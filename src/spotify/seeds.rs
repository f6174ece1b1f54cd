use rspotify::{
    model::{ArtistId, RecommendationsAttribute, SimplifiedTrack, TrackId},
    prelude::*,
};
use tracing::debug;

use super::{artist_names, SpotifyCatalog};
use crate::catalog::{CatalogError, Track};
use crate::mood::{AudioProfile, Feature};

const MAX_RECOMMENDATION_LIMIT: u32 = 100;

fn track_from_simplified(track: &SimplifiedTrack) -> Option<Track> {
    let id = track.id.as_ref()?;
    Some(Track {
        id: id.id().to_string(),
        title: track.name.clone(),
        artists: artist_names(&track.artists),
        language: None,
    })
}

/// Audio targets in the shape the recommendations endpoint expects.
pub(crate) fn target_attributes(profile: &AudioProfile) -> Vec<RecommendationsAttribute> {
    profile
        .targets
        .iter()
        .map(|(feature, &value)| match feature {
            Feature::Valence => RecommendationsAttribute::TargetValence(value),
            Feature::Energy => RecommendationsAttribute::TargetEnergy(value),
            Feature::Tempo => RecommendationsAttribute::TargetTempo(value),
            Feature::Danceability => RecommendationsAttribute::TargetDanceability(value),
            Feature::Instrumentalness => RecommendationsAttribute::TargetInstrumentalness(value),
            Feature::Acousticness => RecommendationsAttribute::TargetAcousticness(value),
            // 1 is major, 0 is minor.
            Feature::Mode => RecommendationsAttribute::TargetMode(if value >= 0.5 { 1 } else { 0 }),
        })
        .collect()
}

impl SpotifyCatalog {
    /// Seed-genre recommendations steered by the profile's targets.
    ///
    /// Spotify deprecated this endpoint for new apps in Nov 2024, which is
    /// why plain search is the default strategy.
    pub(super) async fn mood_recommendations(
        &self,
        profile: &AudioProfile,
        limit: u32,
    ) -> Result<Vec<Track>, CatalogError> {
        let seeds: Vec<&'static str> = profile.seeds_for_request().to_vec();
        if seeds.is_empty() || limit == 0 {
            debug!("No genre seeds for {}, skipping recommendations", profile.emotion);
            return Ok(vec![]);
        }

        let sp = self.authorized().await?;
        let recs = match sp
            .recommendations(
                target_attributes(profile),
                None::<Vec<ArtistId<'static>>>,
                Some(seeds),
                None::<Vec<TrackId<'static>>>,
                self.market.clone(),
                Some(limit.min(MAX_RECOMMENDATION_LIMIT)),
            )
            .await
        {
            Ok(recs) => recs,
            Err(e) => return Err(self.request_failed(e).await),
        };

        Ok(recs.tracks.iter().filter_map(track_from_simplified).collect())
    }
}
