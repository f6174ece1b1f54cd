use rspotify::{
    model::{FullTrack, SearchResult, SearchType},
    prelude::*,
};

use super::{artist_names, SpotifyCatalog};
use crate::catalog::{CatalogError, Track};

/// Spotify caps search pages at 50 items.
const MAX_SEARCH_LIMIT: u32 = 50;

pub(crate) fn track_from_full(track: &FullTrack) -> Option<Track> {
    let id = track.id.as_ref()?;
    Some(Track {
        id: id.id().to_string(),
        title: track.name.clone(),
        artists: artist_names(&track.artists),
        language: None,
    })
}

impl SpotifyCatalog {
    pub(super) async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>, CatalogError> {
        if query.trim().is_empty() || limit == 0 {
            return Ok(vec![]);
        }
        let sp = self.authorized().await?;
        let result = match sp
            .search(
                query,
                SearchType::Track,
                self.market.clone(),
                None,
                Some(limit.min(MAX_SEARCH_LIMIT)),
                None,
            )
            .await
        {
            Ok(result) => result,
            Err(e) => return Err(self.request_failed(e).await),
        };

        let tracks = match result {
            // Local files come back without an id and can't be described.
            SearchResult::Tracks(page) => page.items.iter().filter_map(track_from_full).collect(),
            _ => vec![],
        };
        Ok(tracks)
    }
}
