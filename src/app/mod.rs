pub mod state;

use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::{
    app::state::{language_for, RecommendRequest, RecommendResponse, Recommendation},
    catalog::{fetch_descriptors, CatalogSearch, Track},
    config::{CatalogStrategy, Config, PoolPolicy, MAX_COUNT},
    curated::CuratedCatalog,
    emotion::{ClassifierError, EmotionClassifier},
    mood::{profile_for, AudioProfile, Feature},
    refine::refine,
};

/// Candidate pool size requested when clustering will thin it out.
const CLUSTER_POOL_SIZE: u32 = 50;
const PER_TERM_LIMIT: u32 = 10;
const FALLBACK_QUERY_LIMIT: u32 = 20;

#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error("recommendation timed out after {0:?}")]
    Timeout(Duration),
}

impl RecommendError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, RecommendError::InvalidInput(_))
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub default_languages: Vec<String>,
    pub default_count: usize,
    pub clustering: bool,
    pub clusters: usize,
    pub strategy: CatalogStrategy,
    pub pool_policy: PoolPolicy,
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Settings {
            default_languages: config.default_languages.clone(),
            default_count: config.default_count,
            clustering: config.clustering,
            clusters: config.clusters,
            strategy: config.strategy,
            pool_policy: config.pool_policy,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::from(&Config::default())
    }
}

/// One request/response cycle: detect, gather, refine, merge, tag.
pub struct App {
    classifier: Arc<dyn EmotionClassifier>,
    catalog: Option<Arc<dyn CatalogSearch>>,
    curated: CuratedCatalog,
    settings: Settings,
}

fn preview(text: &str) -> String {
    let mut p: String = text.chars().take(50).collect();
    if p.len() < text.len() {
        p.push_str("...");
    }
    p
}

fn normalize_languages(languages: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for lang in languages {
        let lang = lang.trim().to_lowercase();
        if !lang.is_empty() && !out.contains(&lang) {
            out.push(lang);
        }
    }
    out
}

/// Keeps the first occurrence of each (title, artist) pair.
fn dedupe(tracks: impl IntoIterator<Item = Track>) -> Vec<Track> {
    let mut seen = HashSet::new();
    tracks
        .into_iter()
        .filter(|t| seen.insert(t.dedupe_key()))
        .collect()
}

impl App {
    pub fn new(
        classifier: Arc<dyn EmotionClassifier>,
        catalog: Option<Arc<dyn CatalogSearch>>,
        curated: CuratedCatalog,
        settings: Settings,
    ) -> Self {
        App { classifier, catalog, curated, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn recommend(&self, request: RecommendRequest) -> Result<RecommendResponse, RecommendError> {
        let text = request
            .user_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RecommendError::InvalidInput("Missing required field 'user_text'".into()))?;

        let count = request.count.unwrap_or(self.settings.default_count);
        if count == 0 || count > MAX_COUNT {
            return Err(RecommendError::InvalidInput(format!(
                "count must be between 1 and {MAX_COUNT}"
            )));
        }
        let languages = match request.languages {
            Some(ref langs) => normalize_languages(langs),
            None => normalize_languages(&self.settings.default_languages),
        };

        info!("Received recommendation request: {}", preview(text));

        let detection = self.classifier.detect(text).await.map_err(|e| {
            error!("Emotion detection failed: {e}");
            RecommendError::from(e)
        })?;
        let emotion = detection.label;
        info!("Detected emotion: {emotion}");

        let profile = profile_for(emotion);
        debug!(
            "Targets for {emotion}: valence {:?}, energy {:?}",
            profile.target(Feature::Valence),
            profile.target(Feature::Energy)
        );
        let live = self.live_pool(&profile, count).await;

        let curated = {
            let mut rng = rand::thread_rng();
            self.curated.lookup(emotion, &languages, count, &mut rng)
        };
        debug!("{} curated and {} live candidates", curated.len(), live.len());

        let merged = match self.settings.pool_policy {
            PoolPolicy::LocalizedFirst => dedupe(curated.into_iter().chain(live)),
            PoolPolicy::LiveFirst => dedupe(live.into_iter().chain(curated)),
        };

        let recommendations: Vec<Recommendation> = merged
            .iter()
            .take(count)
            .enumerate()
            .map(|(pos, track)| Recommendation::from_track(track, language_for(track, pos, &languages)))
            .collect();

        if recommendations.len() < count {
            warn!("Only {} of {count} recommendations available", recommendations.len());
        }

        Ok(RecommendResponse {
            emotion: emotion.to_string(),
            recommendations,
        })
    }

    /// Live catalog candidates, refined when clustering is on. Catalog
    /// failures are logged and read as an empty pool.
    async fn live_pool(&self, profile: &AudioProfile, count: usize) -> Vec<Track> {
        let Some(ref catalog) = self.catalog else {
            return vec![];
        };
        let limit = if self.settings.clustering {
            CLUSTER_POOL_SIZE
        } else {
            count as u32
        };

        let pool = match self.settings.strategy {
            CatalogStrategy::Seeds => match catalog.recommend_by_seeds(profile, limit).await {
                Ok(tracks) => tracks,
                Err(e) => {
                    warn!("Seed recommendations failed: {e}");
                    vec![]
                }
            },
            CatalogStrategy::Search => self.search_pool(catalog.as_ref(), profile, count).await,
        };
        let pool = dedupe(pool);

        if !self.settings.clustering || pool.is_empty() {
            return pool;
        }
        let descriptors = fetch_descriptors(catalog.as_ref(), &pool).await;
        let refined = refine(&pool, &descriptors, profile, self.settings.clusters);
        debug!("Refined {} live candidates down to {}", pool.len(), refined.len());
        refined
    }

    async fn search_pool(&self, catalog: &dyn CatalogSearch, profile: &AudioProfile, count: usize) -> Vec<Track> {
        let queries: Vec<String> = profile
            .search_terms
            .iter()
            .map(|term| format!("{term} music"))
            .collect();
        let results = join_all(queries.iter().map(|q| catalog.search(q, PER_TERM_LIMIT))).await;

        let mut pool = Vec::new();
        let mut failures = 0;
        for (query, result) in queries.iter().zip(results) {
            match result {
                Ok(tracks) => pool.extend(tracks),
                Err(e) => {
                    failures += 1;
                    warn!("Catalog search {query:?} failed: {e}");
                }
            }
        }

        // Nothing came back from a healthy catalog: widen the query.
        if pool.is_empty() && failures < queries.len() {
            let fallbacks = [
                (format!("{} mood", profile.emotion), FALLBACK_QUERY_LIMIT),
                ("popular music".to_string(), count as u32),
            ];
            for (query, limit) in fallbacks {
                match catalog.search(&query, limit).await {
                    Ok(tracks) if !tracks.is_empty() => return tracks,
                    Ok(_) => debug!("Fallback query {query:?} returned nothing"),
                    Err(e) => {
                        warn!("Fallback query {query:?} failed: {e}");
                        break;
                    }
                }
            }
        }
        pool
    }
}
