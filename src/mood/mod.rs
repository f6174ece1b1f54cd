//! Emotion to audio-feature mapping.
//!
//! Every [`EmotionLabel`] owns one [`AudioProfile`]: the target descriptor
//! values handed to the catalog as a search hint, the seed genres for the
//! seed-based recommendation call and the free-text search terms.

pub mod weights;

use std::collections::BTreeMap;

use crate::emotion::EmotionLabel;

/// The catalog accepts at most this many seed genres per request.
pub const MAX_SEED_GENRES: usize = 5;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum_macros::Display,
    strum_macros::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum Feature {
    Valence,
    Energy,
    Tempo,
    Danceability,
    Instrumentalness,
    Acousticness,
    Mode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioProfile {
    pub emotion: EmotionLabel,
    pub targets: BTreeMap<Feature, f32>,
    pub seed_genres: Vec<&'static str>,
    pub search_terms: Vec<&'static str>,
}

impl AudioProfile {
    pub fn target(&self, feature: Feature) -> Option<f32> {
        self.targets.get(&feature).copied()
    }

    /// Seed genres clipped to what the catalog will accept.
    pub fn seeds_for_request(&self) -> &[&'static str] {
        let n = self.seed_genres.len().min(MAX_SEED_GENRES);
        &self.seed_genres[..n]
    }
}

struct ProfileRow {
    emotion: EmotionLabel,
    targets: &'static [(Feature, f32)],
    seed_genres: &'static [&'static str],
    search_terms: &'static [&'static str],
}

const PROFILES: &[ProfileRow] = &[
    ProfileRow {
        emotion: EmotionLabel::Sad,
        targets: &[
            (Feature::Valence, 0.1),
            (Feature::Energy, 0.3),
            (Feature::Tempo, 70.0),
            (Feature::Mode, 0.0),
        ],
        seed_genres: &["sad", "acoustic", "piano", "indie"],
        search_terms: &["sad", "melancholy", "somber", "emotional"],
    },
    ProfileRow {
        emotion: EmotionLabel::Angry,
        targets: &[
            (Feature::Valence, 0.2),
            (Feature::Energy, 0.9),
            (Feature::Tempo, 150.0),
            (Feature::Mode, 0.0),
        ],
        seed_genres: &["metal", "hardcore", "heavy-metal", "punk"],
        search_terms: &["angry", "intense", "rage", "heavy metal"],
    },
    ProfileRow {
        emotion: EmotionLabel::Fearful,
        targets: &[
            (Feature::Valence, 0.15),
            (Feature::Energy, 0.6),
            (Feature::Instrumentalness, 0.6),
        ],
        seed_genres: &["ambient", "soundtracks", "experimental"],
        search_terms: &["dark", "tense", "suspense", "atmospheric"],
    },
    ProfileRow {
        emotion: EmotionLabel::Happy,
        targets: &[
            (Feature::Valence, 0.9),
            (Feature::Energy, 0.8),
            (Feature::Danceability, 0.8),
            (Feature::Mode, 1.0),
        ],
        seed_genres: &["pop", "dance", "happy", "party"],
        search_terms: &["happy", "upbeat", "energetic", "dance"],
    },
    ProfileRow {
        emotion: EmotionLabel::Surprise,
        targets: &[(Feature::Valence, 0.7), (Feature::Energy, 0.7)],
        seed_genres: &["pop", "electronic", "soundtracks"],
        search_terms: &["uplifting", "inspiring", "unexpected", "dramatic"],
    },
    ProfileRow {
        emotion: EmotionLabel::Neutral,
        targets: &[(Feature::Valence, 0.5), (Feature::Energy, 0.5)],
        seed_genres: &["indie", "folk", "alt-pop"],
        search_terms: &["chill", "relaxed", "ambient", "easy listening"],
    },
];

pub fn profile_for(emotion: EmotionLabel) -> AudioProfile {
    let row = PROFILES
        .iter()
        .find(|r| r.emotion == emotion)
        .or_else(|| PROFILES.iter().find(|r| r.emotion == EmotionLabel::Neutral))
        .unwrap_or(&PROFILES[PROFILES.len() - 1]);

    AudioProfile {
        emotion: row.emotion,
        targets: row.targets.iter().copied().collect(),
        seed_genres: row.seed_genres.to_vec(),
        search_terms: row.search_terms.to_vec(),
    }
}
