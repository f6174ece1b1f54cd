//! Per-emotion cluster scoring weights.
//!
//! These are heuristics, not measurements: tune them here. A centroid's tempo
//! component is already normalised to `tempo / 200`.

use crate::emotion::EmotionLabel;

use super::Feature;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Polarity {
    /// Contributes `weight * value`.
    Direct,
    /// Contributes `weight * (1 - value)`.
    Inverse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightTerm {
    pub feature: Feature,
    pub weight: f32,
    pub polarity: Polarity,
}

const fn direct(feature: Feature, weight: f32) -> WeightTerm {
    WeightTerm { feature, weight, polarity: Polarity::Direct }
}

const fn inverse(feature: Feature, weight: f32) -> WeightTerm {
    WeightTerm { feature, weight, polarity: Polarity::Inverse }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub terms: &'static [WeightTerm],
    /// Added to every score; emotions with no terms score every cluster equally.
    pub baseline: f32,
}

pub const HAPPY_WEIGHTS: ScoringWeights = ScoringWeights {
    terms: &[
        direct(Feature::Valence, 0.5),
        direct(Feature::Energy, 0.3),
        direct(Feature::Danceability, 0.2),
    ],
    baseline: 0.0,
};

pub const SAD_WEIGHTS: ScoringWeights = ScoringWeights {
    terms: &[
        inverse(Feature::Valence, 0.5),
        inverse(Feature::Energy, 0.3),
        inverse(Feature::Tempo, 0.2),
    ],
    baseline: 0.0,
};

pub const ANGRY_WEIGHTS: ScoringWeights = ScoringWeights {
    terms: &[direct(Feature::Energy, 0.6), inverse(Feature::Valence, 0.4)],
    baseline: 0.0,
};

pub const FEARFUL_WEIGHTS: ScoringWeights = ScoringWeights {
    terms: &[
        inverse(Feature::Valence, 0.4),
        direct(Feature::Energy, 0.3),
        inverse(Feature::Danceability, 0.3),
    ],
    baseline: 0.0,
};

pub const NO_PREFERENCE: ScoringWeights = ScoringWeights { terms: &[], baseline: 0.5 };

pub fn weights_for(emotion: EmotionLabel) -> &'static ScoringWeights {
    match emotion {
        EmotionLabel::Happy => &HAPPY_WEIGHTS,
        EmotionLabel::Sad => &SAD_WEIGHTS,
        EmotionLabel::Angry => &ANGRY_WEIGHTS,
        EmotionLabel::Fearful => &FEARFUL_WEIGHTS,
        EmotionLabel::Surprise | EmotionLabel::Neutral => &NO_PREFERENCE,
    }
}

impl ScoringWeights {
    /// Scores a centroid; features the centroid lacks count as zero.
    pub fn score<F>(&self, centroid: F) -> f32
    where
        F: Fn(Feature) -> Option<f32>,
    {
        self.terms.iter().fold(self.baseline, |acc, term| {
            let value = centroid(term.feature).unwrap_or(0.0);
            let contribution = match term.polarity {
                Polarity::Direct => value,
                Polarity::Inverse => 1.0 - value,
            };
            acc + term.weight * contribution
        })
    }
}
