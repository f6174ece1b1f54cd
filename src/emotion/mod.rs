pub mod keyword;
pub mod remote;

use async_trait::async_trait;
use std::str::FromStr;

/// Longest text handed to a classifier, in characters.
pub const MAX_INPUT_CHARS: usize = 2000;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumString,
    strum_macros::IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum EmotionLabel {
    #[strum(to_string = "happy", serialize = "joy")]
    Happy,
    #[strum(to_string = "sad", serialize = "sadness")]
    Sad,
    #[strum(to_string = "angry", serialize = "anger")]
    Angry,
    #[strum(to_string = "fearful", serialize = "fear")]
    Fearful,
    #[strum(to_string = "surprise")]
    Surprise,
    #[strum(to_string = "neutral")]
    Neutral,
}

impl EmotionLabel {
    /// Total parse: anything outside the closed set becomes `Neutral`.
    pub fn from_label(label: &str) -> Self {
        EmotionLabel::from_str(label.trim()).unwrap_or(EmotionLabel::Neutral)
    }
}

/// Maps a label emitted by the emotion model onto our closed set.
///
/// The model speaks `joy`, `sadness`, `anger`, `fear`, `surprise`, `neutral`
/// and `disgust`; the last one (and anything unknown) lands on `Neutral`.
pub fn map_model_label(model_label: &str) -> EmotionLabel {
    match model_label.trim().to_ascii_lowercase().as_str() {
        "joy" => EmotionLabel::Happy,
        "sadness" => EmotionLabel::Sad,
        "anger" => EmotionLabel::Angry,
        "fear" => EmotionLabel::Fearful,
        "surprise" => EmotionLabel::Surprise,
        _ => EmotionLabel::Neutral,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub label: EmotionLabel,
    /// Raw per-label scores as reported by the classifier, highest first.
    pub scores: Vec<LabelScore>,
}

impl Detection {
    /// Picks the dominant score and maps it. Empty input is `Neutral`.
    pub fn from_scores(mut scores: Vec<LabelScore>) -> Self {
        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        let label = scores
            .first()
            .map(|s| map_model_label(&s.label))
            .unwrap_or(EmotionLabel::Neutral);
        Detection { label, scores }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("emotion classifier request failed: {0}")]
    Request(String),
    #[error("emotion classifier returned an unexpected payload: {0}")]
    Payload(String),
    #[error("emotion classifier unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    async fn detect(&self, text: &str) -> Result<Detection, ClassifierError>;
}

pub fn truncate_input(text: &str) -> &str {
    match text.char_indices().nth(MAX_INPUT_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
