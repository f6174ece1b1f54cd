use serde::{Deserialize, Serialize};

use crate::catalog::Track;

/// Body of `POST /recommend`. Everything is optional at the wire level so a
/// missing `user_text` surfaces as a validation error, not a decode error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub user_text: Option<String>,
    #[serde(default)]
    pub languages: Option<Vec<String>>,
    #[serde(default)]
    pub count: Option<usize>,
}

impl RecommendRequest {
    pub fn new(text: impl Into<String>) -> Self {
        RecommendRequest {
            user_text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_languages<S: AsRef<str>>(mut self, languages: &[S]) -> Self {
        self.languages = Some(languages.iter().map(|l| l.as_ref().to_string()).collect());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub artist: String,
    pub language: String,
}

impl Recommendation {
    pub fn from_track(track: &Track, language: String) -> Self {
        Recommendation {
            title: track.title.clone(),
            artist: track.artists.join(", "),
            language,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub emotion: String,
    pub recommendations: Vec<Recommendation>,
}

/// Language tag for the shortlist entry at `position`: the source's own tag
/// when it has one, otherwise round-robin over the requested languages.
pub fn language_for(track: &Track, position: usize, requested: &[String]) -> String {
    if let Some(ref lang) = track.language {
        return lang.clone();
    }
    if requested.is_empty() {
        return "unknown".to_string();
    }
    requested[position % requested.len()].clone()
}
