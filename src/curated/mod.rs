use rand::{seq::index, Rng};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::catalog::Track;
use crate::emotion::EmotionLabel;

const BUILTIN_TABLE: &str = include_str!("../../data/curated_songs.json");

#[derive(Debug, thiserror::Error)]
pub enum CuratedError {
    #[error("failed to read curated table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("curated table is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("curated table names unknown emotion {0:?}")]
    UnknownEmotion(String),
    #[error("curated table has no neutral entries")]
    MissingNeutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CuratedSong {
    pub title: String,
    pub artist: String,
}

type RawTable = BTreeMap<String, BTreeMap<String, Vec<CuratedSong>>>;

/// Static (emotion, language) -> songs table.
#[derive(Debug, Clone)]
pub struct CuratedCatalog {
    table: HashMap<EmotionLabel, BTreeMap<String, Vec<CuratedSong>>>,
}

impl CuratedCatalog {
    pub fn builtin() -> Result<Self, CuratedError> {
        Self::from_json(BUILTIN_TABLE)
    }

    pub fn load(path: Option<&Path>) -> Result<Self, CuratedError> {
        let Some(path) = path else {
            return Self::builtin();
        };
        let raw = std::fs::read_to_string(path).map_err(|source| CuratedError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json(&raw)?;
        info!("Loaded curated table from {}", path.display());
        Ok(catalog)
    }

    /// Emotion keys must be canonical names or aliases; language keys are
    /// folded to lowercase.
    pub fn from_json(raw: &str) -> Result<Self, CuratedError> {
        let parsed: RawTable = serde_json::from_str(raw)?;
        let mut table = HashMap::new();
        for (emotion, languages) in parsed {
            let label = EmotionLabel::from_str(emotion.trim())
                .map_err(|_| CuratedError::UnknownEmotion(emotion.clone()))?;
            let languages = languages
                .into_iter()
                .map(|(lang, songs)| (lang.to_lowercase(), songs))
                .collect();
            table.insert(label, languages);
        }
        if !table.contains_key(&EmotionLabel::Neutral) {
            return Err(CuratedError::MissingNeutral);
        }
        Ok(CuratedCatalog { table })
    }

    /// Emotions without their own entries borrow the neutral table.
    fn table_for(&self, emotion: EmotionLabel) -> Option<&BTreeMap<String, Vec<CuratedSong>>> {
        self.table
            .get(&emotion)
            .or_else(|| self.table.get(&EmotionLabel::Neutral))
    }

    pub fn songs(&self, emotion: EmotionLabel, language: &str) -> &[CuratedSong] {
        self.table_for(emotion)
            .and_then(|langs| langs.get(&language.to_lowercase()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn languages(&self) -> Vec<String> {
        let mut langs: Vec<String> = self
            .table
            .values()
            .flat_map(|langs| langs.keys().cloned())
            .collect();
        langs.sort();
        langs.dedup();
        langs
    }

    /// Draws up to `count` distinct songs across `languages`.
    ///
    /// Each language contributes a random sample of up to `count` songs; the
    /// samples are interleaved in request order so truncation keeps every
    /// language represented. A short result is topped up from each language's
    /// unused songs, again in request order.
    pub fn lookup<R: Rng + ?Sized>(
        &self,
        emotion: EmotionLabel,
        languages: &[String],
        count: usize,
        rng: &mut R,
    ) -> Vec<Track> {
        let mut requested: Vec<String> = Vec::new();
        for lang in languages {
            let lang = lang.trim().to_lowercase();
            if !lang.is_empty() && !requested.contains(&lang) {
                requested.push(lang);
            }
        }
        if count == 0 || requested.is_empty() {
            return vec![];
        }

        let draws: Vec<Vec<usize>> = requested
            .iter()
            .map(|lang| {
                let len = self.songs(emotion, lang).len();
                index::sample(&mut *rng, len, len.min(count)).into_vec()
            })
            .collect();

        let mut picked: Vec<Track> = Vec::new();
        let mut used: HashSet<(usize, usize)> = HashSet::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();

        let rounds = draws.iter().map(Vec::len).max().unwrap_or(0);
        for round in 0..rounds {
            for (l, draw) in draws.iter().enumerate() {
                if let Some(&i) = draw.get(round) {
                    used.insert((l, i));
                    let track = self.track(emotion, &requested[l], i);
                    if seen.insert(track.dedupe_key()) {
                        picked.push(track);
                    }
                }
            }
        }

        if picked.len() < count {
            'topup: for (l, lang) in requested.iter().enumerate() {
                for i in 0..self.songs(emotion, lang).len() {
                    if picked.len() >= count {
                        break 'topup;
                    }
                    if used.contains(&(l, i)) {
                        continue;
                    }
                    let track = self.track(emotion, lang, i);
                    if seen.insert(track.dedupe_key()) {
                        picked.push(track);
                    }
                }
            }
        }

        picked.truncate(count);
        picked
    }

    fn track(&self, emotion: EmotionLabel, language: &str, i: usize) -> Track {
        let song = &self.songs(emotion, language)[i];
        Track {
            id: format!("curated:{emotion}:{language}:{i}"),
            title: song.title.clone(),
            artists: vec![song.artist.clone()],
            language: Some(language.to_string()),
        }
    }
}
