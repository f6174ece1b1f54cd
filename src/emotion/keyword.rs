use async_trait::async_trait;

use super::{truncate_input, ClassifierError, Detection, EmotionClassifier, LabelScore};

// ── Lexicon ─────────────────────────────────────────────────────────────────

/// (model label, keywords). Labels use the model's vocabulary so the same
/// mapping table applies to both classifiers.
const LEXICON: &[(&str, &[&str])] = &[
    (
        "sadness",
        &[
            "sad", "lonely", "alone", "cry", "crying", "tears", "heartbroken", "miss",
            "grief", "depressed", "down", "hopeless", "lost", "empty", "hurt",
        ],
    ),
    (
        "joy",
        &[
            "happy", "joy", "great", "wonderful", "excited", "love", "amazing", "fantastic",
            "glad", "celebrate", "awesome", "cheerful", "delighted", "fun", "smile",
        ],
    ),
    (
        "anger",
        &[
            "angry", "furious", "hate", "mad", "annoyed", "rage", "irritated", "pissed",
            "frustrated", "outraged", "livid",
        ],
    ),
    (
        "fear",
        &[
            "afraid", "scared", "fear", "anxious", "nervous", "terrified", "worried",
            "panic", "dread", "frightened",
        ],
    ),
    (
        "surprise",
        &[
            "surprised", "shocked", "unexpected", "wow", "astonished", "unbelievable",
            "suddenly", "stunned",
        ],
    ),
];

/// Offline lexicon classifier used when no model endpoint is configured.
#[derive(Debug, Default, Clone)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        KeywordClassifier
    }

    pub fn scores(&self, text: &str) -> Vec<LabelScore> {
        let lower = truncate_input(text).to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| !w.is_empty())
            .collect();

        let hits: Vec<(&str, usize)> = LEXICON
            .iter()
            .map(|&(label, keywords)| {
                let count = words.iter().filter(|w| keywords.contains(w)).count();
                (label, count)
            })
            .collect();

        let total: usize = hits.iter().map(|(_, c)| c).sum();
        if total == 0 {
            return vec![LabelScore { label: "neutral".into(), score: 1.0 }];
        }

        hits.into_iter()
            .map(|(label, count)| LabelScore {
                label: label.to_string(),
                score: count as f32 / total as f32,
            })
            .collect()
    }
}

#[async_trait]
impl EmotionClassifier for KeywordClassifier {
    async fn detect(&self, text: &str) -> Result<Detection, ClassifierError> {
        Ok(Detection::from_scores(self.scores(text)))
    }
}
