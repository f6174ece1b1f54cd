use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{truncate_input, ClassifierError, Detection, EmotionClassifier, LabelScore};

/// Text-classification endpoint in the Hugging Face inference format:
/// `POST {"inputs": "..."}` answered with `[{label, score}, ...]`, optionally
/// wrapped in an outer array.
pub struct RemoteClassifier {
    http: reqwest::Client,
    url: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize)]
struct RawScore {
    label: String,
    score: f32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Nested(Vec<Vec<RawScore>>),
    Flat(Vec<RawScore>),
}

impl ClassifyResponse {
    fn into_scores(self) -> Vec<LabelScore> {
        let flat = match self {
            ClassifyResponse::Nested(outer) => outer.into_iter().next().unwrap_or_default(),
            ClassifyResponse::Flat(scores) => scores,
        };
        flat.into_iter()
            .map(|s| LabelScore { label: s.label, score: s.score })
            .collect()
    }
}

impl RemoteClassifier {
    pub fn new(url: impl Into<String>, token: Option<String>) -> Result<Self, ClassifierError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;
        Ok(RemoteClassifier { http, url: url.into(), token })
    }
}

pub(crate) fn parse_response(body: &str) -> Result<Vec<LabelScore>, ClassifierError> {
    let parsed: ClassifyResponse =
        serde_json::from_str(body).map_err(|e| ClassifierError::Payload(e.to_string()))?;
    let scores = parsed.into_scores();
    if scores.is_empty() {
        return Err(ClassifierError::Payload("no label scores".into()));
    }
    Ok(scores)
}

#[async_trait]
impl EmotionClassifier for RemoteClassifier {
    async fn detect(&self, text: &str) -> Result<Detection, ClassifierError> {
        let mut req = self
            .http
            .post(&self.url)
            .json(&ClassifyRequest { inputs: truncate_input(text) });
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }

        let res = req
            .send()
            .await
            .map_err(|e| ClassifierError::Request(e.to_string()))?;
        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| ClassifierError::Request(e.to_string()))?;
        if !status.is_success() {
            return Err(ClassifierError::Request(format!("{status}: {body}")));
        }

        let scores = parse_response(&body)?;
        debug!("Classifier returned {} label scores", scores.len());
        Ok(Detection::from_scores(scores))
    }
}
