#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use http_body_util::BodyExt;
    use hyper::{Method, StatusCode};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::app::{state::RecommendRequest, App, RecommendError, Settings};
    use crate::catalog::{fetch_descriptors, CatalogError, CatalogSearch, Track, TrackDescriptor};
    use crate::config::{CatalogStrategy, PoolPolicy};
    use crate::curated::CuratedCatalog;
    use crate::emotion::{ClassifierError, Detection, EmotionClassifier, LabelScore};
    use crate::mood::AudioProfile;
    use crate::server::routes::{route, HttpResponse};

    const TIMEOUT: Duration = Duration::from_secs(5);

    // ── Fakes ────────────────────────────────────────────────────────────────

    struct FixedClassifier {
        label: &'static str,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FixedClassifier {
        fn new(label: &'static str) -> Arc<Self> {
            Arc::new(FixedClassifier { label, fail: false, calls: AtomicUsize::new(0) })
        }

        fn failing() -> Arc<Self> {
            Arc::new(FixedClassifier { label: "neutral", fail: true, calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl EmotionClassifier for FixedClassifier {
        async fn detect(&self, _text: &str) -> Result<Detection, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ClassifierError::Unavailable("model is loading".into()));
            }
            Ok(Detection::from_scores(vec![
                LabelScore { label: self.label.into(), score: 0.9 },
                LabelScore { label: "neutral".into(), score: 0.1 },
            ]))
        }
    }

    #[derive(Default)]
    struct FakeCatalog {
        tracks: Vec<Track>,
        descriptors: Vec<TrackDescriptor>,
        /// Only this query returns tracks, when set.
        only_query: Option<String>,
        fail: bool,
        fail_feature_batch: Option<usize>,
        searches: Mutex<Vec<String>>,
        seed_calls: AtomicUsize,
        feature_batches: Mutex<Vec<usize>>,
    }

    impl FakeCatalog {
        fn search_count(&self) -> usize {
            self.searches.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CatalogSearch for FakeCatalog {
        async fn search(&self, query: &str, limit: u32) -> Result<Vec<Track>, CatalogError> {
            self.searches.lock().unwrap().push(query.to_string());
            if self.fail {
                return Err(CatalogError::Request("503 Service Unavailable".into()));
            }
            if matches!(self.only_query, Some(ref q) if q != query) {
                return Ok(vec![]);
            }
            Ok(self.tracks.iter().take(limit as usize).cloned().collect())
        }

        async fn recommend_by_seeds(
            &self,
            _profile: &AudioProfile,
            limit: u32,
        ) -> Result<Vec<Track>, CatalogError> {
            self.seed_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CatalogError::Request("404 Not Found".into()));
            }
            Ok(self.tracks.iter().take(limit as usize).cloned().collect())
        }

        async fn audio_features(&self, ids: &[String]) -> Result<Vec<TrackDescriptor>, CatalogError> {
            let batch = {
                let mut batches = self.feature_batches.lock().unwrap();
                batches.push(ids.len());
                batches.len() - 1
            };
            if self.fail_feature_batch == Some(batch) {
                return Err(CatalogError::Request("500 Internal Server Error".into()));
            }
            Ok(self
                .descriptors
                .iter()
                .filter(|d| ids.contains(&d.track_id))
                .cloned()
                .collect())
        }
    }

    fn live_track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: format!("Live {id}"),
            artists: vec![format!("Band {id}")],
            language: None,
        }
    }

    fn descriptor(id: &str, level: f32) -> TrackDescriptor {
        TrackDescriptor {
            track_id: id.to_string(),
            valence: Some(level),
            energy: Some(level),
            tempo: Some(60.0 + 70.0 * level),
            danceability: Some(level),
            instrumentalness: Some(0.1),
            acousticness: Some(1.0 - level),
            mode: Some(1.0),
        }
    }

    fn app(classifier: Arc<FixedClassifier>, catalog: Option<Arc<FakeCatalog>>, settings: Settings) -> App {
        App::new(
            classifier,
            catalog.map(|c| c as Arc<dyn CatalogSearch>),
            CuratedCatalog::builtin().unwrap(),
            settings,
        )
    }

    fn langs() -> Vec<String> {
        vec!["hindi".to_string(), "malayalam".to_string()]
    }

    async fn body_json(response: HttpResponse) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    // ── Orchestrator ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_sad_text_gets_localized_shortlist() {
        let app = app(FixedClassifier::new("sadness"), None, Settings::default());
        let response = app
            .recommend(RecommendRequest::new("I feel so sad and lonely today").with_languages(&langs()).with_count(5))
            .await
            .unwrap();

        assert_eq!(response.emotion, "sad");
        assert_eq!(response.recommendations.len(), 5);
        for rec in &response.recommendations {
            assert!(langs().contains(&rec.language), "unexpected language {}", rec.language);
        }
        let tagged: HashSet<&str> = response.recommendations.iter().map(|r| r.language.as_str()).collect();
        assert_eq!(tagged.len(), 2, "both languages should be represented");
    }

    #[tokio::test]
    async fn test_missing_text_is_rejected_before_any_call() {
        let classifier = FixedClassifier::new("joy");
        let catalog = Arc::new(FakeCatalog { tracks: vec![live_track("a")], ..Default::default() });
        let app = app(classifier.clone(), Some(catalog.clone()), Settings::default());

        for request in [RecommendRequest::default(), RecommendRequest::new("   ")] {
            let err = app.recommend(request).await.unwrap_err();
            assert!(matches!(err, RecommendError::InvalidInput(_)));
            assert!(err.is_client_error());
        }
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
        assert_eq!(catalog.search_count(), 0);
    }

    #[tokio::test]
    async fn test_count_out_of_range_is_rejected() {
        let app = app(FixedClassifier::new("joy"), None, Settings::default());
        for count in [0, 51] {
            let err = app.recommend(RecommendRequest::new("hi").with_count(count)).await.unwrap_err();
            assert!(matches!(err, RecommendError::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn test_failing_catalog_still_returns_curated() {
        let catalog = Arc::new(FakeCatalog { fail: true, ..Default::default() });
        let app = app(FixedClassifier::new("joy"), Some(catalog.clone()), Settings::default());

        let response = app
            .recommend(RecommendRequest::new("what a great day").with_languages(&langs()).with_count(5))
            .await
            .unwrap();
        assert_eq!(response.emotion, "happy");
        assert_eq!(response.recommendations.len(), 5);
        // All term queries failed, so no fallback query is attempted.
        assert_eq!(catalog.search_count(), 4);
    }

    #[tokio::test]
    async fn test_classifier_failure_propagates() {
        let app = app(FixedClassifier::failing(), None, Settings::default());
        let err = app.recommend(RecommendRequest::new("hello")).await.unwrap_err();
        assert!(matches!(err, RecommendError::Classifier(_)));
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn test_live_first_tags_round_robin() {
        let catalog = Arc::new(FakeCatalog {
            tracks: vec![live_track("a"), live_track("b"), live_track("c")],
            ..Default::default()
        });
        let settings = Settings {
            clustering: false,
            pool_policy: PoolPolicy::LiveFirst,
            ..Settings::default()
        };
        let app = app(FixedClassifier::new("sadness"), Some(catalog), settings);

        let response = app
            .recommend(RecommendRequest::new("gloomy").with_languages(&langs()).with_count(5))
            .await
            .unwrap();
        let recs = &response.recommendations;
        assert_eq!(recs.len(), 5);
        let live: Vec<(&str, &str)> = recs[..3].iter().map(|r| (r.title.as_str(), r.language.as_str())).collect();
        assert_eq!(live, vec![("Live a", "hindi"), ("Live b", "malayalam"), ("Live c", "hindi")]);
        assert!(recs[3..].iter().all(|r| !r.title.starts_with("Live")));
    }

    #[tokio::test]
    async fn test_empty_search_widens_query() {
        let catalog = Arc::new(FakeCatalog {
            tracks: vec![live_track("x")],
            only_query: Some("neutral mood".into()),
            ..Default::default()
        });
        let settings = Settings {
            clustering: false,
            pool_policy: PoolPolicy::LiveFirst,
            ..Settings::default()
        };
        let app = app(FixedClassifier::new("disgust"), Some(catalog.clone()), settings);

        let response = app
            .recommend(RecommendRequest::new("meh").with_languages(&["hindi"]).with_count(3))
            .await
            .unwrap();
        assert_eq!(response.emotion, "neutral");
        assert_eq!(response.recommendations[0].title, "Live x");
        assert_eq!(catalog.search_count(), 5);
    }

    #[tokio::test]
    async fn test_seed_strategy_skips_search() {
        let catalog = Arc::new(FakeCatalog { tracks: vec![live_track("s")], ..Default::default() });
        let settings = Settings {
            clustering: false,
            strategy: CatalogStrategy::Seeds,
            pool_policy: PoolPolicy::LiveFirst,
            ..Settings::default()
        };
        let app = app(FixedClassifier::new("anger"), Some(catalog.clone()), settings);

        let response = app.recommend(RecommendRequest::new("furious").with_count(2)).await.unwrap();
        assert_eq!(catalog.seed_calls.load(Ordering::SeqCst), 1);
        assert_eq!(catalog.search_count(), 0);
        assert_eq!(response.recommendations[0].title, "Live s");
    }

    #[tokio::test]
    async fn test_clustering_keeps_best_matching_group() {
        let ids = ["a", "b", "c", "d", "e", "f"];
        let levels = [0.9, 0.1, 0.95, 0.15, 0.85, 0.05];
        let catalog = Arc::new(FakeCatalog {
            tracks: ids.iter().map(|id| live_track(id)).collect(),
            descriptors: ids.iter().zip(levels).map(|(id, l)| descriptor(id, l)).collect(),
            ..Default::default()
        });
        let settings = Settings {
            clusters: 2,
            pool_policy: PoolPolicy::LiveFirst,
            default_languages: vec![],
            ..Settings::default()
        };
        let app = app(FixedClassifier::new("joy"), Some(catalog.clone()), settings);

        let response = app.recommend(RecommendRequest::new("so happy").with_count(5)).await.unwrap();
        let titles: HashSet<&str> = response.recommendations.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, HashSet::from(["Live a", "Live c", "Live e"]));
        assert!(response.recommendations.iter().all(|r| r.language == "unknown"));
        assert_eq!(*catalog.feature_batches.lock().unwrap(), vec![6]);
    }

    // ── Descriptor batching ──────────────────────────────────────────────────

    #[tokio::test]
    async fn test_descriptor_batches_skip_failures() {
        let tracks: Vec<Track> = (0..250).map(|i| live_track(&i.to_string())).collect();
        let catalog = FakeCatalog {
            descriptors: tracks.iter().map(|t| descriptor(&t.id, 0.5)).collect(),
            fail_feature_batch: Some(1),
            ..Default::default()
        };

        let found = fetch_descriptors(&catalog, &tracks).await;
        assert_eq!(*catalog.feature_batches.lock().unwrap(), vec![100, 100, 50]);
        assert_eq!(found.len(), 150);
        assert!(found.iter().all(|d| {
            let i: usize = d.track_id.parse().unwrap();
            !(100..200).contains(&i)
        }));
    }

    // ── HTTP routes ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = app(FixedClassifier::new("joy"), None, Settings::default());
        let response = route(&app, TIMEOUT, &Method::GET, "/health", b"").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_recommend_endpoint_ok() {
        let app = app(FixedClassifier::new("fear"), None, Settings::default());
        let body = br#"{"user_text":"I'm scared of tomorrow","languages":["malayalam"],"count":3}"#;
        let response = route(&app, TIMEOUT, &Method::POST, "/recommend", body).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["emotion"], "fearful");
        let recs = json["recommendations"].as_array().unwrap();
        assert_eq!(recs.len(), 3);
        assert!(recs.iter().all(|r| r["language"] == "malayalam"));
    }

    #[tokio::test]
    async fn test_recommend_endpoint_client_errors() {
        let classifier = FixedClassifier::new("joy");
        let app = app(classifier.clone(), None, Settings::default());

        let missing = route(&app, TIMEOUT, &Method::POST, "/recommend", b"{}").await;
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(missing).await["error"].as_str().unwrap().contains("user_text"));

        let empty = route(&app, TIMEOUT, &Method::POST, "/recommend", b"").await;
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

        let garbled = route(&app, TIMEOUT, &Method::POST, "/recommend", b"{not json").await;
        assert_eq!(garbled.status(), StatusCode::BAD_REQUEST);

        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_recommend_endpoint_server_error() {
        let app = app(FixedClassifier::failing(), None, Settings::default());
        let response = route(&app, TIMEOUT, &Method::POST, "/recommend", br#"{"user_text":"hi"}"#).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_routes_and_methods() {
        let app = app(FixedClassifier::new("joy"), None, Settings::default());
        assert_eq!(route(&app, TIMEOUT, &Method::GET, "/nope", b"").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            route(&app, TIMEOUT, &Method::GET, "/recommend", b"").await.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        let preflight = route(&app, TIMEOUT, &Method::OPTIONS, "/recommend", b"").await;
        assert_eq!(preflight.status(), StatusCode::NO_CONTENT);
        assert!(preflight.headers().contains_key("access-control-allow-methods"));
    }
}
