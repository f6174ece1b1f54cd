use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const MAX_COUNT: usize = 50;

/// How the live candidate pool is gathered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum CatalogStrategy {
    /// One free-text search per mood search term.
    Search,
    /// Seed-genre recommendations with audio targets.
    Seeds,
}

/// Which source fills the shortlist first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PoolPolicy {
    LocalizedFirst,
    LiveFirst,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redis_url: String,
    pub bind_addr: String,
    pub classifier_url: Option<String>,
    pub classifier_token: Option<String>,
    pub default_languages: Vec<String>,
    pub default_count: usize,
    pub clustering: bool,
    pub clusters: usize,
    pub strategy: CatalogStrategy,
    pub pool_policy: PoolPolicy,
    pub market: String,
    pub request_timeout: Duration,
    pub curated_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            client_id: None,
            client_secret: None,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            bind_addr: "0.0.0.0:5000".to_string(),
            classifier_url: None,
            classifier_token: None,
            default_languages: vec!["hindi".to_string(), "malayalam".to_string()],
            default_count: 5,
            clustering: true,
            clusters: crate::refine::DEFAULT_CLUSTERS,
            strategy: CatalogStrategy::Search,
            pool_policy: PoolPolicy::LocalizedFirst,
            market: "US".to_string(),
            request_timeout: Duration::from_secs(30),
            curated_path: None,
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{key} must be a boolean, got {other:?}"),
    }
}

fn parse_num<T: FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("{key} must be a number, got {raw:?}"))
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenv().ok(); // A missing .env is fine; plain environment variables work too.
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        config.client_id = get("SPOTIFY_CLIENT_ID");
        config.client_secret = get("SPOTIFY_CLIENT_SECRET");
        if let Some(url) = get("REDIS_URL") {
            config.redis_url = url;
        }

        if let Some(bind) = get("MOODMIX_BIND") {
            config.bind_addr = bind;
        } else if let Some(port) = get("PORT") {
            let port: u16 = parse_num("PORT", &port)?;
            config.bind_addr = format!("0.0.0.0:{port}");
        }

        config.classifier_url = get("MOODMIX_CLASSIFIER_URL");
        config.classifier_token = get("MOODMIX_CLASSIFIER_TOKEN");

        if let Some(langs) = get("MOODMIX_LANGUAGES") {
            config.default_languages = parse_list(&langs);
        }
        if let Some(count) = get("MOODMIX_COUNT") {
            let count: usize = parse_num("MOODMIX_COUNT", &count)?;
            if count == 0 || count > MAX_COUNT {
                bail!("MOODMIX_COUNT must be between 1 and {MAX_COUNT}, got {count}");
            }
            config.default_count = count;
        }
        if let Some(raw) = get("MOODMIX_CLUSTERING") {
            config.clustering = parse_bool("MOODMIX_CLUSTERING", &raw)?;
        }
        if let Some(raw) = get("MOODMIX_CLUSTERS") {
            let k: usize = parse_num("MOODMIX_CLUSTERS", &raw)?;
            if k == 0 {
                bail!("MOODMIX_CLUSTERS must be at least 1");
            }
            config.clusters = k;
        }
        if let Some(raw) = get("MOODMIX_CATALOG_STRATEGY") {
            config.strategy = CatalogStrategy::from_str(raw.trim())
                .with_context(|| format!("MOODMIX_CATALOG_STRATEGY: unknown strategy {raw:?}"))?;
        }
        if let Some(raw) = get("MOODMIX_POOL_POLICY") {
            config.pool_policy = PoolPolicy::from_str(raw.trim())
                .with_context(|| format!("MOODMIX_POOL_POLICY: unknown policy {raw:?}"))?;
        }
        if let Some(market) = get("MOODMIX_MARKET") {
            config.market = market.trim().to_uppercase();
        }
        if let Some(raw) = get("MOODMIX_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = parse_num("MOODMIX_REQUEST_TIMEOUT_SECS", &raw)?;
            config.request_timeout = Duration::from_secs(secs.max(1));
        }
        config.curated_path = get("MOODMIX_CURATED_PATH").map(PathBuf::from);

        Ok(config)
    }
}
