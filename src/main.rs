mod app;
mod cache;
mod catalog;
mod config;
mod curated;
mod emotion;
mod events;
mod mood;
mod refine;
mod server;
mod spotify;
mod ui;
#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{
    io::{IsTerminal, Write},
    sync::Arc,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::{
    app::{state::RecommendRequest, App, Settings},
    cache::{token::TokenCache, Cache},
    catalog::CatalogSearch,
    config::Config,
    curated::CuratedCatalog,
    emotion::{keyword::KeywordClassifier, remote::RemoteClassifier, EmotionClassifier},
    events::{map_line_to_action, ChatAction},
};

const CHAT_LOG_PATH: &str = "/tmp/moodmix.log";

#[derive(Parser, Debug)]
#[command(name = "moodmix")]
#[command(about = "Mood-aware song recommendations from free text")]
struct CliArgs {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default).
    Serve {
        /// Address to bind, overrides MOODMIX_BIND.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Interactive console: type how you feel, get a shortlist.
    Chat {
        #[arg(long, value_delimiter = ',')]
        languages: Option<Vec<String>>,
        #[arg(long)]
        count: Option<usize>,
    },
    /// Print one shortlist for the given text and exit.
    Ask {
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        languages: Option<Vec<String>>,
        #[arg(long)]
        count: Option<usize>,
    },
}

fn init_logging(command: &Command) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("moodmix=info"));
    match command {
        Command::Serve { .. } => fmt().with_env_filter(filter).init(),
        // Write logs to file so they don't interleave with the prompt
        Command::Chat { .. } => match std::fs::File::create(CHAT_LOG_PATH) {
            Ok(file) => fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init(),
            Err(_) => fmt().with_env_filter(filter).with_writer(std::io::stderr).init(),
        },
        Command::Ask { .. } => fmt().with_env_filter(filter).with_writer(std::io::stderr).init(),
    }
}

async fn build_app(config: &Config) -> Result<Arc<App>> {
    // ── Redis (optional, second-level token store) ───────────────────────────
    let store = match Cache::connect(&config.redis_url).await {
        Some(cache) => {
            info!("Redis connected at {}", config.redis_url);
            Some(Arc::new(cache))
        }
        None => {
            warn!("Redis not reachable, catalog token kept in memory only");
            None
        }
    };
    let tokens = Arc::new(TokenCache::new(store));

    let catalog: Option<Arc<dyn CatalogSearch>> = spotify::build_spotify_catalog(config, tokens)
        .map(|c| Arc::new(c) as Arc<dyn CatalogSearch>);

    let classifier: Arc<dyn EmotionClassifier> = match config.classifier_url {
        Some(ref url) => {
            info!("Using remote emotion classifier at {url}");
            Arc::new(RemoteClassifier::new(url.clone(), config.classifier_token.clone())?)
        }
        None => {
            info!("MOODMIX_CLASSIFIER_URL not set, using keyword classifier");
            Arc::new(KeywordClassifier::new())
        }
    };

    let curated = CuratedCatalog::load(config.curated_path.as_deref())
        .context("Failed to load curated song table")?;
    info!("Curated languages: {}", curated.languages().join(", "));

    Ok(Arc::new(App::new(classifier, catalog, curated, Settings::from(config))))
}

fn request_for(text: String, languages: &Option<Vec<String>>, count: Option<usize>) -> RecommendRequest {
    let mut request = RecommendRequest::new(text);
    if let Some(ref langs) = languages {
        request = request.with_languages(langs);
    }
    if let Some(n) = count {
        request = request.with_count(n);
    }
    request
}

async fn run_ask(app: &App, text: String, languages: Option<Vec<String>>, count: Option<usize>) -> Result<()> {
    let response = app.recommend(request_for(text, &languages, count)).await?;
    let mut stdout = std::io::stdout();
    if stdout.is_terminal() {
        ui::print_shortlist(&mut stdout, &response)?;
    } else {
        // Piped output stays free of colour codes.
        for line in ui::shortlist_lines(&response) {
            writeln!(stdout, "{line}")?;
        }
    }
    Ok(())
}

async fn run_chat(app: &App, languages: Option<Vec<String>>, count: Option<usize>) -> Result<()> {
    let mut languages = languages.unwrap_or_else(|| app.settings().default_languages.clone());
    let mut count = count.unwrap_or(app.settings().default_count);
    let mut stdout = std::io::stdout();
    ui::print_banner(&mut stdout, &languages, count)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        stdout.flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match map_line_to_action(&line) {
            None => continue,
            Some(ChatAction::Quit) => break,
            Some(ChatAction::Help) => ui::print_help(&mut stdout)?,
            Some(ChatAction::SetLanguages(langs)) => {
                languages = langs;
                println!("Languages: {}", languages.join(", "));
            }
            Some(ChatAction::SetCount(n)) => {
                count = n;
                println!("Shortlist size: {count}");
            }
            Some(ChatAction::Invalid(message)) => ui::print_error(&mut stdout, &message)?,
            Some(ChatAction::Ask(text)) => {
                match app.recommend(request_for(text, &Some(languages.clone()), Some(count))).await {
                    Ok(response) => ui::print_shortlist(&mut stdout, &response)?,
                    Err(e) => ui::print_error(&mut stdout, &e.to_string())?,
                }
            }
        }
    }
    println!("Goodbye!");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    let command = args.command.unwrap_or(Command::Serve { bind: None });
    init_logging(&command);

    let config = Config::load()?;
    let app = build_app(&config).await?;

    match command {
        Command::Serve { bind } => {
            let addr = bind.unwrap_or_else(|| config.bind_addr.clone());
            server::serve(app, &addr, config.request_timeout).await
        }
        Command::Chat { languages, count } => run_chat(&app, languages, count).await,
        Command::Ask { text, languages, count } => run_ask(&app, text.join(" "), languages, count).await,
    }
}
