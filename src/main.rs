//! # News in 60s
//!
//! A news digest front-end that asks Gemini, with Google Search grounding, for
//! the top stories of a category in a chosen language and region, then parses
//! the model's answer into typed article cards.
//!
//! ## Usage
//!
//! ```sh
//! news_in_60s --category technology --language hi --region mumbai
//! news_in_60s --all-categories -j ./json -m ./markdown
//! news_in_60s --interactive
//! ```
//!
//! ## Architecture
//!
//! 1. **Filters**: category, language and region from flags, config or the session
//! 2. **Fetching**: one `generateContent` call per filter triple
//! 3. **Normalizing**: the JSON array is cut out of the answer and every record
//!    is defaulted into an `Article`
//! 4. **Output**: terminal cards, and optionally JSON and Markdown files

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod models;
mod normalize;
mod outputs;
mod pipeline;
mod prompt;
mod session;
mod utils;

use api::GeminiClient;
use error::FetchFailed;
use cli::Cli;
use models::{Category, Edition, EditionSection};
use outputs::{cards, json, markdown};
use pipeline::NewsFetcher;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args.category, ?args.language, ?args.region, "Parsed CLI arguments");

    let file_config = config::load_for(&args)?;
    let app = config::resolve(&args, file_config)?;
    info!(
        filters = %app.filters,
        model = %app.gemini.model,
        google_search = app.gemini.google_search,
        "news_in_60s starting up"
    );

    // Early check: output directories must be writable before spending a request
    for dir in [&args.json_output_dir, &args.markdown_output_dir].into_iter().flatten() {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Output directory is not writable");
            return Err(e);
        }
    }

    let client = GeminiClient::new(app.api_key.clone(), app.gemini.clone())?;
    let fetcher = NewsFetcher::new(client);
    let filters = app.filters;

    if args.interactive {
        return session::run_interactive(Arc::new(fetcher), filters).await;
    }

    let edition = if args.all_categories {
        match fetcher
            .fetch_edition(filters.language, filters.region, &Category::ALL)
            .await
        {
            Ok(edition) => edition,
            Err(e) => {
                error!(error = %e, "Edition fetch failed");
                return Err(FetchFailed::from(e).into());
            }
        }
    } else {
        match fetcher
            .fetch_news(filters.category, filters.language, filters.region)
            .await
        {
            Ok(articles) => single_section_edition(filters, articles),
            Err(e) => {
                error!(error = %e, "Fetch failed");
                return Err(FetchFailed::from(e).into());
            }
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&edition)?);
    } else {
        println!("{}", cards::render_edition(&edition));
    }

    if let Some(dir) = args.json_output_dir.as_deref() {
        if let Err(e) = json::write_edition(&edition, dir).await {
            error!(error = %e, "Failed to write JSON edition");
        }
    }
    if let Some(dir) = args.markdown_output_dir.as_deref() {
        if let Err(e) = markdown::write_edition(&edition, dir).await {
            error!(error = %e, "Failed to write Markdown edition");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        articles = edition.article_count(),
        sections = edition.sections.len(),
        "Execution complete"
    );
    Ok(())
}

fn single_section_edition(filters: models::FilterState, articles: Vec<models::Article>) -> Edition {
    let now = chrono::Local::now();
    Edition {
        local_date: now.date_naive().to_string(),
        local_time: now.format("%H:%M:%S").to_string(),
        language: filters.language.code.to_string(),
        region: filters.region.code.to_string(),
        sections: vec![EditionSection {
            category: filters.category,
            articles,
        }],
    }
}
