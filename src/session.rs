//! The current-result slot and the interactive front end that drives it.
//!
//! Every fetch trigger (filter change or manual refresh) is issued a new
//! [`Generation`]. Fetches are never cancelled; when a superseded fetch finally
//! resolves, [`Session::resolve`] sees that its generation is no longer the
//! latest and drops the result, so a slow stale response can never overwrite a
//! newer one.

use crate::api::AskAsync;
use crate::error::FetchError;
use crate::models::{Article, Category, FilterState, Language, Region};
use crate::outputs::cards;
use crate::pipeline::NewsFetcher;
use chrono::{DateTime, Local};
use std::error::Error;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Monotonically increasing fetch token.
pub type Generation = u64;

/// What the presentation layer shows.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedState {
    /// Nothing requested yet.
    Idle,
    Loading,
    Success {
        articles: Vec<Article>,
        fetched_at: DateTime<Local>,
    },
    Error {
        message: String,
    },
}

/// Filter selection plus the single current-result slot.
#[derive(Debug)]
pub struct Session {
    filters: FilterState,
    state: FeedState,
    latest: Generation,
    last_updated: Option<DateTime<Local>>,
}

impl Session {
    pub fn new(filters: FilterState) -> Self {
        Self {
            filters,
            state: FeedState::Idle,
            latest: 0,
            last_updated: None,
        }
    }

    /// The current category, language and region.
    pub fn filters(&self) -> FilterState {
        self.filters
    }

    /// The slot the presentation layer renders.
    pub fn state(&self) -> &FeedState {
        &self.state
    }

    /// Time of the last accepted successful fetch; survives later errors.
    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.last_updated
    }

    /// Token of the most recent trigger; `0` before the first fetch.
    pub fn latest(&self) -> Generation {
        self.latest
    }

    /// Start a fetch for the current filters and return its token.
    pub fn begin(&mut self) -> Generation {
        self.latest += 1;
        self.state = FeedState::Loading;
        debug!(generation = self.latest, filters = %self.filters, "Fetch triggered");
        self.latest
    }

    /// Manual refresh or retry of the current filters.
    pub fn refresh(&mut self) -> Generation {
        self.begin()
    }

    /// Select a category; triggers a fetch only if the selection changed.
    pub fn set_category(&mut self, category: Category) -> Option<Generation> {
        if self.filters.category == category {
            return None;
        }
        self.filters.category = category;
        Some(self.begin())
    }

    pub fn set_language(&mut self, language: &'static Language) -> Option<Generation> {
        if self.filters.language == language {
            return None;
        }
        self.filters.language = language;
        Some(self.begin())
    }

    pub fn set_region(&mut self, region: &'static Region) -> Option<Generation> {
        if self.filters.region == region {
            return None;
        }
        self.filters.region = region;
        Some(self.begin())
    }

    /// Apply the outcome of fetch `generation`.
    ///
    /// # Arguments
    ///
    /// * `generation` - Token returned when the fetch was triggered
    /// * `result` - Outcome of [`NewsFetcher::fetch_news`]
    ///
    /// # Returns
    ///
    /// `true` if the result was applied. `false` if `generation` has been
    /// superseded by a later trigger, in which case the state is left untouched.
    ///
    /// Failures are logged with their cause; the slot only holds the generic
    /// user-facing message.
    pub fn resolve(&mut self, generation: Generation, result: Result<Vec<Article>, FetchError>) -> bool {
        if generation != self.latest {
            debug!(generation, latest = self.latest, "Discarding stale fetch result");
            return false;
        }
        self.state = match result {
            Ok(articles) => {
                let fetched_at = Local::now();
                self.last_updated = Some(fetched_at);
                FeedState::Success { articles, fetched_at }
            }
            Err(e) => {
                warn!(generation, transport = e.is_transport(), error = %e, "Fetch failed");
                FeedState::Error {
                    message: e.user_message().to_string(),
                }
            }
        };
        true
    }
}

/// A line typed at the interactive prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Category(Category),
    Language(&'static Language),
    Region(&'static Region),
    Refresh,
    List,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, String> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or("").to_ascii_lowercase();
        let arg = words.collect::<Vec<_>>().join(" ");

        match verb.as_str() {
            "c" | "category" => arg.parse::<Category>().map(Command::Category),
            "l" | "language" => Language::by_code(&arg)
                .map(Command::Language)
                .ok_or_else(|| format!("unknown language: {arg}")),
            "r" | "region" => Region::by_code(&arg)
                .map(Command::Region)
                .ok_or_else(|| format!("unknown region: {arg}")),
            "refresh" | "retry" => Ok(Command::Refresh),
            "list" | "ls" => Ok(Command::List),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

type Resolution = (Generation, Result<Vec<Article>, FetchError>);

fn spawn_fetch<A>(
    fetcher: &Arc<NewsFetcher<A>>,
    filters: FilterState,
    generation: Generation,
    tx: &mpsc::UnboundedSender<Resolution>,
) where
    A: AskAsync<Response = String> + Send + Sync + 'static,
{
    let fetcher = Arc::clone(fetcher);
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = fetcher
            .fetch_news(filters.category, filters.language, filters.region)
            .await;
        // The receiver is gone only when the session has ended.
        let _ = tx.send((generation, result));
    });
}

/// Run the line-oriented front end until `quit` or end of input.
#[instrument(level = "info", skip_all, fields(filters = %initial))]
pub async fn run_interactive<A>(
    fetcher: Arc<NewsFetcher<A>>,
    initial: FilterState,
) -> Result<(), Box<dyn Error>>
where
    A: AskAsync<Response = String> + Send + Sync + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Resolution>();
    let mut session = Session::new(initial);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", cards::help_text());
    let generation = session.begin();
    spawn_fetch(&fetcher, session.filters(), generation, &tx);
    println!("{}", cards::render_session(&session));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let command = match Command::parse(&line) {
                    Ok(c) => c,
                    Err(msg) => {
                        println!("{msg} (type `help` for commands)");
                        continue;
                    }
                };
                let triggered = match command {
                    Command::Quit => break,
                    Command::Help => {
                        println!("{}", cards::help_text());
                        None
                    }
                    Command::List => {
                        println!("{}", cards::filter_tables());
                        None
                    }
                    Command::Refresh => Some(session.refresh()),
                    Command::Category(c) => session.set_category(c),
                    Command::Language(l) => session.set_language(l),
                    Command::Region(r) => session.set_region(r),
                };
                if let Some(generation) = triggered {
                    spawn_fetch(&fetcher, session.filters(), generation, &tx);
                    println!("{}", cards::render_session(&session));
                }
            }
            Some((generation, result)) = rx.recv() => {
                if session.resolve(generation, result) {
                    println!("{}", cards::render_session(&session));
                }
            }
        }
    }

    info!(fetches = session.latest(), "Interactive session ended");
    Ok(())
}
