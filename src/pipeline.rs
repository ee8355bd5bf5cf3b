//! The news fetch pipeline: prompt, one model call, extraction, normalization.
//!
//! [`NewsFetcher::fetch_news`] produces the articles for a single filter triple.
//! [`NewsFetcher::fetch_edition`] runs several categories concurrently and
//! assembles an [`Edition`], skipping categories whose fetch failed.

use crate::api::AskAsync;
use crate::error::FetchError;
use crate::models::{Article, Category, Edition, EditionSection, Language, Region};
use crate::normalize::{normalize, object_record_count, parse_articles};
use crate::prompt::build_prompt;
use crate::utils::truncate_for_log;
use chrono::Local;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Upper bound on concurrent category fetches for an edition.
pub const PARALLEL_CATEGORIES: usize = 3;

/// Fetches digests through any [`AskAsync`] transport.
#[derive(Debug)]
pub struct NewsFetcher<A> {
    transport: A,
}

impl<A> NewsFetcher<A>
where
    A: AskAsync<Response = String> + Sync,
{
    pub fn new(transport: A) -> Self {
        Self { transport }
    }

    /// Fetch and normalize the top stories for one filter triple.
    ///
    /// Issues exactly one model call. Any transport or parse failure fails the
    /// whole fetch; there is no partial result.
    ///
    /// # Arguments
    ///
    /// * `category` - News category to ask for
    /// * `language` - Language the stories are written in
    /// * `region` - Region to focus on; the global region asks for world news
    ///
    /// # Returns
    ///
    /// The normalized articles in the order the model listed them, repeated
    /// titles removed. An empty array from the model yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns the [`FetchError`] of the model call or of extracting the array.
    #[instrument(level = "info", skip_all, fields(%category, language = %language.code, region = %region.code))]
    pub async fn fetch_news(
        &self,
        category: Category,
        language: &Language,
        region: &Region,
    ) -> Result<Vec<Article>, FetchError> {
        let t0 = Instant::now();
        let prompt = build_prompt(category, language, region);
        debug!(prompt_chars = prompt.chars().count(), "Built prompt");

        let text = self.transport.ask(&prompt).await.inspect_err(|e| {
            error!(elapsed_ms = t0.elapsed().as_millis() as u64, error = %e, "Model call failed");
        })?;

        let raw = parse_articles(&text).inspect_err(|e| {
            error!(elapsed_ms = t0.elapsed().as_millis() as u64, error = %e, "Could not parse model output");
        })?;

        let received = raw.len();
        if received > 0 && object_record_count(&raw) == 0 {
            warn!(
                received,
                response_preview = %truncate_for_log(&text, 300),
                "Model output contains no article objects"
            );
        }
        let unique = dedupe_records(raw);
        if unique.len() < received {
            info!(received, kept = unique.len(), "Dropped repeated stories");
        }

        let articles = normalize(&unique, category, language, region, Local::now());
        info!(
            count = articles.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched news"
        );
        Ok(articles)
    }

    /// Fetch several categories for one language and region.
    ///
    /// Categories are fetched concurrently, at most [`PARALLEL_CATEGORIES`] at a
    /// time. Sections keep the order of `categories`. A failed category is
    /// logged and left out.
    ///
    /// # Arguments
    ///
    /// * `language` - Language shared by every section
    /// * `region` - Region shared by every section
    /// * `categories` - Categories to fetch, in display order
    ///
    /// # Returns
    ///
    /// An [`Edition`] stamped with the local date and time of the request.
    ///
    /// # Errors
    ///
    /// Returns the last category's error if every category failed.
    #[instrument(level = "info", skip_all, fields(language = %language.code, region = %region.code))]
    pub async fn fetch_edition(
        &self,
        language: &Language,
        region: &Region,
        categories: &[Category],
    ) -> Result<Edition, FetchError> {
        let now = Local::now();
        let results: Vec<(usize, Category, Result<Vec<Article>, FetchError>)> =
            stream::iter(categories.iter().copied().enumerate())
                .map(|(i, category)| async move {
                    (i, category, self.fetch_news(category, language, region).await)
                })
                .buffer_unordered(PARALLEL_CATEGORIES)
                .collect()
                .await;

        let mut sections = Vec::new();
        let mut last_error = None;
        for (_, category, result) in results.into_iter().sorted_by_key(|(i, _, _)| *i) {
            match result {
                Ok(articles) => sections.push(EditionSection { category, articles }),
                Err(e) => {
                    warn!(%category, error = %e, "Category failed; leaving it out of the edition");
                    last_error = Some(e);
                }
            }
        }

        if sections.is_empty() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        let edition = Edition {
            local_date: now.date_naive().to_string(),
            local_time: now.format("%H:%M:%S").to_string(),
            language: language.code.to_string(),
            region: region.code.to_string(),
            sections,
        };
        info!(
            sections = edition.sections.len(),
            articles = edition.article_count(),
            "Edition assembled"
        );
        Ok(edition)
    }
}

/// Drop records whose title repeats an earlier record's title (case-folded).
///
/// Records without a usable title are always kept.
fn dedupe_records(raw: Vec<Value>) -> Vec<Value> {
    raw.into_iter()
        .enumerate()
        .unique_by(|(i, item)| {
            match item.get("title").and_then(Value::as_str).map(|t| t.trim().to_lowercase()) {
                Some(t) if !t.is_empty() => t,
                _ => format!("\u{0}untitled-{i}"),
            }
        })
        .map(|(_, item)| item)
        .collect()
}
