//! Plain-text cards for the terminal.
//!
//! Everything the model wrote is passed through
//! [`sanitize_for_terminal`] before it is printed.

use crate::models::{Article, Edition, LANGUAGES, REGIONS, Sentiment};
use crate::session::{FeedState, Session};
use crate::utils::sanitize_for_terminal;
use std::fmt::Write;

/// Shown under an empty result in the interactive session.
const GENERAL_NEWS_HINT: &str = "Type `category general` to go to General News.";

const RULE: &str = "────────────────────────────────────────────────────────────";

fn badge(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => "[+ Positive]",
        Sentiment::Neutral => "[= Neutral]",
        Sentiment::Negative => "[- Negative]",
    }
}

/// Render one article as a card.
pub fn render_article(article: &Article) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "{} {}  ·  {}",
        article.category.as_str().to_uppercase(),
        badge(article.sentiment),
        article.timestamp
    );
    let title = sanitize_for_terminal(&article.title);
    let _ = writeln!(out, "{}", if title.is_empty() { "(untitled)".to_string() } else { title });
    for point in &article.summary {
        let _ = writeln!(out, "  • {}", sanitize_for_terminal(point));
    }
    let _ = writeln!(
        out,
        "  {} — {}",
        sanitize_for_terminal(&article.source),
        sanitize_for_terminal(&article.url)
    );
    out
}

/// Render a list of articles, or the empty-state line.
pub fn render_articles(articles: &[Article]) -> String {
    if articles.is_empty() {
        return "No news found for this category. Try refreshing or picking another filter.\n"
            .to_string();
    }
    articles.iter().map(render_article).collect()
}

/// Render the header, the current state and the last sync time.
pub fn render_session(session: &Session) -> String {
    let filters = session.filters();
    let mut out = String::new();
    let _ = writeln!(out, "\nDaily News in 60s  ·  {filters}");
    let last_sync = session
        .last_updated()
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string());
    let _ = writeln!(out, "Last sync: {last_sync}");

    match session.state() {
        FeedState::Idle => {}
        FeedState::Loading => {
            let _ = writeln!(out, "Analyzing latest headlines in {}...", filters.language.name);
        }
        FeedState::Error { message } => {
            let _ = writeln!(out, "{RULE}\nSomething went wrong\n{message}\nType `retry` to try again.");
        }
        FeedState::Success { articles, fetched_at } => {
            let _ = writeln!(out, "{} stories fetched at {}", articles.len(), fetched_at.format("%H:%M:%S"));
            out.push_str(&render_articles(articles));
            if articles.is_empty() {
                let _ = writeln!(out, "{GENERAL_NEWS_HINT}");
            }
        }
    }
    out
}

/// Render every section of an edition.
pub fn render_edition(edition: &Edition) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Edition {} {}  ·  {} / {}",
        edition.local_date, edition.local_time, edition.region, edition.language
    );
    for section in &edition.sections {
        let _ = writeln!(out, "\n== {} ({}) ==", section.category, section.articles.len());
        out.push_str(&render_articles(&section.articles));
    }
    out
}

/// Codes accepted by the `language` and `region` commands.
pub fn filter_tables() -> String {
    let mut out = String::from("Languages:\n");
    for l in LANGUAGES {
        let _ = writeln!(out, "  {:<10} {}", l.code, l.name);
    }
    out.push_str("Regions:\n");
    for r in REGIONS {
        let _ = writeln!(out, "  {:<10} {}", r.code, r.name);
    }
    out
}

/// Command reference for the interactive session.
pub fn help_text() -> &'static str {
    "Commands:
  category <name>   General, Politics, Technology, Business, Sports, Health
  language <code>   e.g. en, hi, te
  region <code>     e.g. in, mumbai, global
  refresh | retry   fetch the current selection again
  list              show language and region codes
  quit"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::models::{Category, EditionSection, FilterState};

    fn article() -> Article {
        Article {
            id: "Sports-in-en-0-1".to_string(),
            title: "Final\nwhistle".to_string(),
            summary: vec!["Point one".to_string(), "Point\ttwo".to_string()],
            sentiment: Sentiment::Positive,
            category: Category::Sports,
            source: "Wire".to_string(),
            url: "https://example.com/a".to_string(),
            timestamp: "09:15:00".to_string(),
        }
    }

    #[test]
    fn test_render_article_card() {
        let card = render_article(&article());
        assert!(card.contains("SPORTS [+ Positive]"));
        assert!(card.contains("Final whistle"));
        assert!(card.contains("  • Point two"));
        assert!(card.contains("Wire — https://example.com/a"));
    }

    #[test]
    fn test_render_untitled_article() {
        let mut a = article();
        a.title = String::new();
        assert!(render_article(&a).contains("(untitled)"));
    }

    #[test]
    fn test_render_empty_list() {
        assert!(render_articles(&[]).starts_with("No news found"));
    }

    #[test]
    fn test_render_session_states() {
        let mut session = Session::new(FilterState::default());
        let g = session.begin();
        let loading = render_session(&session);
        assert!(loading.contains("Analyzing latest headlines in English"));
        assert!(loading.contains("Last sync: --:--"));

        session.resolve(g, Err(FetchError::MissingArray));
        let failed = render_session(&session);
        assert!(failed.contains("Something went wrong"));
        assert!(failed.contains("Please try again later"));

        let g = session.refresh();
        session.resolve(g, Ok(vec![article()]));
        let shown = render_session(&session);
        assert!(shown.contains("Final whistle"));
        assert!(!shown.contains("--:--"));
    }

    #[test]
    fn test_empty_session_offers_general_news() {
        let mut session = Session::new(FilterState::default());
        let g = session.begin();
        session.resolve(g, Ok(Vec::new()));
        let shown = render_session(&session);
        assert!(shown.contains("No news found"));
        assert!(shown.contains("category general"));

        let g = session.refresh();
        session.resolve(g, Ok(vec![article()]));
        assert!(!render_session(&session).contains("category general"));
    }

    #[test]
    fn test_render_edition_sections() {
        let edition = Edition {
            local_date: "2025-05-06".to_string(),
            local_time: "09:15:00".to_string(),
            language: "en".to_string(),
            region: "in".to_string(),
            sections: vec![
                EditionSection { category: Category::Sports, articles: vec![article()] },
                EditionSection { category: Category::Health, articles: vec![] },
            ],
        };
        let text = render_edition(&edition);
        assert!(text.contains("== Sports (1) =="));
        assert!(text.contains("== Health (0) =="));
    }

    #[test]
    fn test_filter_tables_list_codes() {
        let tables = filter_tables();
        assert!(tables.contains("mumbai"));
        assert!(tables.contains("global"));
        assert!(tables.contains("kn"));
    }
}
