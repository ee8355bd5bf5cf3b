//! Data models for filters, normalized articles and editions.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Category`], [`Language`], [`Region`]: the filter triple sent with every fetch
//! - [`FilterState`]: the currently selected triple
//! - [`Article`]: a normalized, immutable news card produced by the normalizer
//! - [`Edition`]: a multi-category digest written to JSON and Markdown
//!
//! Languages and regions come from the fixed [`LANGUAGES`] and [`REGIONS`]
//! tables; callers pick entries from them and never build their own.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Region code meaning "no geographic scope".
pub const GLOBAL_REGION_CODE: &str = "global";

/// A fixed news topic used to scope the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
pub enum Category {
    General,
    Politics,
    Technology,
    Business,
    Sports,
    Health,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 6] = [
        Category::General,
        Category::Politics,
        Category::Technology,
        Category::Business,
        Category::Sports,
        Category::Health,
    ];

    /// Display name, also used in ids and prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Politics => "Politics",
            Category::Technology => "Technology",
            Category::Business => "Business",
            Category::Sports => "Sports",
            Category::Health => "Health",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown category: {wanted}"))
    }
}

/// Coarse editorial tone attached to each article by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl Sentiment {
    /// Map a model-supplied label onto the closed vocabulary.
    ///
    /// Labels are matched exactly after trimming surrounding whitespace.
    /// Anything outside `Positive`/`Neutral`/`Negative` becomes
    /// [`Sentiment::Neutral`].
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some("Positive") => Sentiment::Positive,
            Some("Negative") => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target natural language for generated titles and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

/// Geographic scope of a query, or the [`GLOBAL_REGION_CODE`] sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub code: &'static str,
    pub name: &'static str,
}

pub const LANGUAGES: &[Language] = &[
    Language { code: "en", name: "English" },
    Language { code: "hi", name: "Hindi (हिन्दी)" },
    Language { code: "te", name: "Telugu (తెలుగు)" },
    Language { code: "ta", name: "Tamil (தமிழ்)" },
    Language { code: "kn", name: "Kannada (ಕನ್ನಡ)" },
];

pub const REGIONS: &[Region] = &[
    Region { code: "in", name: "India (National)" },
    Region { code: "mumbai", name: "Mumbai" },
    Region { code: "delhi", name: "Delhi" },
    Region { code: "bengaluru", name: "Bengaluru" },
    Region { code: "hyderabad", name: "Hyderabad" },
    Region { code: "chennai", name: "Chennai" },
    Region { code: "kolkata", name: "Kolkata" },
    Region { code: "pune", name: "Pune" },
    Region { code: "ahmedabad", name: "Ahmedabad" },
    Region { code: GLOBAL_REGION_CODE, name: "Global" },
];

impl Language {
    /// Look up a language in [`LANGUAGES`] by code, ignoring case.
    pub fn by_code(code: &str) -> Option<&'static Language> {
        let code = code.trim();
        LANGUAGES.iter().find(|l| l.code.eq_ignore_ascii_case(code))
    }
}

impl Region {
    /// Look up a region in [`REGIONS`] by code, ignoring case.
    pub fn by_code(code: &str) -> Option<&'static Region> {
        let code = code.trim();
        REGIONS.iter().find(|r| r.code.eq_ignore_ascii_case(code))
    }

    pub fn is_global(&self) -> bool {
        self.code == GLOBAL_REGION_CODE
    }
}

/// The currently selected filter triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterState {
    pub category: Category,
    pub language: &'static Language,
    pub region: &'static Region,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            category: Category::General,
            language: &LANGUAGES[0],
            region: &REGIONS[0],
        }
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} • {} • {}", self.category, self.region.name, self.language.name)
    }
}

/// A normalized news card.
///
/// Built only by [`crate::normalize::normalize`]. `timestamp` is the local time
/// the batch was normalized, not the publication time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub summary: Vec<String>,
    pub sentiment: Sentiment,
    pub category: Category,
    pub source: String,
    pub url: String,
    pub timestamp: String,
}

/// The articles fetched for one category of an [`Edition`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditionSection {
    pub category: Category,
    pub articles: Vec<Article>,
}

/// A multi-category digest for one language and region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edition {
    /// The date of the fetch in `YYYY-MM-DD` format.
    pub local_date: String,
    /// The local time of the fetch in `HH:MM:SS` format.
    pub local_time: String,
    pub language: String,
    pub region: String,
    pub sections: Vec<EditionSection>,
}

impl Edition {
    pub fn article_count(&self) -> usize {
        self.sections.iter().map(|s| s.articles.len()).sum()
    }
}
