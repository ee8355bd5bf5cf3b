//! JSON output of editions.
//!
//! Files are organized by date, one file per fetch:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── en-in-083000.json
//!     └── hi-mumbai-174512.json
//! ```

use crate::models::Edition;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Path of the JSON file for `edition` under `json_output_dir`.
pub fn edition_path(edition: &Edition, json_output_dir: &str) -> PathBuf {
    let stamp: String = edition.local_time.chars().filter(|c| c.is_ascii_digit()).collect();
    PathBuf::from(json_output_dir)
        .join(&edition.local_date)
        .join(format!("{}-{}-{}.json", edition.language, edition.region, stamp))
}

/// Write an [`Edition`] as pretty JSON, creating the date directory.
///
/// # Arguments
///
/// * `edition` - The edition to serialize
/// * `json_output_dir` - Root directory; the file lands under a per-date subdirectory
///
/// # Returns
///
/// The path written, as built by [`edition_path`].
///
/// # Errors
///
/// Returns an error if the directory cannot be created, serialization fails,
/// or the file cannot be written.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_edition(edition: &Edition, json_output_dir: &str) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(edition)?;
    let path = edition_path(edition, json_output_dir);

    if let Some(dir) = path.parent() {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(&path, json).await?;
    info!(path = %path.display(), articles = edition.article_count(), "Wrote JSON edition");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, Category, EditionSection, Sentiment};

    fn edition() -> Edition {
        Edition {
            local_date: "2025-05-06".to_string(),
            local_time: "08:30:00".to_string(),
            language: "en".to_string(),
            region: "in".to_string(),
            sections: vec![EditionSection {
                category: Category::Politics,
                articles: vec![Article {
                    id: "Politics-in-en-0-1".to_string(),
                    title: "Vote count".to_string(),
                    summary: vec!["a".to_string(), "b".to_string(), "c".to_string()],
                    sentiment: Sentiment::Neutral,
                    category: Category::Politics,
                    source: "Wire".to_string(),
                    url: "https://example.com".to_string(),
                    timestamp: "08:30:00".to_string(),
                }],
            }],
        }
    }

    #[test]
    fn test_edition_path() {
        let path = edition_path(&edition(), "/tmp/out");
        assert_eq!(path, PathBuf::from("/tmp/out/2025-05-06/en-in-083000.json"));
    }

    #[tokio::test]
    async fn test_write_edition_round_trips() {
        let dir = std::env::temp_dir().join(format!("news_in_60s_json_{}", std::process::id()));
        let dir_str = dir.to_string_lossy().to_string();

        let path = write_edition(&edition(), &dir_str).await.unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let back: Edition = serde_json::from_str(&text).unwrap();

        assert_eq!(back.sections[0].articles[0].title, "Vote count");
        assert!(text.contains("\"category\": \"Politics\""));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
