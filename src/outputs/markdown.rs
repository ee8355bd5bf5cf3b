//! Markdown output of editions and the running index of them.
//!
//! ```text
//! markdown_output_dir/
//! ├── 2025-05-06_en_in.md   # one edition, appended on every run
//! └── index.md              # dates and editions
//! ```

use crate::models::{Edition, Sentiment};
use crate::utils::slugify_title;
use std::error::Error;
use std::fmt::Write;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

const INDEX_HEADING: &str = "# Daily News in 60s";

/// Filename of the Markdown edition for `edition`.
pub fn edition_filename(edition: &Edition) -> String {
    format!("{}_{}_{}.md", edition.local_date, edition.language, edition.region)
}

fn sentiment_marker(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => "🟢",
        Sentiment::Neutral => "⚪",
        Sentiment::Negative => "🔴",
    }
}

/// Render an edition as Markdown.
pub fn edition_to_markdown(edition: &Edition) -> String {
    let mut md = String::new();
    let _ = writeln!(
        md,
        "## Edition {} {} ({} / {})\n",
        edition.local_date, edition.local_time, edition.region, edition.language
    );

    for section in &edition.sections {
        let _ = writeln!(md, "### {}\n", section.category);
        if section.articles.is_empty() {
            let _ = writeln!(md, "_No stories._\n");
            continue;
        }
        for article in &section.articles {
            let _ = writeln!(
                md,
                "#### {} {}\n",
                sentiment_marker(article.sentiment),
                article.title.trim()
            );
            for point in &article.summary {
                let _ = writeln!(md, "- {}", point.trim());
            }
            let _ = writeln!(
                md,
                "\n_{}_ · [{}]({}) · {}\n",
                article.sentiment, article.source, article.url, article.timestamp
            );
        }
    }
    md
}

/// Append the edition to its Markdown file and record it in `index.md`.
///
/// # Arguments
///
/// * `edition` - The edition to render
/// * `markdown_output_dir` - Directory holding the edition files and `index.md`
///
/// # Returns
///
/// The path of the edition file.
///
/// # Errors
///
/// Returns an error if the directory, the edition file or the index cannot be
/// written.
#[instrument(level = "info", skip_all, fields(%markdown_output_dir, date = %edition.local_date))]
pub async fn write_edition(edition: &Edition, markdown_output_dir: &str) -> Result<String, Box<dyn Error>> {
    fs::create_dir_all(markdown_output_dir).await?;
    let filename = edition_filename(edition);
    let path = format!("{}/{}", markdown_output_dir.trim_end_matches('/'), filename);

    let mut md = String::new();
    if !Path::new(&path).exists() {
        let _ = writeln!(
            md,
            "# News for {} ({} / {})\n",
            edition.local_date, edition.region, edition.language
        );
    }
    md.push_str(&edition_to_markdown(edition));

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await?;
    file.write_all(md.as_bytes()).await?;
    info!(%path, "Wrote Markdown edition");

    update_index(markdown_output_dir, edition, &filename).await?;
    Ok(path)
}

/// Insert `filename` under its date in `index.md`, once.
#[instrument(level = "info", skip_all, fields(%markdown_output_dir, file = %filename))]
pub async fn update_index(
    markdown_output_dir: &str,
    edition: &Edition,
    filename: &str,
) -> Result<(), Box<dyn Error>> {
    let index_path = format!("{}/index.md", markdown_output_dir.trim_end_matches('/'));
    let content = if Path::new(&index_path).exists() {
        fs::read_to_string(&index_path).await?
    } else {
        format!("{INDEX_HEADING}\n")
    };

    let date_heading = format!("- **{}**", edition.local_date);
    let entry = format!(
        "    - [{} / {}](./{}#{})",
        edition.region,
        edition.language,
        filename,
        slugify_title(&format!("News for {} ({} / {})", edition.local_date, edition.region, edition.language))
    );

    let mut lines: Vec<String> = content.lines().map(|l| l.to_string()).collect();
    match lines.iter().position(|l| l.trim() == date_heading) {
        Some(i) => {
            let mut j = i + 1;
            let mut found = false;
            while j < lines.len() && lines[j].starts_with("    - ") {
                if lines[j] == entry {
                    found = true;
                    break;
                }
                j += 1;
            }
            if !found {
                lines.insert(j, entry);
            }
        }
        None => {
            let insert_at = lines
                .iter()
                .position(|l| l.starts_with(INDEX_HEADING))
                .map(|p| p + 1)
                .unwrap_or(lines.len());
            lines.insert(insert_at, date_heading);
            lines.insert(insert_at + 1, entry);
        }
    }

    fs::write(&index_path, lines.join("\n") + "\n").await?;
    info!(path = %index_path, "Updated index.md");
    Ok(())
}
