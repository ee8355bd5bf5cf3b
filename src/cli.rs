//! Command-line interface definitions.
//!
//! All options can be provided via command-line flags; the API key can also
//! come from the environment. Anything left unset falls back to `config.yaml`
//! and then to built-in defaults (see [`crate::config`]).

use crate::models::Category;
use clap::Parser;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Top Technology stories from Mumbai, in Hindi
/// news_in_60s --category technology --language hi --region mumbai
///
/// # Every category, written to JSON and Markdown
/// news_in_60s --all-categories -j ./json -m ./markdown
///
/// # Interactive session
/// news_in_60s --interactive
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// News category to fetch
    #[arg(long, value_enum, ignore_case = true)]
    pub category: Option<Category>,

    /// Language code for titles and summaries (en, hi, te, ta, kn)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Region code (in, mumbai, delhi, ..., or global)
    #[arg(short, long)]
    pub region: Option<String>,

    /// Fetch every category and assemble an edition
    #[arg(short, long, conflicts_with = "interactive")]
    pub all_categories: bool,

    /// Start an interactive session instead of a one-shot fetch
    #[arg(short, long)]
    pub interactive: bool,

    /// Output directory for the JSON edition file
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Output directory for the Markdown edition file
    #[arg(short, long)]
    pub markdown_output_dir: Option<String>,

    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini model name
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL of the Gemini API
    #[arg(long)]
    pub api_base: Option<String>,

    /// Do not attach the Google Search grounding tool
    #[arg(long)]
    pub no_search: bool,

    /// Overall request timeout in seconds (transport default when unset)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Print articles as JSON instead of cards
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "news_in_60s",
            "--category",
            "Technology",
            "--language",
            "hi",
            "--region",
            "mumbai",
        ]);

        assert_eq!(cli.category, Some(Category::Technology));
        assert_eq!(cli.language.as_deref(), Some("hi"));
        assert_eq!(cli.region.as_deref(), Some("mumbai"));
        assert!(!cli.interactive);
        assert!(!cli.all_categories);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "news_in_60s",
            "-a",
            "-j",
            "/tmp/json",
            "-m",
            "/tmp/markdown",
            "-r",
            "global",
        ]);

        assert!(cli.all_categories);
        assert_eq!(cli.json_output_dir.as_deref(), Some("/tmp/json"));
        assert_eq!(cli.markdown_output_dir.as_deref(), Some("/tmp/markdown"));
        assert_eq!(cli.region.as_deref(), Some("global"));
    }

    #[test]
    fn test_cli_rejects_unknown_category() {
        assert!(Cli::try_parse_from(["news_in_60s", "--category", "weather"]).is_err());
    }

    #[test]
    fn test_interactive_conflicts_with_all_categories() {
        assert!(Cli::try_parse_from(["news_in_60s", "-i", "-a"]).is_err());
    }
}
