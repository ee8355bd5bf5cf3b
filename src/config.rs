//! Configuration loading.
//!
//! Settings come from, in order of precedence: command-line flags (and their
//! environment variables), a YAML file, then built-in defaults. The YAML file is
//! read from `--config <path>` or `$XDG_CONFIG_HOME/news_in_60s/config.yaml`
//! (falling back to `$HOME/.config/news_in_60s/config.yaml`). A missing default
//! file is not an error.
//!
//! ```yaml
//! api_key: "..."
//! model: gemini-3-flash-preview
//! google_search: true
//! request_timeout_secs: 60
//! category: Technology
//! language: hi
//! region: mumbai
//! ```

use crate::api::GeminiSettings;
use crate::cli::Cli;
use crate::models::{Category, FilterState, Language, Region};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Contents of `config.yaml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub google_search: Option<bool>,
    pub request_timeout_secs: Option<u64>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub region: Option<String>,
}

/// Fully resolved settings for a run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub gemini: GeminiSettings,
    pub filters: FilterState,
}

/// Default location of `config.yaml`, if a home directory can be found.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg).join("news_in_60s").join("config.yaml"));
    }
    if let Ok(home) = env::var("HOME") {
        return Some(PathBuf::from(home).join(".config").join("news_in_60s").join("config.yaml"));
    }
    None
}

/// Parse a YAML config file.
pub fn load_file(path: &Path) -> Result<FileConfig, Box<dyn Error>> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {e}", path.display()))?;
    let parsed: FileConfig = serde_yaml::from_str(&text)
        .map_err(|e| format!("failed to parse config {}: {e}", path.display()))?;
    Ok(parsed)
}

/// Load the config file named on the command line, or the default one if present.
pub fn load_for(cli: &Cli) -> Result<FileConfig, Box<dyn Error>> {
    if let Some(path) = cli.config.as_deref() {
        let file = load_file(Path::new(path))?;
        info!(config_path = path, "Loaded configuration");
        return Ok(file);
    }
    match default_config_path() {
        Some(path) if path.is_file() => {
            let file = load_file(&path)?;
            info!(config_path = %path.display(), "Loaded configuration");
            Ok(file)
        }
        _ => {
            debug!("No configuration file; using defaults");
            Ok(FileConfig::default())
        }
    }
}

/// Merge command-line values over the file over the defaults.
///
/// # Errors
///
/// Fails when no API key is available, `api_base` is not a URL, or a default
/// category, language or region is not in the fixed tables.
pub fn resolve(cli: &Cli, file: FileConfig) -> Result<AppConfig, Box<dyn Error>> {
    let api_key = cli
        .api_key
        .clone()
        .or(file.api_key)
        .filter(|k| !k.trim().is_empty())
        .ok_or("no API key: pass --api-key, set GEMINI_API_KEY, or add api_key to config.yaml")?;

    let api_base = cli
        .api_base
        .clone()
        .or(file.api_base)
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    let parsed = Url::parse(&api_base).map_err(|e| format!("invalid api_base {api_base:?}: {e}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("api_base must be http(s): {api_base}").into());
    }

    let gemini = GeminiSettings {
        api_base,
        model: cli
            .model
            .clone()
            .or(file.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        google_search: !cli.no_search && file.google_search.unwrap_or(true),
        timeout: cli
            .timeout_secs
            .or(file.request_timeout_secs)
            .map(Duration::from_secs),
    };

    let category = match (cli.category, file.category) {
        (Some(c), _) => c,
        (None, Some(name)) => name.parse::<Category>()?,
        (None, None) => Category::General,
    };
    let language_code = cli.language.clone().or(file.language);
    let language = match language_code {
        Some(code) => Language::by_code(&code).ok_or_else(|| format!("unknown language code: {code}"))?,
        None => FilterState::default().language,
    };
    let region_code = cli.region.clone().or(file.region);
    let region = match region_code {
        Some(code) => Region::by_code(&code).ok_or_else(|| format!("unknown region code: {code}"))?,
        None => FilterState::default().region,
    };

    Ok(AppConfig {
        api_key,
        gemini,
        filters: FilterState { category, language, region },
    })
}
