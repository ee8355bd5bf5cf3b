//! Output generation for terminal cards, JSON and Markdown.
//!
//! # Submodules
//!
//! - [`cards`]: Plain-text cards and session screens for the terminal
//! - [`json`]: Writes an `Edition` to a JSON file per fetch
//! - [`markdown`]: Appends an `Edition` to a Markdown file and keeps `index.md` current

pub mod cards;
pub mod json;
pub mod markdown;
