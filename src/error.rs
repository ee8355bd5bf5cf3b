//! Error types for the fetch pipeline.

use std::fmt;
use thiserror::Error;

/// The one message an end user sees for any failed fetch.
pub const USER_FACING_ERROR: &str = "Unable to fetch the latest news. Please try again later.";

/// Errors that can occur while fetching and parsing a digest.
///
/// The variants exist for logging; [`FetchError::user_message`] collapses them
/// all into [`USER_FACING_ERROR`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read
    #[error("request failed: {0}")]
    Transport(String),

    /// The API answered with a non-success status
    #[error("API error (status {status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, truncated
        message: String,
    },

    /// The API answered but returned no candidate text
    #[error("model returned no text")]
    EmptyResponse,

    /// No bracket-delimited array in the model output
    #[error("no JSON array found in model output")]
    MissingArray,

    /// The extracted array is not valid JSON, or not an array
    #[error("parse error: {0}")]
    Parse(String),
}

impl FetchError {
    /// True for failures of the upstream call itself, false for bad output.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FetchError::Transport(_) | FetchError::Status { .. } | FetchError::EmptyResponse
        )
    }

    pub fn user_message(&self) -> &'static str {
        USER_FACING_ERROR
    }
}

/// The error a failed run hands back to the process.
///
/// `Display` and `Debug` both print only [`USER_FACING_ERROR`], so the message
/// the runtime prints on exit does not reveal which [`FetchError`] occurred.
#[derive(Error)]
#[error("{}", USER_FACING_ERROR)]
pub struct FetchFailed;

impl fmt::Debug for FetchFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(USER_FACING_ERROR)
    }
}

impl From<FetchError> for FetchFailed {
    fn from(_: FetchError) -> Self {
        FetchFailed
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e.to_string())
    }
}
