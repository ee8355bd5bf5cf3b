//! Gemini API interaction.
//!
//! This module provides the interface used to send a prompt to a generative
//! model and receive its free-form text answer.
//!
//! # Architecture
//!
//! - [`AskAsync`]: Core trait defining async model interaction
//! - [`GeminiClient`]: `generateContent` over HTTPS, with the Google Search
//!   grounding tool attached when enabled
//!
//! There is no retry here. A failed call is reported once and the user decides
//! whether to fetch again.

use crate::error::FetchError;
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Trait for async model interaction.
///
/// Implementors send a prompt to a model and return its answer. The pipeline
/// is generic over this trait so tests can substitute a scripted transport.
pub trait AskAsync {
    /// The type of response returned by the model.
    type Response;

    /// Send `text` to the model and receive a response.
    fn ask(&self, text: &str) -> impl Future<Output = Result<Self::Response, FetchError>> + Send;
}

/// Connection settings for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    /// Base URL, e.g. `https://generativelanguage.googleapis.com`.
    pub api_base: String,
    /// Model name, e.g. `gemini-3-flash-preview`.
    pub model: String,
    /// Attach the Google Search grounding tool to each request.
    pub google_search: bool,
    /// Overall request timeout; `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    settings: GeminiSettings,
}

impl GeminiClient {
    /// Build a client for `settings` authenticated with `api_key`.
    pub fn new(api_key: String, settings: GeminiSettings) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(concat!("news_in_60s/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            api_key,
            settings,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.model
        )
    }

    fn request_body<'a>(&self, prompt: &'a str) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
            tools: if self.settings.google_search {
                vec![Tool { google_search: GoogleSearch {} }]
            } else {
                Vec::new()
            },
        }
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("settings", &self.settings)
            .finish()
    }
}

impl AskAsync for GeminiClient {
    type Response = String;

    #[instrument(level = "info", skip_all, fields(model = %self.settings.model))]
    async fn ask(&self, text: &str) -> Result<Self::Response, FetchError> {
        let t0 = Instant::now();
        let res = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(text))
            .send()
            .await;

        let response = match res {
            Ok(r) => r,
            Err(e) => {
                warn!(elapsed_ms = t0.elapsed().as_millis() as u64, error = %e, "API call failed");
                return Err(e.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                elapsed_ms = t0.elapsed().as_millis() as u64,
                status = status.as_u16(),
                body = %truncate_for_log(&body, 300),
                "API returned an error status"
            );
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: truncate_for_log(&body, 300),
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed.text().ok_or(FetchError::EmptyResponse)?;
        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            chars = text.chars().count(),
            "API call succeeded"
        );
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, if any are non-empty.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn settings(google_search: bool) -> GeminiSettings {
        GeminiSettings {
            api_base: "https://generativelanguage.googleapis.com/".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            google_search,
            timeout: None,
        }
    }

    #[test]
    fn test_endpoint_joins_base_and_model() {
        let client = GeminiClient::new("key".to_string(), settings(true)).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent"
        );
    }

    #[test]
    fn test_request_body_with_search_tool() {
        let client = GeminiClient::new("key".to_string(), settings(true)).unwrap();
        let body = serde_json::to_value(client.request_body("hello")).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert!(body["tools"][0]["google_search"].is_object());
    }

    #[test]
    fn test_request_body_without_search_tool() {
        let client = GeminiClient::new("key".to_string(), settings(false)).unwrap();
        let body = serde_json::to_value(client.request_body("hello")).unwrap();
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = GeminiClient::new("super-secret".to_string(), settings(true)).unwrap();
        let dbg = format!("{client:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "[{\"title\":"}, {"text": "\"A\"}]"}], "role": "model"},
                "finishReason": "STOP"
            }]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.text().as_deref(), Some(r#"[{"title":"A"}]"#));
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let parsed: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(parsed.text().is_none());

        let parsed: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert!(parsed.text().is_none());
    }

    /// Read one HTTP/1.1 request: headers plus a `content-length` body.
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let body_len = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Serve one canned response on a local port; the handle yields the request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });
        (format!("http://{addr}"), handle)
    }

    fn local_client(api_base: String) -> GeminiClient {
        let settings = GeminiSettings {
            api_base,
            model: "gemini-test".to_string(),
            google_search: true,
            timeout: Some(Duration::from_secs(10)),
        };
        GeminiClient::new("test-key".to_string(), settings).unwrap()
    }

    #[tokio::test]
    async fn test_ask_returns_candidate_text() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"candidates":[{"content":{"parts":[{"text":"[{\"title\":\"A\"}]"}]}}]}"#,
        )
        .await;
        let text = local_client(base).ask("top stories").await.unwrap();
        assert_eq!(text, r#"[{"title":"A"}]"#);

        let request = server.await.unwrap();
        let lowered = request.to_ascii_lowercase();
        assert!(request.starts_with("POST /v1beta/models/gemini-test:generateContent "));
        assert!(lowered.contains("x-goog-api-key: test-key"));

        let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
        let sent: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(sent["contents"][0]["parts"][0]["text"], "top stories");
        assert!(sent["tools"][0]["google_search"].is_object());
    }

    #[tokio::test]
    async fn test_ask_maps_error_status() {
        let (base, server) = serve_once(
            "429 Too Many Requests",
            r#"{"error":{"code":429,"message":"Resource has been exhausted"}}"#,
        )
        .await;
        let err = local_client(base).ask("top stories").await.unwrap_err();
        server.await.unwrap();

        match err {
            FetchError::Status { status, message } => {
                assert_eq!(status, 429);
                assert!(message.contains("Resource has been exhausted"));
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ask_without_candidates_is_empty_response() {
        let (base, server) = serve_once("200 OK", r#"{"candidates":[]}"#).await;
        let err = local_client(base).ask("top stories").await.unwrap_err();
        server.await.unwrap();
        assert!(matches!(err, FetchError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_ask_with_undecodable_body_is_transport() {
        let (base, server) = serve_once("200 OK", "<html>gateway</html>").await;
        let err = local_client(base).ask("top stories").await.unwrap_err();
        server.await.unwrap();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
