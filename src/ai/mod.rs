use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub mod extract;
mod response;
mod schema;

pub use extract::{extract_summary, FenceStripExtractor, SummaryExtractor};
pub use response::{ContentBlock, Message, MessagesRequest, MessagesResponse};
use crate::config::AIConfig;
use crate::error::{OpError, Outcome};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Diffs longer than this many characters are cut down to their first
/// `MAX_DIFF_CHARS` characters before being sent.
pub const MAX_DIFF_CHARS: usize = 5000;

const SYSTEM_PROMPT: &str = "You write pull request titles and descriptions from git diffs.\n\
\n\
Title:\n\
- imperative mood (\"Add retry to uploader\", not \"Added retry\")\n\
- at most 60 characters\n\
- start with a conventional commit type: feat, fix, docs, style, refactor, test or chore\n\
- name the concrete change\n\
\n\
Message:\n\
- one short summary line\n\
- then one bullet per key change\n\
- call out breaking changes\n\
\n\
Reply with a single JSON object and nothing else, no markdown and no commentary:\n\
{\"title\": \"...\", \"message\": \"...\"}";

/// Title and body produced for a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSummary {
    pub title: String,
    pub message: String,
}

impl GeneratedSummary {
    /// Subject, blank line, body.
    pub fn commit_text(&self) -> String {
        format!("{}\n\n{}", self.title, self.message)
    }
}

/// Keeps the first `MAX_DIFF_CHARS` characters of `diff`.
pub fn truncate_diff(diff: &str) -> &str {
    match diff.char_indices().nth(MAX_DIFF_CHARS) {
        Some((cut, _)) => &diff[..cut],
        None => diff,
    }
}

fn user_prompt(diff: &str) -> String {
    format!("Generate a pull request title and message for this diff:\n\n{}", diff)
}

/// Client for the messages endpoint that summarises diffs.
#[derive(Debug, Clone)]
pub struct SummaryClient<E = FenceStripExtractor> {
    config: AIConfig,
    http: reqwest::Client,
    extractor: E,
}

impl SummaryClient<FenceStripExtractor> {
    pub fn new(config: AIConfig) -> Self {
        Self::with_extractor(config, FenceStripExtractor)
    }
}

impl<E: SummaryExtractor> SummaryClient<E> {
    pub fn with_extractor(config: AIConfig, extractor: E) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            extractor,
        }
    }

    pub fn build_request<'a>(&'a self, diff: &str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system: SYSTEM_PROMPT,
            messages: vec![Message {
                role: "user".to_string(),
                content: user_prompt(truncate_diff(diff)),
            }],
        }
    }

    /// Asks the endpoint for a title and message describing `diff`.
    pub async fn generate_summary(&self, diff: &str) -> Outcome<GeneratedSummary> {
        let api_key = self
            .config
            .api_key()
            .ok_or(OpError::ConfigurationMissing("API key"))?;
        if diff.is_empty() {
            return Err(OpError::EmptyInput("diff is empty"));
        }

        let mut headers = HeaderMap::new();
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|_| OpError::InvalidCredential("API key"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let request = self.build_request(diff);
        debug!(
            endpoint = self.config.endpoint(),
            model = request.model,
            diff_chars = diff.chars().count(),
            "requesting summary"
        );

        let response = self
            .http
            .post(self.config.endpoint())
            .headers(headers)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        debug!(%status, "summary response");
        let body = response
            .text()
            .await
            .map_err(|e| OpError::Network(format!("failed to read response body: {}", e)))?;

        if status != StatusCode::OK {
            warn!(%status, "summary request rejected");
            return Err(OpError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)?;
        let text = parsed
            .first_text()
            .ok_or_else(|| OpError::Parse("response has no text content".to_string()))?;

        let summary = self.extractor.extract(text)?;
        info!(title = %summary.title, "generated summary");
        Ok(summary)
    }
}
