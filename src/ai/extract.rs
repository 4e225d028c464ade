use validator::Validate;

use super::schema::SummarySchema;
use super::GeneratedSummary;
use crate::error::{OpError, Outcome};

const JSON_FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

/// Turns the model's free-form reply into a [`GeneratedSummary`].
pub trait SummaryExtractor {
    fn extract(&self, raw: &str) -> Outcome<GeneratedSummary>;
}

/// Strips a leading "```json" and a trailing "```" and decodes what is left.
///
/// Positional only: a fence without the `json` tag, or text around the fence,
/// is left in place and the decode fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FenceStripExtractor;

impl SummaryExtractor for FenceStripExtractor {
    fn extract(&self, raw: &str) -> Outcome<GeneratedSummary> {
        let payload = strip_fences(raw);

        let schema: SummarySchema = serde_json::from_str(payload)
            .map_err(|e| OpError::Parse(format!("{} in {:?}", e, preview(payload))))?;
        schema
            .validate()
            .map_err(|e| OpError::Parse(format!("invalid summary: {}", e)))?;

        Ok(GeneratedSummary {
            title: schema.title,
            message: schema.message,
        })
    }
}

pub fn strip_fences(raw: &str) -> &str {
    let text = raw.trim();
    let text = text.strip_prefix(JSON_FENCE_OPEN).unwrap_or(text);
    text.strip_suffix(FENCE_CLOSE).unwrap_or(text)
}

pub fn extract_summary(raw: &str) -> Outcome<GeneratedSummary> {
    FenceStripExtractor.extract(raw)
}

fn preview(text: &str) -> String {
    text.chars().take(200).collect()
}
