use serde::{Deserialize, Serialize};
use validator::Validate;

/// The two-field record the model is asked to emit.
///
/// Both fields are required; a payload missing either one does not decode.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SummarySchema {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    pub message: String,
}
