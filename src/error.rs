//! Structured error types.
//!
//! Almost nothing in this crate can fail: discovery, placement, and
//! highlighting all degrade silently (a missing note target is skipped, a
//! detached element reads as a zero rectangle, an empty document makes the
//! whole engine inert). The one real error source is parsing a document
//! snapshot that a host hands over as JSON.

use thiserror::Error;

/// The unified error type returned by the public API.
#[derive(Debug, Error)]
pub enum MarginaliaError {
    /// A JSON document snapshot failed to parse.
    #[error("failed to parse document snapshot: {source}\n  hint: {hint}")]
    Snapshot {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
}

impl From<serde_json::Error> for MarginaliaError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "check for trailing commas, missing quotes, or unescaped characters"
            }
            serde_json::error::Category::Data => {
                "the JSON is valid but does not match the snapshot schema; check field names and types"
            }
            serde_json::error::Category::Eof => "unexpected end of input — is the snapshot truncated?",
            serde_json::error::Category::Io => "the underlying reader failed",
        };
        MarginaliaError::Snapshot {
            source: e,
            hint: hint.to_string(),
        }
    }
}
