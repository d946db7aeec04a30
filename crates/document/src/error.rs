//! Errors raised at the document validation boundary

/// Document acceptance errors
///
/// Only the validation boundary fails. Unresolvable references and malformed
/// examples degrade to placeholder values instead of surfacing here.
#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    #[error("Invalid OpenAPI document: {reason}")]
    Invalid { reason: String },

    #[error("Malformed OpenAPI document: {0}")]
    Malformed(#[source] serde_json::Error),
}

impl DocumentError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        DocumentError::Invalid {
            reason: reason.into(),
        }
    }
}

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;
