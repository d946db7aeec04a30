//! Persisted session and history records

use apiscope_document::HttpMethod;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response captured from an executed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    /// HTTP status code
    pub status: u16,

    /// Reason phrase
    #[serde(default)]
    pub status_text: String,

    /// Response headers in received order
    #[serde(default)]
    pub headers: IndexMap<String, String>,

    /// Response body text
    #[serde(default)]
    pub body: String,

    /// Round-trip time in milliseconds
    #[serde(default)]
    pub duration_ms: u64,
}

impl ResponseSnapshot {
    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Last-used test inputs and output for one endpoint of one spec source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSessionRecord {
    /// Path template values
    #[serde(default)]
    pub path_params: IndexMap<String, String>,

    /// Query parameter values
    #[serde(default)]
    pub query_params: IndexMap<String, String>,

    /// Header values
    #[serde(default)]
    pub headers: IndexMap<String, String>,

    /// Request body text
    #[serde(default)]
    pub body: String,

    /// Selected server base URL
    #[serde(default)]
    pub selected_server: Option<String>,

    /// Last response, if the request has been executed
    #[serde(default)]
    pub response: Option<ResponseSnapshot>,
}

/// What was sent, as recorded in history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestSnapshot {
    #[serde(default)]
    pub path_params: IndexMap<String, String>,

    #[serde(default)]
    pub query_params: IndexMap<String, String>,

    #[serde(default)]
    pub headers: IndexMap<String, String>,

    #[serde(default)]
    pub body: Option<String>,
}

impl From<&TestSessionRecord> for RequestSnapshot {
    fn from(record: &TestSessionRecord) -> Self {
        Self {
            path_params: record.path_params.clone(),
            query_params: record.query_params.clone(),
            headers: record.headers.clone(),
            body: Some(record.body.clone()).filter(|body| !body.is_empty()),
        }
    }
}

/// How an executed request ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryOutcome {
    /// A response was received (any status)
    Response(ResponseSnapshot),

    /// The request failed before a response arrived
    Error { message: String },
}

impl HistoryOutcome {
    pub fn status(&self) -> Option<u16> {
        match self {
            HistoryOutcome::Response(response) => Some(response.status),
            HistoryOutcome::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            HistoryOutcome::Response(_) => None,
            HistoryOutcome::Error { message } => Some(message),
        }
    }

    pub fn response(&self) -> Option<&ResponseSnapshot> {
        match self {
            HistoryOutcome::Response(response) => Some(response),
            HistoryOutcome::Error { .. } => None,
        }
    }
}

/// One executed request.
///
/// Entries are snapshots: the history log hands out shared references only,
/// and removes entries rather than editing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique entry ID
    pub id: String,

    /// When the request was executed
    pub timestamp: DateTime<Utc>,

    /// HTTP method
    pub method: HttpMethod,

    /// Fully built request URL
    pub url: String,

    /// Path template of the endpoint
    pub path: String,

    /// Operation summary at the time of execution
    #[serde(default)]
    pub summary: Option<String>,

    /// Request inputs
    pub request: RequestSnapshot,

    /// Response or error
    pub outcome: HistoryOutcome,

    /// Total duration in milliseconds
    pub duration_ms: u64,

    /// Spec source the endpoint belongs to
    pub spec_id: String,
}

impl HistoryEntry {
    /// Create an entry stamped with a fresh ID and the current time
    pub fn new(
        spec_id: impl Into<String>,
        method: HttpMethod,
        url: impl Into<String>,
        path: impl Into<String>,
        request: RequestSnapshot,
        outcome: HistoryOutcome,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            method,
            url: url.into(),
            path: path.into(),
            summary: None,
            request,
            outcome,
            duration_ms,
            spec_id: spec_id.into(),
        }
    }

    /// Attach the operation summary
    pub fn with_summary(mut self, summary: Option<String>) -> Self {
        self.summary = summary;
        self
    }
}
