//! ApiScope Library
//!
//! Browse an OpenAPI 3.x document and test its endpoints interactively. The
//! [`Workbench`] ties the document engine to durable test sessions and the
//! request history.

pub mod cli;
pub mod config;
pub mod inputs;
pub mod loader;
pub mod source;
pub mod transport;
pub mod utils;

pub use config::{Config, HistoryConfig, StorageConfig, StorageKind};
pub use inputs::prefill_inputs;
pub use source::{SourceKind, SpecSource};
pub use transport::{PreparedRequest, Transport, TransportError};

use apiscope_document::{
    build_url, list_endpoints, Document, DocumentError, EndpointFilter, EndpointKey,
    ParsedEndpoint,
};
use apiscope_session::{
    HistoryEntry, HistoryLimits, HistoryLog, HistoryOutcome, RequestSnapshot, StorageBackend,
    StorageError, TestSessionRecord, TestSessionStore,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Storage key holding the name of the last accepted spec source
pub const ACTIVE_SOURCE_KEY: &str = "workbench:active-source";

/// Error types for apiscope
#[derive(thiserror::Error, Debug)]
pub enum ApiScopeError {
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No document loaded")]
    NoDocument,

    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result type for apiscope operations
pub type ApiScopeResult<T> = Result<T, ApiScopeError>;

/// Accepted document with its catalog
struct LoadedSpec {
    source: SpecSource,
    document: Document,
    endpoints: Vec<ParsedEndpoint>,
}

/// Test inputs for an endpoint, with where they came from
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointSession {
    pub record: TestSessionRecord,

    /// Whether the record was restored from storage rather than prefilled
    pub restored: bool,
}

/// Main application context that coordinates all components
pub struct Workbench {
    backend: Arc<dyn StorageBackend>,
    sessions: TestSessionStore,
    history: HistoryLog,
    active_source: Option<String>,
    loaded: Option<LoadedSpec>,
}

impl Workbench {
    /// Open a workbench over a storage backend
    pub async fn open(
        backend: Arc<dyn StorageBackend>,
        limits: HistoryLimits,
    ) -> ApiScopeResult<Self> {
        let history = HistoryLog::open(backend.clone(), limits).await?;
        let active_source = backend.get(ACTIVE_SOURCE_KEY).await?;

        debug!(
            "Opened workbench (previous source: {})",
            active_source.as_deref().unwrap_or("none")
        );

        Ok(Self {
            sessions: TestSessionStore::new(backend.clone()),
            backend,
            history,
            active_source,
            loaded: None,
        })
    }

    /// Open a workbench as configured
    pub async fn from_config(config: &Config) -> ApiScopeResult<Self> {
        let backend = config
            .storage
            .open_backend()
            .map_err(|e| ApiScopeError::Config(e.to_string()))?;
        Self::open(backend, config.history.limits()).await
    }

    /// Validate and accept a document.
    ///
    /// A rejected document leaves the current one and every saved session in
    /// place. Accepting a document under a new source name persists the new
    /// name and then discards the previous source's sessions.
    pub async fn load_document(
        &mut self,
        source: SpecSource,
        raw: serde_json::Value,
    ) -> ApiScopeResult<&Document> {
        let document = Document::from_value(raw).map_err(|e| {
            warn!("Rejected document from {}: {}", source, e);
            e
        })?;

        // Record the new source before discarding anything, so a failed write
        // leaves the previous source and its sessions untouched.
        self.backend
            .set(ACTIVE_SOURCE_KEY, source.name.clone())
            .await?;

        if let Some(previous) = self.active_source.as_deref() {
            if previous != source.name {
                let cleared = self.sessions.clear_all_for_source(previous).await?;
                info!(
                    "Spec source changed from {} to {}, discarded {} saved session(s)",
                    previous, source.name, cleared
                );
            }
        }

        let endpoints = list_endpoints(&document);
        info!(
            "Loaded '{}' {} from {} ({} endpoints)",
            document.info().title,
            document.info().version,
            source,
            endpoints.len()
        );

        self.active_source = Some(source.name.clone());
        let loaded = self.loaded.insert(LoadedSpec {
            source,
            document,
            endpoints,
        });
        Ok(&loaded.document)
    }

    /// Source of the loaded document
    pub fn source(&self) -> Option<&SpecSource> {
        self.loaded.as_ref().map(|loaded| &loaded.source)
    }

    /// Loaded document
    pub fn document(&self) -> Option<&Document> {
        self.loaded.as_ref().map(|loaded| &loaded.document)
    }

    /// All endpoints in document order; empty before a document is loaded
    pub fn endpoints(&self) -> &[ParsedEndpoint] {
        self.loaded
            .as_ref()
            .map(|loaded| loaded.endpoints.as_slice())
            .unwrap_or_default()
    }

    /// Endpoints matching a filter
    pub fn filter(&self, filter: &EndpointFilter) -> Vec<&ParsedEndpoint> {
        filter.apply(self.endpoints())
    }

    /// Look up one endpoint
    pub fn endpoint(&self, key: &EndpointKey) -> ApiScopeResult<&ParsedEndpoint> {
        let loaded = self.loaded()?;
        apiscope_document::find_endpoint(&loaded.endpoints, key)
            .ok_or_else(|| ApiScopeError::UnknownEndpoint(key.to_string()))
    }

    /// Fresh inputs drafted from the document's examples
    pub fn prefill(&self, key: &EndpointKey) -> ApiScopeResult<TestSessionRecord> {
        let loaded = self.loaded()?;
        let endpoint = self.endpoint(key)?;
        Ok(prefill_inputs(
            endpoint,
            loaded.document.resolver(),
            &loaded.document.server_urls(),
        ))
    }

    /// Saved inputs for an endpoint, or prefilled ones when none are saved
    pub async fn open_endpoint(&self, key: &EndpointKey) -> ApiScopeResult<EndpointSession> {
        let source = self.source_name()?;
        self.endpoint(key)?;

        if let Some(record) = self.sessions.load(source, &key.to_string()).await? {
            debug!("Restored saved session for {}", key);
            return Ok(EndpointSession {
                record,
                restored: true,
            });
        }

        Ok(EndpointSession {
            record: self.prefill(key)?,
            restored: false,
        })
    }

    /// Persist the inputs for an endpoint
    pub async fn save_session(
        &self,
        key: &EndpointKey,
        record: &TestSessionRecord,
    ) -> ApiScopeResult<()> {
        let source = self.source_name()?;
        self.endpoint(key)?;
        self.sessions.save(source, &key.to_string(), record).await?;
        Ok(())
    }

    /// Forget the saved inputs for an endpoint and return fresh ones
    pub async fn reset_endpoint(&self, key: &EndpointKey) -> ApiScopeResult<TestSessionRecord> {
        let source = self.source_name()?;
        self.endpoint(key)?;
        self.sessions.clear_one(source, &key.to_string()).await?;
        info!("Reset test session for {}", key);
        self.prefill(key)
    }

    /// Endpoint keys with saved sessions for the loaded source
    pub async fn saved_sessions(&self) -> ApiScopeResult<Vec<String>> {
        Ok(self.sessions.endpoint_keys(self.source_name()?).await?)
    }

    /// Discard every saved session of the loaded source
    pub async fn clear_sessions(&self) -> ApiScopeResult<usize> {
        Ok(self
            .sessions
            .clear_all_for_source(self.source_name()?)
            .await?)
    }

    /// Request history
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Request history, for removal and clearing
    pub fn history_mut(&mut self) -> &mut HistoryLog {
        &mut self.history
    }

    /// Append a history entry for an executed request
    pub async fn record_execution(
        &mut self,
        key: &EndpointKey,
        url: &str,
        record: &TestSessionRecord,
        outcome: HistoryOutcome,
        duration_ms: u64,
    ) -> ApiScopeResult<HistoryEntry> {
        let source = self.source_name()?.to_string();
        let summary = self.endpoint(key)?.operation.summary.clone();

        let entry = HistoryEntry::new(
            source,
            key.method,
            url,
            key.path.clone(),
            RequestSnapshot::from(record),
            outcome,
            duration_ms,
        )
        .with_summary(summary);

        self.history.append(entry.clone()).await?;
        Ok(entry)
    }

    /// Build the request URL for inputs
    pub fn request_url(
        &self,
        key: &EndpointKey,
        record: &TestSessionRecord,
    ) -> ApiScopeResult<String> {
        let loaded = self.loaded()?;
        let endpoint = self.endpoint(key)?;
        let server = match &record.selected_server {
            Some(server) => server.clone(),
            None => loaded
                .document
                .server_urls()
                .into_iter()
                .next()
                .unwrap_or_else(|| "/".to_string()),
        };

        Ok(build_url(
            &server,
            &endpoint.path,
            &record.path_params,
            &record.query_params,
        ))
    }

    /// Send a request with the given inputs.
    ///
    /// A response (any status) is saved into the endpoint's session. Either
    /// way the attempt lands in the history; a transport failure becomes an
    /// error entry rather than an error return. If saving the session fails
    /// the history entry is still appended before the storage error returns.
    pub async fn execute(
        &mut self,
        key: &EndpointKey,
        mut record: TestSessionRecord,
        transport: &dyn Transport,
    ) -> ApiScopeResult<HistoryEntry> {
        let url = self.request_url(key, &record)?;
        let request = PreparedRequest {
            method: key.method,
            url: url.clone(),
            headers: record
                .headers
                .iter()
                .filter(|(name, value)| !name.is_empty() && !value.is_empty())
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            body: Some(record.body.clone()).filter(|body| !body.is_empty()),
        };

        info!("Executing {} {}", key.method, url);
        let started = Instant::now();
        let result = transport.send(request).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let (outcome, saved) = match result {
            Ok(response) => {
                debug!("{} {} -> {}", key.method, url, response.status);
                record.response = Some(response.clone());
                let saved = self.save_session(key, &record).await;
                if let Err(e) = &saved {
                    warn!("Could not save the response for {}: {}", key, e);
                }
                (HistoryOutcome::Response(response), saved)
            }
            Err(e) => {
                warn!("{} {} failed: {}", key.method, url, e);
                let outcome = HistoryOutcome::Error {
                    message: e.to_string(),
                };
                (outcome, Ok(()))
            }
        };

        // The request went out; it is recorded even when the session write failed
        let entry = self
            .record_execution(key, &url, &record, outcome, duration_ms)
            .await?;
        saved?;
        Ok(entry)
    }

    fn loaded(&self) -> ApiScopeResult<&LoadedSpec> {
        self.loaded.as_ref().ok_or(ApiScopeError::NoDocument)
    }

    fn source_name(&self) -> ApiScopeResult<&str> {
        Ok(&self.loaded()?.source.name)
    }
}
