use apiscope::{
    ApiScopeError, PreparedRequest, SpecSource, Transport, TransportError, Workbench,
    ACTIVE_SOURCE_KEY,
};
use apiscope_document::{EndpointFilter, EndpointKey, HttpMethod};
use apiscope_session::{
    HistoryLimits, HistoryOutcome, MemoryStorage, ResponseSnapshot, StorageBackend,
    StorageError, StorageResult, TestSessionRecord, TestSessionStore, SESSION_NAMESPACE,
};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

fn petstore() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": { "title": "Petstore", "version": "1.0.0" },
        "servers": [{ "url": "https://{env}.pets.example.com/v1", "variables": { "env": { "default": "api" } } }],
        "paths": {
            "/pets": {
                "get": {
                    "summary": "List pets",
                    "tags": ["pets"],
                    "parameters": [
                        { "name": "limit", "in": "query", "schema": { "type": "integer", "example": 10 } }
                    ],
                    "responses": { "200": { "description": "OK" } }
                },
                "post": {
                    "summary": "Create a pet",
                    "tags": ["pets"],
                    "requestBody": {
                        "content": {
                            "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } }
                        }
                    },
                    "responses": { "201": { "description": "Created" } }
                }
            },
            "/pets/{petId}": {
                "parameters": [
                    { "name": "petId", "in": "path", "required": true, "schema": { "type": "string", "example": "rex" } }
                ],
                "get": {
                    "summary": "Show a pet",
                    "tags": ["pets"],
                    "responses": { "200": { "description": "OK" } }
                }
            },
            "/health": {
                "get": { "operationId": "health", "responses": { "200": { "description": "OK" } } }
            }
        },
        "components": {
            "schemas": {
                "Pet": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "parent": { "$ref": "#/components/schemas/Pet" }
                    }
                }
            }
        }
    })
}

fn other_spec() -> Value {
    json!({
        "openapi": "3.1.0",
        "info": { "title": "Other", "version": "2" },
        "paths": {
            "/pets": { "get": { "responses": {} } }
        }
    })
}

fn key(text: &str) -> EndpointKey {
    text.parse().unwrap()
}

async fn workbench(backend: Arc<MemoryStorage>) -> Workbench {
    Workbench::open(backend, HistoryLimits::default())
        .await
        .unwrap()
}

/// Answers every request with a fixed response and remembers what it saw
struct FakeTransport {
    status: u16,
    seen: Mutex<Vec<PreparedRequest>>,
}

impl FakeTransport {
    fn new(status: u16) -> Self {
        Self {
            status,
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: PreparedRequest) -> Result<ResponseSnapshot, TransportError> {
        self.seen.lock().unwrap().push(request);
        Ok(ResponseSnapshot {
            status: self.status,
            status_text: "OK".to_string(),
            headers: IndexMap::new(),
            body: "{\"ok\":true}".to_string(),
            duration_ms: 1,
        })
    }
}

/// Memory storage that refuses writes to keys under a chosen prefix
struct GuardedStorage {
    inner: MemoryStorage,
    refused: Mutex<Option<String>>,
}

impl GuardedStorage {
    fn new() -> Self {
        Self {
            inner: MemoryStorage::new(),
            refused: Mutex::new(None),
        }
    }

    fn refuse(&self, prefix: &str) {
        *self.refused.lock().unwrap() = Some(prefix.to_string());
    }
}

#[async_trait]
impl StorageBackend for GuardedStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> StorageResult<()> {
        let refused = self.refused.lock().unwrap().clone();
        if let Some(prefix) = refused {
            if key.starts_with(&prefix) {
                return Err(StorageError::Backend(format!("write refused: {key}")));
            }
        }
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key).await
    }

    async fn keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.inner.keys(prefix).await
    }
}

struct UnreachableTransport;

#[async_trait]
impl Transport for UnreachableTransport {
    async fn send(&self, _request: PreparedRequest) -> Result<ResponseSnapshot, TransportError> {
        Err(TransportError::Failed("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_catalog_and_filtering() {
    let mut workbench = workbench(Arc::new(MemoryStorage::new())).await;
    assert!(workbench.endpoints().is_empty());
    assert!(matches!(
        workbench.endpoint(&key("GET:/pets")),
        Err(ApiScopeError::NoDocument)
    ));

    let document = workbench
        .load_document(SpecSource::file("petstore.json"), petstore())
        .await
        .unwrap();
    assert_eq!(document.info().title, "Petstore");

    let keys: Vec<String> = workbench
        .endpoints()
        .iter()
        .map(|endpoint| endpoint.key().to_string())
        .collect();
    assert_eq!(
        keys,
        vec!["GET:/pets", "POST:/pets", "GET:/pets/{petId}", "GET:/health"]
    );

    let filter = EndpointFilter::query("pet").with_methods([HttpMethod::Get]);
    let matched: Vec<String> = workbench
        .filter(&filter)
        .into_iter()
        .map(|endpoint| endpoint.path.clone())
        .collect();
    assert_eq!(matched, vec!["/pets", "/pets/{petId}"]);

    assert!(matches!(
        workbench.endpoint(&key("DELETE:/pets")),
        Err(ApiScopeError::UnknownEndpoint(_))
    ));
}

#[tokio::test]
async fn test_open_endpoint_prefills_then_restores() {
    let mut workbench = workbench(Arc::new(MemoryStorage::new())).await;
    workbench
        .load_document(SpecSource::file("petstore.json"), petstore())
        .await
        .unwrap();

    let session = workbench.open_endpoint(&key("GET:/pets/{petId}")).await.unwrap();
    assert!(!session.restored);
    assert_eq!(session.record.path_params["petId"], "rex");
    assert_eq!(
        session.record.selected_server.as_deref(),
        Some("https://api.pets.example.com/v1")
    );

    let post = workbench.open_endpoint(&key("POST:/pets")).await.unwrap();
    let body: Value = serde_json::from_str(&post.record.body).unwrap();
    assert_eq!(body["name"], "string");
    assert!(body["parent"].is_object());

    let mut record = session.record.clone();
    record.path_params.insert("petId".to_string(), "fido".to_string());
    workbench
        .save_session(&key("GET:/pets/{petId}"), &record)
        .await
        .unwrap();

    let restored = workbench.open_endpoint(&key("GET:/pets/{petId}")).await.unwrap();
    assert!(restored.restored);
    assert_eq!(restored.record, record);

    let fresh = workbench
        .reset_endpoint(&key("GET:/pets/{petId}"))
        .await
        .unwrap();
    assert_eq!(fresh.path_params["petId"], "rex");
    assert!(!workbench
        .open_endpoint(&key("GET:/pets/{petId}"))
        .await
        .unwrap()
        .restored);
}

#[tokio::test]
async fn test_source_switch_clears_previous_sessions_only() {
    let backend = Arc::new(MemoryStorage::new());
    let store = TestSessionStore::new(backend.clone());
    let saved = TestSessionRecord {
        body: "kept".to_string(),
        ..TestSessionRecord::default()
    };
    store.save("B", "GET:/pets", &saved).await.unwrap();

    let mut workbench = workbench(backend.clone()).await;
    workbench
        .load_document(SpecSource::file("A"), petstore())
        .await
        .unwrap();
    workbench
        .save_session(&key("GET:/pets"), &TestSessionRecord::default())
        .await
        .unwrap();
    assert_eq!(workbench.saved_sessions().await.unwrap(), vec!["GET:/pets"]);

    workbench
        .load_document(SpecSource::file("B"), other_spec())
        .await
        .unwrap();

    assert!(store.load("A", "GET:/pets").await.unwrap().is_none());
    assert_eq!(store.load("B", "GET:/pets").await.unwrap(), Some(saved));
    assert_eq!(
        backend.get(ACTIVE_SOURCE_KEY).await.unwrap().as_deref(),
        Some("B")
    );
}

#[tokio::test]
async fn test_reloading_same_source_keeps_sessions() {
    let backend = Arc::new(MemoryStorage::new());
    let mut workbench = workbench(backend.clone()).await;
    workbench
        .load_document(SpecSource::file("A"), petstore())
        .await
        .unwrap();
    workbench
        .save_session(&key("GET:/health"), &TestSessionRecord::default())
        .await
        .unwrap();

    workbench
        .load_document(SpecSource::file("A"), petstore())
        .await
        .unwrap();
    assert_eq!(workbench.saved_sessions().await.unwrap(), vec!["GET:/health"]);
}

#[tokio::test]
async fn test_source_switch_survives_restart() {
    let backend = Arc::new(MemoryStorage::new());

    let mut first = workbench(backend.clone()).await;
    first
        .load_document(SpecSource::file("A"), petstore())
        .await
        .unwrap();
    first
        .save_session(&key("GET:/health"), &TestSessionRecord::default())
        .await
        .unwrap();
    drop(first);

    let mut second = workbench(backend.clone()).await;
    second
        .load_document(SpecSource::file("B"), other_spec())
        .await
        .unwrap();

    let store = TestSessionStore::new(backend);
    assert!(store.endpoint_keys("A").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_document_leaves_state_untouched() {
    let backend = Arc::new(MemoryStorage::new());
    let mut workbench = workbench(backend.clone()).await;
    workbench
        .load_document(SpecSource::file("A"), petstore())
        .await
        .unwrap();
    workbench
        .save_session(&key("GET:/health"), &TestSessionRecord::default())
        .await
        .unwrap();

    let swagger = json!({ "swagger": "2.0", "info": {}, "paths": {} });
    let error = workbench
        .load_document(SpecSource::file("B"), swagger)
        .await
        .unwrap_err();
    assert!(matches!(error, ApiScopeError::Document(_)));
    assert!(error.to_string().contains("Swagger 2.0"));

    assert_eq!(workbench.source().unwrap().name, "A");
    assert_eq!(workbench.endpoints().len(), 4);
    assert_eq!(workbench.saved_sessions().await.unwrap(), vec!["GET:/health"]);
}

#[tokio::test]
async fn test_execute_records_response_and_history() {
    let mut workbench = workbench(Arc::new(MemoryStorage::new())).await;
    workbench
        .load_document(SpecSource::file("petstore.json"), petstore())
        .await
        .unwrap();

    let transport = FakeTransport::new(200);
    let record = workbench.open_endpoint(&key("GET:/pets")).await.unwrap().record;
    let entry = workbench
        .execute(&key("GET:/pets"), record, &transport)
        .await
        .unwrap();

    assert_eq!(entry.url, "https://api.pets.example.com/v1/pets?limit=10");
    assert_eq!(entry.method, HttpMethod::Get);
    assert_eq!(entry.summary.as_deref(), Some("List pets"));
    assert_eq!(entry.outcome.status(), Some(200));
    assert_eq!(entry.spec_id, "petstore.json");

    let seen = transport.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, HttpMethod::Get);
    assert_eq!(seen[0].body, None);

    let session = workbench.open_endpoint(&key("GET:/pets")).await.unwrap();
    assert!(session.restored);
    assert_eq!(session.record.response.unwrap().body, "{\"ok\":true}");

    assert_eq!(workbench.history().len(), 1);
    assert_eq!(workbench.history().for_spec("petstore.json").len(), 1);
}

#[tokio::test]
async fn test_transport_failure_becomes_error_entry() {
    let mut workbench = workbench(Arc::new(MemoryStorage::new())).await;
    workbench
        .load_document(SpecSource::file("petstore.json"), petstore())
        .await
        .unwrap();

    let record = workbench.prefill(&key("POST:/pets")).unwrap();
    let entry = workbench
        .execute(&key("POST:/pets"), record, &UnreachableTransport)
        .await
        .unwrap();

    match &entry.outcome {
        HistoryOutcome::Error { message } => assert!(message.contains("connection refused")),
        other => panic!("expected an error entry, got {other:?}"),
    }
    assert!(entry.request.body.is_some());
    assert!(!workbench
        .open_endpoint(&key("POST:/pets"))
        .await
        .unwrap()
        .restored);
    assert_eq!(workbench.history().len(), 1);
}

#[tokio::test]
async fn test_history_export_after_executions() {
    let mut workbench = workbench(Arc::new(MemoryStorage::new())).await;
    workbench
        .load_document(SpecSource::file("petstore.json"), petstore())
        .await
        .unwrap();

    let transport = FakeTransport::new(404);
    for _ in 0..3 {
        let record = workbench.prefill(&key("GET:/health")).unwrap();
        workbench
            .execute(&key("GET:/health"), record, &transport)
            .await
            .unwrap();
    }

    let csv = workbench
        .history()
        .export(apiscope_session::ExportFormat::Csv, Some("petstore.json"))
        .unwrap();
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.lines().nth(1).unwrap().contains(",404,"));
}

#[tokio::test]
async fn test_failed_source_write_keeps_previous_sessions() {
    let backend = Arc::new(GuardedStorage::new());
    let mut workbench = Workbench::open(backend.clone(), HistoryLimits::default())
        .await
        .unwrap();
    workbench
        .load_document(SpecSource::file("A"), petstore())
        .await
        .unwrap();
    workbench
        .save_session(&key("GET:/health"), &TestSessionRecord::default())
        .await
        .unwrap();

    backend.refuse(ACTIVE_SOURCE_KEY);
    let error = workbench
        .load_document(SpecSource::file("B"), other_spec())
        .await
        .unwrap_err();
    assert!(matches!(error, ApiScopeError::Storage(_)));

    assert_eq!(workbench.source().unwrap().name, "A");
    assert_eq!(workbench.saved_sessions().await.unwrap(), vec!["GET:/health"]);
    assert_eq!(
        backend.get(ACTIVE_SOURCE_KEY).await.unwrap().as_deref(),
        Some("A")
    );
}

#[tokio::test]
async fn test_session_write_failure_still_records_history() {
    let backend = Arc::new(GuardedStorage::new());
    let mut workbench = Workbench::open(backend.clone(), HistoryLimits::default())
        .await
        .unwrap();
    workbench
        .load_document(SpecSource::file("petstore.json"), petstore())
        .await
        .unwrap();

    backend.refuse(&format!("{SESSION_NAMESPACE}:"));
    let transport = FakeTransport::new(200);
    let record = workbench.prefill(&key("GET:/health")).unwrap();
    let error = workbench
        .execute(&key("GET:/health"), record, &transport)
        .await
        .unwrap_err();
    assert!(matches!(error, ApiScopeError::Storage(_)));

    assert_eq!(transport.seen.lock().unwrap().len(), 1);
    assert_eq!(workbench.history().len(), 1);
    let entries = workbench.history().for_spec("petstore.json");
    assert_eq!(entries[0].outcome.status(), Some(200));
}
