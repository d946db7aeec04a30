//! Loaded document and the validation boundary

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{DocumentError, DocumentResult};
use crate::resolver::Resolver;
use crate::types::{ApiInfo, OpenApiDocument, Server};

/// An accepted OpenAPI document.
///
/// Holds the raw JSON tree, which is the `$ref` resolution root, next to the
/// typed view of it. Immutable once built; a reload builds a new one.
#[derive(Debug, Clone)]
pub struct Document {
    raw: Value,
    api: OpenApiDocument,
}

impl Document {
    /// Validate and accept an already-parsed document
    pub fn from_value(raw: Value) -> DocumentResult<Self> {
        validate(&raw)?;
        let api = OpenApiDocument::deserialize(&raw).map_err(DocumentError::Malformed)?;

        debug!(
            "Accepted OpenAPI {} document '{}' with {} paths",
            api.openapi,
            api.info.title,
            api.paths.len()
        );

        Ok(Self { raw, api })
    }

    /// Parse JSON text and accept it
    pub fn from_json_str(content: &str) -> DocumentResult<Self> {
        let raw: Value = serde_json::from_str(content).map_err(DocumentError::Malformed)?;
        Self::from_value(raw)
    }

    /// Raw JSON tree
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Typed view
    pub fn api(&self) -> &OpenApiDocument {
        &self.api
    }

    /// API information
    pub fn info(&self) -> &ApiInfo {
        &self.api.info
    }

    /// Declared OpenAPI version
    pub fn version(&self) -> &str {
        &self.api.openapi
    }

    /// Declared servers
    pub fn servers(&self) -> &[Server] {
        &self.api.servers
    }

    /// Server URLs with template variables substituted.
    ///
    /// A document without servers is served relative to `/`.
    pub fn server_urls(&self) -> Vec<String> {
        if self.api.servers.is_empty() {
            return vec!["/".to_string()];
        }
        self.api.servers.iter().map(Server::resolved_url).collect()
    }

    /// Reference resolver rooted at this document
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.raw)
    }
}

/// Check the minimal shape required before a document is accepted:
/// a string `openapi` field starting with `3.`, an `info` object and a
/// `paths` object.
pub fn validate(raw: &Value) -> DocumentResult<()> {
    let root = raw
        .as_object()
        .ok_or_else(|| DocumentError::invalid("document root must be a JSON object"))?;

    let version = match root.get("openapi") {
        Some(Value::String(version)) => version,
        Some(_) => return Err(DocumentError::invalid("`openapi` field must be a string")),
        None => {
            let hint = if root.contains_key("swagger") {
                " (Swagger 2.0 documents are not supported)"
            } else {
                ""
            };
            return Err(DocumentError::invalid(format!(
                "missing `openapi` version field{hint}"
            )));
        }
    };

    if !version.starts_with("3.") {
        return Err(DocumentError::invalid(format!(
            "unsupported OpenAPI version `{version}`, expected 3.x"
        )));
    }

    if !root.get("info").is_some_and(Value::is_object) {
        return Err(DocumentError::invalid("missing `info` object"));
    }

    if !root.get("paths").is_some_and(Value::is_object) {
        return Err(DocumentError::invalid("missing `paths` object"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reason(value: Value) -> String {
        match Document::from_value(value) {
            Err(DocumentError::Invalid { reason }) => reason,
            other => panic!("expected an invalid document, got {other:?}"),
        }
    }

    #[test]
    fn test_accepts_minimal_document() {
        let document = Document::from_value(json!({
            "openapi": "3.0.3",
            "info": { "title": "Pets", "version": "1.0.0" },
            "paths": {}
        }))
        .unwrap();

        assert_eq!(document.info().title, "Pets");
        assert_eq!(document.version(), "3.0.3");
        assert_eq!(document.server_urls(), vec!["/"]);
    }

    #[test]
    fn test_rejects_swagger_two() {
        let reason = reason(json!({ "swagger": "2.0", "info": {}, "paths": {} }));
        assert!(reason.contains("Swagger 2.0"));
    }

    #[test]
    fn test_rejects_wrong_version_and_shapes() {
        assert!(reason(json!({ "openapi": "2.0", "info": {}, "paths": {} })).contains("2.0"));
        assert!(reason(json!({ "openapi": 3.0, "info": {}, "paths": {} })).contains("string"));
        assert!(reason(json!({ "openapi": "3.1.0", "paths": {} })).contains("info"));
        assert!(reason(json!({ "openapi": "3.1.0", "info": {}, "paths": [] })).contains("paths"));
        assert!(reason(json!([1, 2, 3])).contains("object"));
    }

    #[test]
    fn test_loose_schemas_do_not_reject_document() {
        let document = Document::from_value(json!({
            "openapi": "3.1.0",
            "info": { "title": "Loose", "version": "1" },
            "paths": {
                "/odd": {
                    "post": {
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": {
                                            "any": true,
                                            "id": { "type": "string", "required": true }
                                        }
                                    }
                                }
                            }
                        },
                        "responses": {}
                    }
                },
                "/good": { "get": { "responses": { "200": { "description": "OK" } } } }
            }
        }))
        .unwrap();

        let endpoints = crate::list_endpoints(&document);
        let keys: Vec<_> = endpoints.iter().map(|e| e.key().to_string()).collect();
        assert_eq!(keys, vec!["POST:/odd", "GET:/good"]);

        let body = crate::request_body_example(&endpoints[0], document.resolver()).unwrap();
        assert_eq!(body.value, json!({ "any": null, "id": "string" }));
    }

    #[test]
    fn test_malformed_json_text() {
        assert!(matches!(
            Document::from_json_str("{ not json"),
            Err(DocumentError::Malformed(_))
        ));
    }
}
