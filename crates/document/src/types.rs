//! OpenAPI 3.x document model
//!
//! Only the parts of the document the viewer and tester consume are typed.
//! Everything else (extensions, security, callbacks) is left in the raw
//! document and is still reachable through the reference resolver.

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Either an inline object or a `$ref` pointer to one.
///
/// A value is one or the other, never both: an object carrying a `$ref` key is
/// always read as a reference and its sibling keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    /// Pointer into the same document (`#/components/...`)
    Reference {
        #[serde(rename = "$ref")]
        reference: String,
    },

    /// Concrete object
    Item(T),
}

impl<T> RefOr<T> {
    /// Build a reference variant
    pub fn reference(pointer: impl Into<String>) -> Self {
        RefOr::Reference {
            reference: pointer.into(),
        }
    }

    /// The concrete item, if this is not a reference
    pub fn as_item(&self) -> Option<&T> {
        match self {
            RefOr::Item(item) => Some(item),
            RefOr::Reference { .. } => None,
        }
    }

    /// The reference string, if this is a reference
    pub fn as_reference(&self) -> Option<&str> {
        match self {
            RefOr::Reference { reference } => Some(reference),
            RefOr::Item(_) => None,
        }
    }
}

/// Top-level OpenAPI document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version string (`3.0.3`, `3.1.0`, ...)
    pub openapi: String,

    /// API information
    pub info: ApiInfo,

    /// Servers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,

    /// Paths in document order
    pub paths: IndexMap<String, PathItem>,

    /// Tag declarations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

/// API information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiInfo {
    /// API title
    #[serde(default)]
    pub title: String,

    /// API version
    #[serde(default)]
    pub version: String,

    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Tag declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name
    pub name: String,

    /// Tag description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Server entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Server {
    /// URL template, may contain `{variable}` placeholders
    pub url: String,

    /// Server description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Template variables
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, ServerVariable>,
}

impl Server {
    /// URL with every `{variable}` replaced by its default value
    pub fn resolved_url(&self) -> String {
        self.variables
            .iter()
            .fold(self.url.clone(), |url, (name, variable)| {
                url.replace(&format!("{{{name}}}"), &variable.default)
            })
    }
}

/// Server template variable
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerVariable {
    /// Default substitution value
    #[serde(default)]
    pub default: String,

    /// Allowed values
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// HTTP method an operation can be declared under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// All methods in the order OpenAPI lists them
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    /// Lower-case name as used for path item keys
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.as_str().to_ascii_uppercase())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown HTTP method: {s}"))
    }
}

impl Serialize for HttpMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HttpMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Path item: the operations declared on one path plus shared parameters
#[derive(Debug, Clone, Default)]
pub struct PathItem {
    /// Path summary
    pub summary: Option<String>,

    /// Path description
    pub description: Option<String>,

    /// Parameters shared by every operation on this path
    pub parameters: Vec<RefOr<Parameter>>,

    /// Path-level server overrides
    pub servers: Vec<Server>,

    /// Operations keyed by method, in document order
    pub operations: IndexMap<HttpMethod, Operation>,
}

// Method keys are interleaved with the other path item fields, so the
// document order of operations is only recoverable by walking the raw map.
impl<'de> Deserialize<'de> for PathItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut item = PathItem::default();

        for (key, value) in raw {
            if let Ok(method) = key.parse::<HttpMethod>() {
                let operation = Operation::deserialize(value)
                    .map_err(|e| de::Error::custom(format!("{method} operation: {e}")))?;
                item.operations.insert(method, operation);
                continue;
            }

            match key.as_str() {
                "summary" => item.summary = value.as_str().map(str::to_string),
                "description" => item.description = value.as_str().map(str::to_string),
                "parameters" => {
                    item.parameters = Vec::deserialize(value)
                        .map_err(|e| de::Error::custom(format!("path parameters: {e}")))?;
                }
                "servers" => {
                    item.servers = Vec::deserialize(value)
                        .map_err(|e| de::Error::custom(format!("path servers: {e}")))?;
                }
                // `$ref` path items and `x-` extensions are not interpreted
                _ => {}
            }
        }

        Ok(item)
    }
}

impl Serialize for PathItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(summary) = &self.summary {
            map.serialize_entry("summary", summary)?;
        }
        if let Some(description) = &self.description {
            map.serialize_entry("description", description)?;
        }
        if !self.parameters.is_empty() {
            map.serialize_entry("parameters", &self.parameters)?;
        }
        if !self.servers.is_empty() {
            map.serialize_entry("servers", &self.servers)?;
        }
        for (method, operation) in &self.operations {
            map.serialize_entry(method.as_str(), operation)?;
        }
        map.end()
    }
}

/// A single operation (one method on one path)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Operation summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Operation description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Operation tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Operation ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    /// Operation-level parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<RefOr<Parameter>>,

    /// Request body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RefOr<RequestBody>>,

    /// Responses keyed by status code (or `default`)
    #[serde(default)]
    pub responses: IndexMap<String, RefOr<Response>>,

    /// Whether the operation is deprecated
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

/// Where a parameter is carried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Path => "path",
            ParameterLocation::Cookie => "cookie",
        };
        f.write_str(name)
    }
}

/// Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,

    /// Parameter location
    #[serde(rename = "in")]
    pub location: ParameterLocation,

    /// Parameter description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the parameter is required
    #[serde(default)]
    pub required: bool,

    /// Whether the parameter is deprecated
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,

    /// Parameter schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<RefOr<Schema>>,

    /// Single example
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    /// Named examples
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, RefOr<Example>>,
}

/// Request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestBody {
    /// Request body description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Content by media type, in document order
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,

    /// Whether the body is required
    #[serde(default)]
    pub required: bool,
}

/// Response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    #[serde(default)]
    pub description: String,

    /// Content by media type, in document order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
}

/// Media type entry of a request body or response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaType {
    /// Payload schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<RefOr<Schema>>,

    /// Single example
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    /// Named examples
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, RefOr<Example>>,
}

/// Named example
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    /// Short summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Embedded example value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// URL of an external example (never fetched)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_value: Option<String>,
}

/// Declared schema type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Object,
    Array,
    String,
    Integer,
    Number,
    Boolean,
}

impl FromStr for SchemaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "object" => Ok(SchemaKind::Object),
            "array" => Ok(SchemaKind::Array),
            "string" => Ok(SchemaKind::String),
            "integer" => Ok(SchemaKind::Integer),
            "number" => Ok(SchemaKind::Number),
            "boolean" => Ok(SchemaKind::Boolean),
            other => Err(format!("unrecognized schema type: {other}")),
        }
    }
}

/// Schema object.
///
/// Reading is lenient: a boolean schema (3.1 `true`/`false`) or any other
/// non-object reads as an empty schema, and a keyword whose value has the
/// wrong shape is dropped without failing the surrounding document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Declared type: a string, or (3.1) a list of strings
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<Value>,

    /// Format hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Object properties in document order
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, RefOr<Schema>>,

    /// Required property names
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// Array item schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<RefOr<Schema>>>,

    /// Allowed values
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,

    /// Explicit example
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    /// Default value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Composition: all of
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<RefOr<Schema>>,

    /// Composition: one of
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<RefOr<Schema>>,

    /// Composition: any of
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<RefOr<Schema>>,
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(Schema::from_value(&raw))
    }
}

impl Schema {
    /// Read a schema node, keeping every keyword that is well formed
    pub fn from_value(raw: &Value) -> Self {
        let Some(fields) = raw.as_object() else {
            return Schema::default();
        };

        Schema {
            schema_type: keyword::<Value>(fields, "type").filter(|v| !v.is_null()),
            format: keyword(fields, "format"),
            description: keyword(fields, "description"),
            properties: keyword(fields, "properties").unwrap_or_default(),
            required: keyword(fields, "required").unwrap_or_default(),
            items: keyword(fields, "items"),
            enum_values: keyword(fields, "enum").unwrap_or_default(),
            example: keyword::<Value>(fields, "example").filter(|v| !v.is_null()),
            default: keyword::<Value>(fields, "default").filter(|v| !v.is_null()),
            all_of: keyword(fields, "allOf").unwrap_or_default(),
            one_of: keyword(fields, "oneOf").unwrap_or_default(),
            any_of: keyword(fields, "anyOf").unwrap_or_default(),
        }
    }

    /// The declared type, if it is one of the recognized kinds.
    ///
    /// For a 3.1 type list the first non-`null` entry wins.
    pub fn kind(&self) -> Option<SchemaKind> {
        match self.schema_type.as_ref()? {
            Value::String(name) => name.parse().ok(),
            Value::Array(names) => names
                .iter()
                .filter_map(Value::as_str)
                .find(|name| *name != "null")
                .and_then(|name| name.parse().ok()),
            _ => None,
        }
    }
}

/// One schema keyword, or `None` when absent or of the wrong shape
fn keyword<T: de::DeserializeOwned>(fields: &serde_json::Map<String, Value>, name: &str) -> Option<T> {
    fields.get(name).and_then(|value| T::deserialize(value).ok())
}
