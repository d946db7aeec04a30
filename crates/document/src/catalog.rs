//! Endpoint catalog and filtering

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::document::Document;
use crate::types::{HttpMethod, Operation, PathItem};

/// One declared operation, flattened out of the document.
///
/// Shares its path item with the other methods on the same path.
#[derive(Debug, Clone)]
pub struct ParsedEndpoint {
    /// HTTP method
    pub method: HttpMethod,

    /// Path template
    pub path: String,

    /// The operation itself
    pub operation: Operation,

    /// Owning path item (shared parameters, servers)
    pub path_item: Arc<PathItem>,
}

impl ParsedEndpoint {
    /// Persistence and lookup key for this endpoint
    pub fn key(&self) -> EndpointKey {
        EndpointKey::new(self.method, self.path.clone())
    }

    /// Text searched by the query filter, lower-cased
    fn haystack(&self) -> String {
        let operation = &self.operation;
        let tags = operation.tags.join(" ");
        let parts: Vec<&str> = [
            Some(self.path.as_str()),
            operation.summary.as_deref(),
            operation.description.as_deref(),
            operation.operation_id.as_deref(),
            Some(tags.as_str()),
        ]
        .into_iter()
        .flatten()
        .collect();

        parts.join(" ").to_lowercase()
    }
}

/// `METHOD:path` identifier of an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EndpointKey {
    pub method: HttpMethod,
    pub path: String,
}

impl EndpointKey {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.method, self.path)
    }
}

impl FromStr for EndpointKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (method, path) = s
            .split_once(':')
            .ok_or_else(|| format!("endpoint key must look like METHOD:/path, got {s}"))?;
        if path.is_empty() {
            return Err(format!("endpoint key has an empty path: {s}"));
        }
        Ok(Self::new(method.parse()?, path))
    }
}

impl TryFrom<String> for EndpointKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EndpointKey> for String {
    fn from(key: EndpointKey) -> Self {
        key.to_string()
    }
}

/// Flatten every declared `(path, method)` pair, in document order
pub fn list_endpoints(document: &Document) -> Vec<ParsedEndpoint> {
    let mut endpoints = Vec::new();

    for (path, item) in &document.api().paths {
        let shared = Arc::new(item.clone());
        for (method, operation) in &item.operations {
            endpoints.push(ParsedEndpoint {
                method: *method,
                path: path.clone(),
                operation: operation.clone(),
                path_item: Arc::clone(&shared),
            });
        }
    }

    endpoints
}

/// Look up an endpoint by key
pub fn find_endpoint<'e>(
    endpoints: &'e [ParsedEndpoint],
    key: &EndpointKey,
) -> Option<&'e ParsedEndpoint> {
    endpoints
        .iter()
        .find(|endpoint| endpoint.method == key.method && endpoint.path == key.path)
}

/// Filter criteria; every category is AND-ed, an empty category matches all
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointFilter {
    /// Whitespace-separated search terms, all of which must match
    #[serde(default)]
    pub query: Option<String>,

    /// Keep endpoints carrying at least one of these tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Keep endpoints with one of these methods
    #[serde(default)]
    pub methods: Vec<HttpMethod>,
}

impl EndpointFilter {
    /// Filter on a text query only
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_methods(mut self, methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    /// Whether no criteria are set
    pub fn is_empty(&self) -> bool {
        self.terms().is_empty() && self.tags.is_empty() && self.methods.is_empty()
    }

    fn terms(&self) -> Vec<String> {
        self.query
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_lowercase)
            .collect()
    }

    /// Whether an endpoint passes every criterion
    pub fn matches(&self, endpoint: &ParsedEndpoint) -> bool {
        self.matches_with_terms(endpoint, &self.terms())
    }

    fn matches_with_terms(&self, endpoint: &ParsedEndpoint, terms: &[String]) -> bool {
        if !self.methods.is_empty() && !self.methods.contains(&endpoint.method) {
            return false;
        }

        if !self.tags.is_empty()
            && !endpoint
                .operation
                .tags
                .iter()
                .any(|tag| self.tags.contains(tag))
        {
            return false;
        }

        if terms.is_empty() {
            return true;
        }
        let haystack = endpoint.haystack();
        terms.iter().all(|term| haystack.contains(term.as_str()))
    }

    /// The matching subset, order preserved
    pub fn apply<'e>(&self, endpoints: &'e [ParsedEndpoint]) -> Vec<&'e ParsedEndpoint> {
        let terms = self.terms();
        endpoints
            .iter()
            .filter(|endpoint| self.matches_with_terms(endpoint, &terms))
            .collect()
    }
}

/// Distinct tags across endpoints in first-seen order
pub fn collect_tags(endpoints: &[ParsedEndpoint]) -> Vec<String> {
    let mut seen = HashSet::new();
    endpoints
        .iter()
        .flat_map(|endpoint| endpoint.operation.tags.iter())
        .filter(|tag| seen.insert(tag.as_str()))
        .cloned()
        .collect()
}

/// Group name for endpoints without tags
pub const UNTAGGED_GROUP: &str = "default";

/// Endpoints grouped by their first tag, groups in first-seen order
pub fn group_by_tag(endpoints: &[ParsedEndpoint]) -> IndexMap<String, Vec<&ParsedEndpoint>> {
    let mut groups: IndexMap<String, Vec<&ParsedEndpoint>> = IndexMap::new();
    for endpoint in endpoints {
        let group = endpoint
            .operation
            .tags
            .first()
            .map(String::as_str)
            .unwrap_or(UNTAGGED_GROUP);
        groups.entry(group.to_string()).or_default().push(endpoint);
    }
    groups
}
