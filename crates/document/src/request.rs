//! Request drafting helpers
//!
//! Turns an endpoint into concrete starting values for a test request:
//! body and response examples, text renderings for input fields, and the
//! final request URL.

use indexmap::IndexMap;
use serde_json::Value;
use url::form_urlencoded;
use url::Url;

use crate::catalog::ParsedEndpoint;
use crate::example::ExampleSynthesizer;
use crate::resolver::Resolver;
use crate::types::{RequestBody, Response};

/// Preferred media type for request bodies
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Example payload for one media type
#[derive(Debug, Clone, PartialEq)]
pub struct BodyExample {
    pub content_type: String,
    pub value: Value,
}

/// Example request body for an endpoint.
///
/// `application/json` wins when declared, otherwise the first media type.
/// Returns `None` when the operation has no body or its reference does not
/// resolve.
pub fn request_body_example(
    endpoint: &ParsedEndpoint,
    resolver: Resolver<'_>,
) -> Option<BodyExample> {
    let body: RequestBody = resolver.deref(endpoint.operation.request_body.as_ref()?)?;

    let (content_type, media_type) = body
        .content
        .get_key_value(JSON_CONTENT_TYPE)
        .or_else(|| body.content.first())?;

    Some(BodyExample {
        content_type: content_type.clone(),
        value: ExampleSynthesizer::new(resolver).media_type_example(media_type),
    })
}

/// Example payload per declared response status.
///
/// Responses without content, or whose reference does not resolve, map to
/// `null`.
pub fn response_examples(endpoint: &ParsedEndpoint, resolver: Resolver<'_>) -> IndexMap<String, Value> {
    let synthesizer = ExampleSynthesizer::new(resolver);

    endpoint
        .operation
        .responses
        .iter()
        .map(|(status, response)| {
            let example = resolver
                .deref::<Response>(response)
                .and_then(|response| {
                    response
                        .content
                        .first()
                        .map(|(_, media_type)| synthesizer.media_type_example(media_type))
                })
                .unwrap_or(Value::Null);
            (status.clone(), example)
        })
        .collect()
}

/// Text form of an example for a single-line input field.
///
/// Strings are used verbatim, `null` is empty, everything else is compact JSON.
pub fn example_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Text form of a body example for an editor: pretty JSON, or empty for `null`
pub fn body_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Build the request URL from a server base and a path template.
///
/// `{name}` placeholders are substituted with percent-encoded values; missing
/// values leave the placeholder in place. Query parameters with empty values
/// are skipped. Relative servers (`/`, `/v1`) produce a relative URL.
pub fn build_url<'p>(
    server: &str,
    path: &str,
    path_params: impl IntoIterator<Item = (&'p String, &'p String)>,
    query_params: impl IntoIterator<Item = (&'p String, &'p String)>,
) -> String {
    let mut resolved_path = path.to_string();
    for (name, value) in path_params {
        resolved_path = resolved_path.replace(&format!("{{{name}}}"), &encode_path_value(value));
    }

    let query: Vec<(&String, &String)> = query_params
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect();

    let base = server.trim_end_matches('/');
    let joined = format!("{base}{resolved_path}");

    match Url::parse(&joined) {
        Ok(mut url) => {
            if !query.is_empty() {
                let mut pairs = url.query_pairs_mut();
                for (name, value) in &query {
                    pairs.append_pair(name, value);
                }
            }
            url.to_string()
        }
        Err(_) => {
            if query.is_empty() {
                return joined;
            }
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query)
                .finish();
            format!("{joined}?{encoded}")
        }
    }
}

/// Percent-encode a value so it stays inside one path segment
fn encode_path_value(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
