//! OpenAPI document interpretation
//!
//! Turns an already-parsed OpenAPI 3.x document into navigable endpoint
//! records: `$ref` resolution, example synthesis, parameter merging and
//! endpoint filtering. Everything here is synchronous and side-effect free.

pub mod catalog;
pub mod document;
pub mod error;
pub mod example;
pub mod params;
pub mod request;
pub mod resolver;
pub mod types;

pub use catalog::{
    collect_tags, find_endpoint, group_by_tag, list_endpoints, EndpointFilter, EndpointKey,
    ParsedEndpoint,
};
pub use document::{validate, Document};
pub use error::{DocumentError, DocumentResult};
pub use example::{parse_embedded_json, ExampleSynthesizer, MAX_DEPTH};
pub use params::{merge_parameter_lists, merge_parameters, parameters_in};
pub use request::{body_text, build_url, example_text, request_body_example, response_examples, BodyExample};
pub use resolver::Resolver;
pub use types::*;

use serde_json::Value;

/// Synthesize an example for a schema against a document
pub fn synthesize(schema: &RefOr<Schema>, document: &Document) -> Value {
    ExampleSynthesizer::new(document.resolver()).synthesize(schema)
}
