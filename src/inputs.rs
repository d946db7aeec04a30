//! Fresh test inputs for an endpoint

use apiscope_document::{
    body_text, example_text, merge_parameters, request_body_example, ExampleSynthesizer,
    ParameterLocation, ParsedEndpoint, Resolver,
};
use apiscope_session::TestSessionRecord;

/// Header set alongside a drafted request body
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// Build the inputs used when no saved session exists.
///
/// Path, query and header parameters come from the merged parameter list,
/// each filled with its example as text. Cookie parameters are not drafted.
/// The body is the pretty-printed body example and the first server is
/// selected.
pub fn prefill_inputs(
    endpoint: &ParsedEndpoint,
    resolver: Resolver<'_>,
    servers: &[String],
) -> TestSessionRecord {
    let synthesizer = ExampleSynthesizer::new(resolver);
    let mut record = TestSessionRecord {
        selected_server: servers.first().cloned(),
        ..TestSessionRecord::default()
    };

    for parameter in merge_parameters(endpoint) {
        let value = example_text(&synthesizer.parameter_example(&parameter));
        let target = match parameter.location {
            ParameterLocation::Path => &mut record.path_params,
            ParameterLocation::Query => &mut record.query_params,
            ParameterLocation::Header => &mut record.headers,
            ParameterLocation::Cookie => continue,
        };
        target.insert(parameter.name, value);
    }

    if let Some(example) = request_body_example(endpoint, resolver) {
        record.body = body_text(&example.value);
        if !record
            .headers
            .keys()
            .any(|name| name.eq_ignore_ascii_case(CONTENT_TYPE_HEADER))
        {
            record
                .headers
                .insert(CONTENT_TYPE_HEADER.to_string(), example.content_type);
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiscope_document::{find_endpoint, list_endpoints, Document, EndpointKey};
    use serde_json::json;

    fn document() -> Document {
        Document::from_value(json!({
            "openapi": "3.0.3",
            "info": { "title": "Pets", "version": "1.0" },
            "servers": [{ "url": "https://pets.example.com" }, { "url": "/" }],
            "paths": {
                "/pets/{petId}": {
                    "parameters": [
                        { "name": "petId", "in": "path", "required": true, "schema": { "type": "integer" } },
                        { "name": "verbose", "in": "query", "schema": { "type": "boolean" } }
                    ],
                    "put": {
                        "parameters": [
                            { "name": "verbose", "in": "query", "example": "yes" },
                            { "name": "X-Trace", "in": "header", "schema": { "type": "string" } },
                            { "name": "session", "in": "cookie", "schema": { "type": "string" } }
                        ],
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": { "name": { "type": "string", "example": "Rex" } }
                                    }
                                }
                            }
                        },
                        "responses": {}
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_prefill_from_examples() {
        let document = document();
        let endpoints = list_endpoints(&document);
        let key: EndpointKey = "PUT:/pets/{petId}".parse().unwrap();
        let endpoint = find_endpoint(&endpoints, &key).unwrap();

        let record = prefill_inputs(endpoint, document.resolver(), &document.server_urls());

        assert_eq!(record.path_params["petId"], "0");
        assert_eq!(record.query_params["verbose"], "yes");
        assert_eq!(record.headers["X-Trace"], "string");
        assert_eq!(record.headers[CONTENT_TYPE_HEADER], "application/json");
        assert_eq!(record.body, "{\n  \"name\": \"Rex\"\n}");
        assert_eq!(
            record.selected_server.as_deref(),
            Some("https://pets.example.com")
        );
        assert!(record.response.is_none());
        assert_eq!(record.query_params.len(), 1);
        assert_eq!(record.headers.len(), 2);
    }
}
