//! Spec loading from files and URLs
//!
//! Produces the parsed JSON tree and its [`SpecSource`]; acceptance is left to
//! the workbench.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::source::SpecSource;

/// Text format of a spec file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Json,
    Yaml,
}

impl SpecFormat {
    /// Guess the format from a file name or URL path
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        let lower = lower.split(['?', '#']).next().unwrap_or_default();
        if lower.ends_with(".json") {
            Some(SpecFormat::Json)
        } else if lower.ends_with(".yaml") || lower.ends_with(".yml") {
            Some(SpecFormat::Yaml)
        } else {
            None
        }
    }
}

/// Whether a location names a remote document
pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Parse spec text; without a format hint JSON is tried before YAML
pub fn parse_spec_text(content: &str, format: Option<SpecFormat>) -> Result<Value> {
    match format {
        Some(SpecFormat::Json) => serde_json::from_str(content).context("Invalid JSON document"),
        Some(SpecFormat::Yaml) => serde_yaml::from_str(content).context("Invalid YAML document"),
        None => serde_json::from_str(content).or_else(|json_error| {
            serde_yaml::from_str(content).map_err(|yaml_error| {
                anyhow!(
                    "Document is neither JSON ({}) nor YAML ({})",
                    json_error,
                    yaml_error
                )
            })
        }),
    }
}

/// Read and parse a spec file
pub async fn load_file(path: &Path) -> Result<(SpecSource, Value)> {
    let canonical = tokio::fs::canonicalize(path)
        .await
        .with_context(|| format!("Spec file not found: {:?}", path))?;
    let content = tokio::fs::read_to_string(&canonical)
        .await
        .with_context(|| format!("Failed to read spec file {:?}", canonical))?;

    let name = canonical.to_string_lossy().into_owned();
    let value = parse_spec_text(&content, SpecFormat::from_name(&name))
        .with_context(|| format!("Failed to parse spec file {:?}", canonical))?;

    debug!("Read {} bytes from {}", content.len(), name);
    Ok((SpecSource::file(name), value))
}

/// Fetch and parse a remote spec, keeping its cache validators
#[cfg(feature = "http")]
pub async fn load_url(url: &str) -> Result<(SpecSource, Value)> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("Failed to fetch {}", url))?
        .error_for_status()
        .with_context(|| format!("Failed to fetch {}", url))?;

    let header = |name: reqwest::header::HeaderName| {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    let mut source = SpecSource::url(url);
    source.etag = header(reqwest::header::ETAG);
    source.last_modified = header(reqwest::header::LAST_MODIFIED);

    let content = response
        .text()
        .await
        .with_context(|| format!("Failed to read {}", url))?;
    let value = parse_spec_text(&content, SpecFormat::from_name(url))
        .with_context(|| format!("Failed to parse {}", url))?;

    debug!("Fetched {} bytes from {}", content.len(), url);
    Ok((source, value))
}

/// Load a spec from a path, or from a URL when built with `http`
pub async fn load_spec(location: &str) -> Result<(SpecSource, Value)> {
    if is_url(location) {
        #[cfg(feature = "http")]
        return load_url(location).await;

        #[cfg(not(feature = "http"))]
        return Err(anyhow!(
            "Loading specs from URLs requires the `http` feature: {}",
            location
        ));
    }

    load_file(Path::new(location)).await
}
