//! Validate command implementation

use crate::cli::utils;
use anyhow::Result;
use apiscope_document::{collect_tags, list_endpoints};
use clap::{ArgMatches, Command};
use tracing::info;

pub fn command() -> Command {
    Command::new("validate")
        .about("Check that a document is an acceptable OpenAPI 3.x document")
        .arg(utils::spec_arg())
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let (source, document) = utils::load_document(matches).await?;
    info!("Validated {}", source);

    let endpoints = list_endpoints(&document);
    let api_info = document.info();

    println!("Document is valid!");
    println!("Title: {}", api_info.title);
    println!("API version: {}", api_info.version);
    println!("OpenAPI version: {}", document.version());
    println!("Endpoints: {}", endpoints.len());

    println!("Servers:");
    for server in document.server_urls() {
        println!("  - {server}");
    }

    let tags = collect_tags(&endpoints);
    if !tags.is_empty() {
        println!("Tags: {}", tags.join(", "));
    }

    if let Some(etag) = &source.etag {
        println!("ETag: {etag}");
    }
    if let Some(last_modified) = &source.last_modified {
        println!("Last-Modified: {last_modified}");
    }

    Ok(())
}
