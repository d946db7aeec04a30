//! Inspect command implementation

use crate::cli::utils;
use anyhow::{anyhow, Result};
use apiscope_document::{
    body_text, example_text, find_endpoint, list_endpoints, merge_parameters,
    request_body_example, response_examples, ExampleSynthesizer,
};
use clap::{ArgMatches, Command};

pub fn command() -> Command {
    Command::new("inspect")
        .about("Show the parameters, request body and responses of one endpoint")
        .arg(utils::spec_arg())
        .arg(utils::endpoint_arg(true))
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let (_, document) = utils::load_document(matches).await?;
    let key = utils::endpoint_key(matches)?.ok_or_else(|| anyhow!("No endpoint given"))?;

    let endpoints = list_endpoints(&document);
    let endpoint =
        find_endpoint(&endpoints, &key).ok_or_else(|| anyhow!("Unknown endpoint: {}", key))?;
    let resolver = document.resolver();
    let synthesizer = ExampleSynthesizer::new(resolver);
    let operation = &endpoint.operation;

    println!("{} {}", endpoint.method, endpoint.path);
    if let Some(summary) = &operation.summary {
        println!("{summary}");
    }
    if let Some(description) = &operation.description {
        println!("\n{description}");
    }
    if let Some(operation_id) = &operation.operation_id {
        println!("Operation ID: {operation_id}");
    }
    if !operation.tags.is_empty() {
        println!("Tags: {}", operation.tags.join(", "));
    }
    if operation.deprecated {
        println!("Deprecated");
    }

    let parameters = merge_parameters(endpoint);
    if !parameters.is_empty() {
        println!("\nParameters:");
        for parameter in &parameters {
            println!(
                "  {} ({}{}) = {}",
                parameter.name,
                parameter.location,
                if parameter.required { ", required" } else { "" },
                example_text(&synthesizer.parameter_example(parameter))
            );
            if let Some(description) = &parameter.description {
                println!("      {description}");
            }
        }
    }

    if let Some(body) = request_body_example(endpoint, resolver) {
        println!("\nRequest body ({}):", body.content_type);
        println!("{}", body_text(&body.value));
    }

    let responses = response_examples(endpoint, resolver);
    if !responses.is_empty() {
        println!("\nResponses:");
        for (status, example) in &responses {
            println!("  {status}");
            let text = body_text(example);
            for line in text.lines() {
                println!("    {line}");
            }
        }
    }

    Ok(())
}
