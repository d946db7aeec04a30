//! Send command implementation

use crate::cli::utils;
use crate::transport::HttpTransport;
use crate::utils::{format_bytes, format_duration_ms};
use anyhow::{anyhow, Result};
use apiscope_session::HistoryOutcome;
use clap::{ArgMatches, Command};
use std::time::Duration;

pub fn command() -> Command {
    Command::new("send")
        .about("Send a request with the saved (or prefilled) inputs of an endpoint")
        .arg(utils::config_arg())
        .arg(utils::spec_arg())
        .arg(utils::endpoint_arg(true))
        .arg(
            clap::Arg::new("timeout")
                .long("timeout")
                .help("Request timeout in seconds")
                .value_name("SECS")
                .value_parser(clap::value_parser!(u64))
                .default_value("30"),
        )
        .arg(
            clap::Arg::new("headers")
                .short('i')
                .long("include-headers")
                .help("Print response headers")
                .action(clap::ArgAction::SetTrue),
        )
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let mut workbench = utils::open_spec(matches).await?;
    let key = utils::endpoint_key(matches)?.ok_or_else(|| anyhow!("No endpoint given"))?;
    let timeout = matches.get_one::<u64>("timeout").copied().unwrap_or(30);

    let transport = HttpTransport::with_timeout(Duration::from_secs(timeout))?;
    let session = workbench.open_endpoint(&key).await?;
    let entry = workbench.execute(&key, session.record, &transport).await?;

    println!("{} {}", entry.method, entry.url);
    match &entry.outcome {
        HistoryOutcome::Response(response) => {
            println!(
                "{} {} ({}, {})",
                response.status,
                response.status_text,
                format_duration_ms(entry.duration_ms),
                format_bytes(response.body.len() as u64)
            );
            if matches.get_flag("headers") {
                for (name, value) in &response.headers {
                    println!("{name}: {value}");
                }
            }
            println!();
            println!("{}", pretty_body(&response.body));
            Ok(())
        }
        HistoryOutcome::Error { message } => Err(anyhow!("Request failed: {}", message)),
    }
}

/// Pretty-print JSON bodies, leave anything else as received
fn pretty_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| body.to_string())
}
