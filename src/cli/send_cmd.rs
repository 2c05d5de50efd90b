use anyhow::{Context, Result};
use std::path::PathBuf;

use usage_forwarder::core::config::{EndpointConfig, URL_ENV};
use usage_forwarder::core::forwarder::UsageEventForwarder;
use usage_forwarder::core::models::outcome::DeliveryOutcome;
use usage_forwarder::core::models::usage::EventStatus;

use crate::cli::input;
use crate::cli::output::{to_json, OutputFormat, OutputOptions};
use crate::cli::renderer;

/// Forward one event to the configured endpoint and report the outcome.
pub async fn run(
    status: EventStatus,
    event_path: Option<&PathBuf>,
    response_path: Option<&PathBuf>,
    opts: &OutputOptions,
) -> Result<()> {
    let config = EndpointConfig::load().context("Failed to load endpoint config")?;

    let issues = config.validate();
    if !issues.is_empty() {
        eprintln!("Config issues found:");
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
        std::process::exit(1);
    }

    let input = input::load(event_path, response_path)?;
    let forwarder = UsageEventForwarder::new(&config)?;
    if opts.verbose {
        if let Some(url) = config.url() {
            eprintln!("Sending {} event to {}", status, url);
        }
    }
    let outcome = forwarder
        .send_event(status, &input.event, &input.response)
        .await;

    match opts.format {
        OutputFormat::Text => {
            println!("{}", renderer::render_outcome(&outcome, opts.use_color));
            if outcome == DeliveryOutcome::Disabled {
                eprintln!(
                    "Set {} or run `ufwd config init` to configure an endpoint.",
                    URL_ENV
                );
            }
        }
        OutputFormat::Json => println!("{}", to_json(&outcome, opts)?),
    }

    if !outcome.is_delivered() && outcome != DeliveryOutcome::Disabled {
        std::process::exit(1);
    }
    Ok(())
}
