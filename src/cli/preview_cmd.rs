use anyhow::Result;
use std::path::PathBuf;

use usage_forwarder::core::models::usage::EventStatus;
use usage_forwarder::core::payload::build_payload;

use crate::cli::input;
use crate::cli::output::{to_json, OutputFormat, OutputOptions};
use crate::cli::renderer;

/// Print the payload an event would produce, without sending it.
pub fn run(
    status: EventStatus,
    event_path: Option<&PathBuf>,
    response_path: Option<&PathBuf>,
    opts: &OutputOptions,
) -> Result<()> {
    let input = input::load(event_path, response_path)?;

    let record = match build_payload(status, &input.event, &input.response) {
        Ok(record) => record,
        Err(e) => {
            eprintln!("Event would be dropped: {}", e);
            std::process::exit(1);
        }
    };

    match opts.format {
        OutputFormat::Text => println!("{}", renderer::render_record(&record, opts.use_color)),
        OutputFormat::Json => println!("{}", to_json(&record, opts)?),
    }
    Ok(())
}
