use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};

use usage_forwarder::core::event::{EventData, ResponseObject};

/// Event data and provider response read from JSON files.
pub struct EventInput {
    pub event: EventData,
    pub response: ResponseObject,
}

fn is_stdin(path: Option<&Path>) -> bool {
    path.map_or(true, |p| p == Path::new("-"))
}

fn read_json(path: Option<&Path>) -> Result<Value> {
    let content = match path {
        Some(path) if !is_stdin(Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read JSON from stdin")?;
            buf
        }
    };
    serde_json::from_str(&content).context("Failed to parse input as JSON")
}

/// Read the event (stdin when absent or `-`) and an optional response file.
pub fn load(event_path: Option<&PathBuf>, response_path: Option<&PathBuf>) -> Result<EventInput> {
    let event_path = event_path.map(PathBuf::as_path);
    let response_path = response_path.map(PathBuf::as_path);

    if response_path.is_some() && is_stdin(event_path) && is_stdin(response_path) {
        anyhow::bail!("Event and response cannot both be read from stdin");
    }

    let event = EventData::try_from(read_json(event_path)?)?;
    let response = match response_path {
        Some(path) => ResponseObject::from(read_json(Some(path))?),
        None => ResponseObject::None,
    };
    Ok(EventInput { event, response })
}
