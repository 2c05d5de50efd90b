use anyhow::Result;
use serde::Serialize;

use usage_forwarder::core::config::{EndpointConfig, FileConfig};

use crate::cli::output::{to_json, OutputFormat, OutputOptions};

pub fn init(_opts: &OutputOptions) -> Result<()> {
    let path = EndpointConfig::config_path();
    if path.exists() {
        eprintln!("Config file already exists at {}", path.display());
        eprintln!("Remove it first if you want to regenerate.");
        return Ok(());
    }

    match FileConfig::template().save() {
        Ok(path) => {
            println!("Generated config at {}", path.display());
            println!("  Set endpoint.url to your ingestion function before sending events.");
        }
        Err(e) => {
            eprintln!("Failed to generate config: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}

pub fn check(_opts: &OutputOptions) -> Result<()> {
    let path = EndpointConfig::config_path();
    if !path.exists() {
        eprintln!("No config file found at {}", path.display());
        eprintln!("Run `ufwd config init` to create one.");
    }

    let config = match EndpointConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let issues = config.validate();
    if issues.is_empty() {
        println!("Config is valid: {}", path.display());
        match config.url() {
            Some(url) => println!("  Forwarding to {}", url),
            None => println!("  No endpoint url configured, forwarding is disabled."),
        }
    } else {
        eprintln!("Config issues found in {}:", path.display());
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
        std::process::exit(1);
    }
    Ok(())
}

#[derive(Serialize)]
struct EffectiveConfig<'a> {
    path: String,
    url: Option<&'a str>,
    credential: Option<&'static str>,
}

impl<'a> EffectiveConfig<'a> {
    fn from_config(config: &'a EndpointConfig) -> Self {
        Self {
            path: EndpointConfig::config_path().display().to_string(),
            url: config.url(),
            credential: config.credential().map(|_| "<redacted>"),
        }
    }
}

/// Print the merged file + environment config with the credential hidden.
pub fn show(opts: &OutputOptions) -> Result<()> {
    let config = EndpointConfig::load()?;
    let effective = EffectiveConfig::from_config(&config);

    match opts.format {
        OutputFormat::Text => {
            println!("Config file  {}", effective.path);
            println!("Endpoint     {}", effective.url.unwrap_or("(disabled)"));
            println!("Credential   {}", effective.credential.unwrap_or("(none)"));
        }
        OutputFormat::Json => println!("{}", to_json(&effective, opts)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_config_hides_credential() {
        let config =
            EndpointConfig::new(Some("https://e.example/usage".into()), Some("s3cret".into()));
        let json = serde_json::to_string(&EffectiveConfig::from_config(&config)).unwrap();
        assert!(!json.contains("s3cret"));
        assert!(json.contains("<redacted>"));
        assert!(json.contains("https://e.example/usage"));
    }
}
