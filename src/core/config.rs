use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub const URL_ENV: &str = "SUPABASE_LITELLM_USAGE_URL";
/// General-purpose key, preferred when both are set.
pub const ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";
pub const SERVICE_ROLE_KEY_ENV: &str = "SUPABASE_SERVICE_ROLE_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// `[endpoint]` table of the config file.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct EndpointSection {
    pub url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub endpoint: EndpointSection,
}

/// Where usage events go. Built once at startup and handed to the forwarder.
#[derive(Clone, Default, PartialEq)]
pub struct EndpointConfig {
    url: Option<String>,
    credential: Option<String>,
}

impl std::fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("url", &self.url)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Trimmed value, or `None` when nothing but whitespace is left.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl EndpointConfig {
    pub fn new(url: Option<String>, credential: Option<String>) -> Self {
        Self {
            url: non_empty(url),
            credential: non_empty(credential),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("usage-forwarder").join("config.toml")
    }

    /// Load the config file (if any) and overlay the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let file = FileConfig::load()?;
        Ok(Self::from_sources(&file, |name| std::env::var(name).ok()))
    }

    /// Environment only; for hosts that do not use a config file.
    pub fn from_env() -> Self {
        Self::from_sources(&FileConfig::default(), |name| std::env::var(name).ok())
    }

    /// Merge file values with an environment lookup. Environment wins, and
    /// the anon key is preferred over the service-role key.
    pub fn from_sources<F>(file: &FileConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |name: &str| non_empty(lookup(name));
        let url = env(URL_ENV).or_else(|| file.endpoint.url.clone());
        let credential = env(ANON_KEY_ENV)
            .or_else(|| env(SERVICE_ROLE_KEY_ENV))
            .or_else(|| file.endpoint.api_key.clone());
        Self::new(url, credential)
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        match &self.url {
            Some(url) if !(url.starts_with("https://") || url.starts_with("http://")) => {
                issues.push(format!(
                    "Invalid endpoint url: '{}' (must start with http:// or https://)",
                    url
                ));
            }
            None if self.credential.is_some() => {
                issues.push("api_key is set but no endpoint url is configured".to_string());
            }
            _ => {}
        }
        issues
    }
}

impl FileConfig {
    /// Load config from the default path, falling back to defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = EndpointConfig::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: FileConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Serialize and write this config to the config file path.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = EndpointConfig::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    pub fn template() -> Self {
        Self {
            endpoint: EndpointSection {
                url: Some("https://<project>.supabase.co/functions/v1/litellm-usage".to_string()),
                api_key: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn nothing_configured_is_disabled() {
        let config = EndpointConfig::from_sources(&FileConfig::default(), lookup(&[]));
        assert!(!config.is_enabled());
        assert!(config.credential().is_none());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn env_url_and_anon_key() {
        let config = EndpointConfig::from_sources(
            &FileConfig::default(),
            lookup(&[(URL_ENV, "https://x.supabase.co/functions/v1/usage"), (ANON_KEY_ENV, "anon")]),
        );
        assert_eq!(config.url(), Some("https://x.supabase.co/functions/v1/usage"));
        assert_eq!(config.credential(), Some("anon"));
    }

    #[test]
    fn anon_key_preferred_over_service_role() {
        let config = EndpointConfig::from_sources(
            &FileConfig::default(),
            lookup(&[(ANON_KEY_ENV, "anon"), (SERVICE_ROLE_KEY_ENV, "service")]),
        );
        assert_eq!(config.credential(), Some("anon"));
    }

    #[test]
    fn service_role_used_when_anon_empty() {
        let config = EndpointConfig::from_sources(
            &FileConfig::default(),
            lookup(&[(ANON_KEY_ENV, ""), (SERVICE_ROLE_KEY_ENV, "service")]),
        );
        assert_eq!(config.credential(), Some("service"));
    }

    #[test]
    fn empty_url_counts_as_absent() {
        let config =
            EndpointConfig::from_sources(&FileConfig::default(), lookup(&[(URL_ENV, "  ")]));
        assert!(!config.is_enabled());
    }

    #[test]
    fn env_overrides_file() {
        let file: FileConfig = toml::from_str(
            r#"
[endpoint]
url = "https://file.example.com/usage"
api_key = "file-key"
"#,
        )
        .unwrap();
        let config =
            EndpointConfig::from_sources(&file, lookup(&[(URL_ENV, "https://env.example.com")]));
        assert_eq!(config.url(), Some("https://env.example.com"));
        assert_eq!(config.credential(), Some("file-key"));
    }

    #[test]
    fn padded_values_are_trimmed() {
        let config = EndpointConfig::new(
            Some(" https://e.example/usage\n".into()),
            Some("anon-key\n".into()),
        );
        assert_eq!(config.url(), Some("https://e.example/usage"));
        assert_eq!(config.credential(), Some("anon-key"));

        let config = EndpointConfig::from_sources(
            &FileConfig::default(),
            lookup(&[(SERVICE_ROLE_KEY_ENV, "  service\r\n")]),
        );
        assert_eq!(config.credential(), Some("service"));
    }

    #[test]
    fn parse_empty_toml_gives_defaults() {
        let file: FileConfig = toml::from_str("").unwrap();
        assert!(file.endpoint.url.is_none());
        assert!(file.endpoint.api_key.is_none());
    }

    #[test]
    fn validate_catches_bad_scheme() {
        let config = EndpointConfig::new(Some("ftp://example.com".into()), None);
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("Invalid endpoint url")));
    }

    #[test]
    fn validate_catches_key_without_url() {
        let config = EndpointConfig::new(None, Some("key".into()));
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("api_key")));
    }

    #[test]
    fn debug_redacts_credential() {
        let config = EndpointConfig::new(Some("https://e.example".into()), Some("s3cret".into()));
        let text = format!("{:?}", config);
        assert!(!text.contains("s3cret"));
        assert!(text.contains("redacted"));
    }

    #[test]
    fn template_round_trips_through_toml() {
        let text = toml::to_string_pretty(&FileConfig::template()).unwrap();
        let parsed: FileConfig = toml::from_str(&text).unwrap();
        assert!(parsed.endpoint.url.unwrap().starts_with("https://"));
    }
}
