use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::storage::StorageConfig;

/// Environment variables with this prefix override values from `config.yaml`,
/// nested keys separated by `__` (e.g. `SESSIONTRON_BACKEND__URL`).
pub const ENV_PREFIX: &str = "SESSIONTRON_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    pub bind_address: String,
    #[serde(default)]
    pub backend: BackendConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Load config from "config.yaml" in the current directory, with environment overrides.
/// Exits the process when the configuration cannot be parsed.
pub fn load_config() -> ConfigV1 {
    let figment = Figment::new()
        .merge(Yaml::file("./config.yaml"))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));
    match extract_config(figment) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    }
}

/// Extract a versioned configuration from any figment.
pub fn extract_config(figment: Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() -> Result<(), serde_json::Error> {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

/// The external credential backend issuing and refreshing access tokens.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct BackendConfig {
    /// Base URL of the backend; `/auth/login` and `/auth/refresh` are appended.
    pub url: Option<String>,
    /// Serve a built-in mock backend when no URL is configured.
    #[serde(default)]
    pub dev_mode: bool,
    #[serde(default = "default_backend_timeout")]
    pub timeout_in_ms: u64,
}

fn default_backend_timeout() -> u64 {
    10_000
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            dev_mode: false,
            timeout_in_ms: default_backend_timeout(),
        }
    }
}

/// Signing and lifetime settings for the session token handed to clients.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct SessionConfig {
    pub secret: String,
    /// Session lifetime in seconds, 30 days unless configured.
    #[serde(default = "default_max_age")]
    pub max_age: i64,
    /// Seconds before the access token's expiry at which it is already refreshed.
    #[serde(default = "default_safety_window")]
    pub safety_window_secs: i64,
}

fn default_max_age() -> i64 {
    30 * 24 * 60 * 60
}

fn default_safety_window() -> i64 {
    5
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct UiConfig {
    #[serde(default = "default_toast_duration")]
    pub toast_duration_ms: u64,
}

fn default_toast_duration() -> u64 {
    5000
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            toast_duration_ms: default_toast_duration(),
        }
    }
}

/// Public identity of the site, used for canonical URLs, social metadata and the sitemap.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct SiteConfig {
    /// Absolute base URL without a trailing slash.
    #[serde(default = "default_site_url")]
    pub url: String,
    #[serde(default = "default_site_name")]
    pub name: String,
    /// Twitter handle credited on cards, e.g. `@sessiontron`.
    #[serde(default)]
    pub twitter_creator: Option<String>,
}

fn default_site_url() -> String {
    "https://your-domain.com".to_string()
}

fn default_site_name() -> String {
    "sessiontron".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: default_site_url(),
            name: default_site_name(),
            twitter_creator: None,
        }
    }
}

impl SiteConfig {
    /// Join a site-relative path onto the base URL.
    pub fn absolute(&self, path: &str) -> String {
        format!("{}{}", self.url.trim_end_matches('/'), path)
    }
}
