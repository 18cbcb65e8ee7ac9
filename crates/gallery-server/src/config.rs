//! Configuration loading and environment overrides

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Environment variable holding the catalog project URL
pub const ENV_CATALOG_URL: &str = "SUPABASE_URL";
/// Environment variable holding the catalog anonymous key
pub const ENV_CATALOG_KEY: &str = "SUPABASE_ANON_KEY";
/// Names used by existing frontend `.env.local` files, read when the
/// short names are unset
pub const ENV_PUBLIC_CATALOG_URL: &str = "NEXT_PUBLIC_SUPABASE_URL";
pub const ENV_PUBLIC_CATALOG_KEY: &str = "NEXT_PUBLIC_SUPABASE_ANON_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for web server
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Directory holding the built frontend
    #[serde(default = "default_web_dir")]
    pub web_dir: String,
    /// TLS configuration (optional - enables HTTPS when present)
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            web_dir: default_web_dir(),
            tls: None,
        }
    }
}

/// TLS/HTTPS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM format)
    pub cert: String,
    /// Path to private key file (PEM format)
    pub key: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_web_dir() -> String {
    "web".to_string()
}

/// Hosted catalog connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Project URL, e.g. https://abc.supabase.co
    #[serde(default)]
    pub url: String,
    /// Anonymous (public) API key
    #[serde(default)]
    pub anon_key: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

impl CatalogConfig {
    /// Whether both URL and key look like real values.
    ///
    /// Empty strings and the template values shipped in sample env files
    /// ("your-project-url", "placeholder-key", ...) leave the server in
    /// no-data mode.
    pub fn is_configured(&self) -> bool {
        !is_placeholder(&self.url) && !is_placeholder(&self.anon_key)
    }
}

fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.starts_with("your-") || value.contains("placeholder")
}

impl Config {
    /// Apply environment overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(ENV_CATALOG_URL).or_else(|| lookup(ENV_PUBLIC_CATALOG_URL));
        if let Some(url) = url {
            self.catalog.url = url.trim().trim_end_matches('/').to_string();
        }
        let key = lookup(ENV_CATALOG_KEY).or_else(|| lookup(ENV_PUBLIC_CATALOG_KEY));
        if let Some(key) = key {
            self.catalog.anon_key = key.trim().to_string();
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}
