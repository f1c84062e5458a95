//! Configuration loading

use anyhow::{Context, Result};
use sensorgen_core::{GeneratorOptions, NetworkCredentials};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Credentials used when a request leaves a field empty
    #[serde(default)]
    pub credentials: NetworkCredentials,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP API
    #[serde(default = "default_bind")]
    pub bind: String,
    /// TLS configuration (optional - enables HTTPS when present)
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            tls: None,
        }
    }
}

/// PEM certificate and key served by the HTTPS listener
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    pub cert: String,
    pub key: String,
}

impl TlsConfig {
    /// Fails naming the first PEM file that does not exist
    pub fn check_files(&self) -> Result<()> {
        for (kind, path) in [("certificate", &self.cert), ("key", &self.key)] {
            if !Path::new(path).is_file() {
                anyhow::bail!("TLS {} file not found: {}", kind, path);
            }
        }
        Ok(())
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Extension catalog layered over the builtin sensors
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Rewrite legacy database calls in send fragments
    #[serde(default = "default_true")]
    pub upgrade_send_calls: bool,
    /// Mode used when a request leaves simulation unset
    #[serde(default)]
    pub simulation: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            upgrade_send_calls: true,
            simulation: false,
        }
    }
}

fn default_true() -> bool {
    true
}

impl GeneratorConfig {
    pub fn options(&self) -> GeneratorOptions {
        GeneratorOptions {
            upgrade_send_calls: self.upgrade_send_calls,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
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

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<()> {
    let config = Config {
        credentials: NetworkCredentials {
            wifi_ssid: Some("Workshop_WiFi".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };

    let content = toml::to_string_pretty(&config)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
