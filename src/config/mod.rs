use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{FoxtrapError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Browser under test
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Window-automation tool
    #[serde(default)]
    pub automation: AutomationConfig,

    /// Add-on under test
    #[serde(default)]
    pub extension: ExtensionConfig,

    /// Proxy the disposable profile points at (must be unreachable)
    #[serde(default)]
    pub proxy: ProxyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Browser executable name or path
    #[serde(default = "default_browser")]
    pub executable: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            executable: default_browser(),
        }
    }
}

fn default_browser() -> String {
    "firefox".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationConfig {
    /// Automation tool executable name or path
    #[serde(default = "default_automation")]
    pub executable: String,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            executable: default_automation(),
        }
    }
}

fn default_automation() -> String {
    "xdotool".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtensionConfig {
    /// Path to the add-on's install.rdf (tilde-expanded)
    pub manifest: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Proxy host written into the disposable profile
    #[serde(default = "default_proxy_host")]
    pub host: String,

    /// Proxy port; any port works as long as nothing listens there
    #[serde(default = "default_proxy_port")]
    pub port: u16,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: default_proxy_host(),
            port: default_proxy_port(),
        }
    }
}

fn default_proxy_host() -> String {
    "127.0.0.1".to_string()
}

fn default_proxy_port() -> u16 {
    // The discard port: reserved, conventionally nothing listening.
    9
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            automation: AutomationConfig::default(),
            extension: ExtensionConfig::default(),
            proxy: ProxyConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from all sources (file, env, defaults)
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let config: Config = Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Config::default()))
            // Merge config file if exists
            .merge(Toml::file(&config_path))
            // Merge environment variables (FOXTRAP_*). The bare BROWSER and
            // AUTOMATION names belong to the CLI flags, not the config tree.
            .merge(
                Env::prefixed("FOXTRAP_")
                    .ignore(&["browser", "automation"])
                    .split("_"),
            )
            .extract()
            .map_err(|e| FoxtrapError::ConfigError(e.to_string()))?;

        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("foxtrap")
            .join("config.toml")
    }

    /// Resolve the add-on manifest path, expanding a leading tilde.
    ///
    /// An explicit `override_path` wins over the configured one.
    pub fn manifest_path(&self, override_path: Option<&str>) -> Result<PathBuf> {
        let raw = override_path
            .or(self.extension.manifest.as_deref())
            .ok_or_else(|| {
                FoxtrapError::ConfigError(
                    "no extension manifest configured; set extension.manifest or pass --manifest"
                        .to_string(),
                )
            })?;
        Ok(PathBuf::from(shellexpand::tilde(raw).to_string()))
    }
}
