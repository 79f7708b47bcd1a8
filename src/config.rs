// Configuration module for vio-client
// Handles the XDG-compliant config directory and TOML configuration file

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "vio-client";
const CONFIG_FILENAME: &str = "config.toml";

/// TOML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Catalog service location
    pub server: ServerConfig,

    /// Request and load deadlines
    pub client: ClientConfig,

    /// Toolbar scan behaviour
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Service base URL, without the `/api` suffix (default: http://localhost:8080)
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Per-request timeout in seconds (default: 30, 0 to disable)
    pub request_timeout_secs: u64,

    /// Deadline for a whole series tree load in seconds (default: 60, 0 to disable)
    pub load_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            load_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Wait for scan jobs to finish before notifying views (default: false)
    /// When disabled, views reload as soon as every scan was accepted
    pub wait_for_jobs: bool,

    /// Scan job poll interval in milliseconds (default: 1000)
    pub poll_interval_ms: u64,

    /// Give up waiting on a scan job after this many seconds (default: 600)
    pub job_timeout_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            wait_for_jobs: false,
            poll_interval_ms: 1000,
            job_timeout_secs: 600,
        }
    }
}

/// Application configuration - combines TOML file with environment overrides
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory config.toml was looked up in
    pub config_dir: PathBuf,

    /// Catalog service base URL
    pub base_url: String,

    /// Per-request timeout, `None` when disabled
    pub request_timeout: Option<Duration>,

    /// Series tree load deadline, `None` when disabled
    pub load_timeout: Option<Duration>,

    /// Scan action configuration
    pub scan: ScanConfig,
}

impl AppConfig {
    /// Load configuration from TOML file and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. TOML config file
    /// 3. Default values
    pub fn load() -> Self {
        let config_dir = Self::find_config_dir();
        let config_file = Self::load_config_file(&config_dir);
        Self::build(config_file, config_dir, |key| std::env::var(key).ok())
    }

    /// Find the config directory (for locating config.toml)
    fn find_config_dir() -> PathBuf {
        // Environment variable takes priority
        if let Ok(path) = std::env::var("VIO_CLIENT_CONFIG_DIR") {
            return PathBuf::from(path);
        }

        // Then XDG config dir
        if let Some(dir) = dirs::config_dir() {
            return dir.join(APP_NAME);
        }

        // Fallback to current directory
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }

    /// Load and parse the TOML config file
    fn load_config_file(config_dir: &Path) -> ConfigFile {
        let config_path = config_dir.join(CONFIG_FILENAME);

        if !config_path.exists() {
            tracing::debug!(
                "No config file found at {}, using defaults",
                config_path.display()
            );
            return ConfigFile::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => Self::parse_config(&contents, &config_path),
            Err(e) => {
                tracing::warn!(
                    "Failed to read config file {}: {}. Using defaults.",
                    config_path.display(),
                    e
                );
                ConfigFile::default()
            }
        }
    }

    fn parse_config(contents: &str, config_path: &Path) -> ConfigFile {
        match toml::from_str(contents) {
            Ok(config) => {
                tracing::info!("Loaded configuration from {}", config_path.display());
                config
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse config file {}: {}. Using defaults.",
                    config_path.display(),
                    e
                );
                ConfigFile::default()
            }
        }
    }

    /// Build configuration from config file with overrides from `env`
    fn build<F>(config_file: ConfigFile, config_dir: PathBuf, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Base URL: env > config > default
        let base_url = env("VIO_SERVER_URL")
            .unwrap_or(config_file.server.base_url)
            .trim_end_matches('/')
            .to_string();

        // Timeouts: env > config > default
        let request_timeout_secs = env("VIO_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(config_file.client.request_timeout_secs);
        let load_timeout_secs = env("VIO_LOAD_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(config_file.client.load_timeout_secs);

        Self {
            config_dir,
            base_url,
            request_timeout: seconds(request_timeout_secs),
            load_timeout: seconds(load_timeout_secs),
            scan: config_file.scan,
        }
    }

    /// Get the config file path
    pub fn config_file_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILENAME)
    }

    /// Log configuration status
    pub fn log_config(&self) {
        tracing::info!("Configuration directory: {}", self.config_dir.display());
        tracing::info!("Catalog service: {}", self.base_url);

        match self.request_timeout {
            Some(timeout) => tracing::debug!("Request timeout: {:?}", timeout),
            None => tracing::debug!("Request timeout: disabled"),
        }
        match self.load_timeout {
            Some(timeout) => tracing::debug!("Series load timeout: {:?}", timeout),
            None => tracing::debug!("Series load timeout: disabled"),
        }

        if self.scan.wait_for_jobs {
            tracing::info!(
                "Scan actions wait for jobs (poll every {}ms, give up after {}s)",
                self.scan.poll_interval_ms,
                self.scan.job_timeout_secs
            );
        } else {
            tracing::debug!("Scan actions notify views without waiting for jobs");
        }
    }
}

/// Zero disables the deadline
fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
