use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    #[serde(default)]
    pub allow_origins: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

fn default_cors_max_age() -> u64 {
    3600
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: Vec::new(),
            max_age: default_cors_max_age(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory uploaded files are written to and served from.
    pub upload_dir: PathBuf,
    /// Maximum accepted upload size in bytes. Default: 64 MB.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

fn default_max_upload_size() -> u64 {
    64 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            max_upload_size: default_max_upload_size(),
        }
    }
}

/// Which analysis implementation handles `/songs/{id}/analysis`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisBackend {
    /// Built-in file probe (size, content type, checksum).
    #[default]
    Probe,
    /// External program whose stdout is a JSON document.
    Command,
}

/// How a song's file reference is turned into a `file` row.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    /// Look the file up by primary key.
    #[default]
    Direct,
    /// Legacy double positional lookup over the ordered file list, kept for
    /// datasets written by the previous deployment.
    Positional,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub backend: AnalysisBackend,
    /// Program to run when `backend = "command"`.
    #[serde(default)]
    pub command: Option<String>,
    /// Arguments for `command`. `{path}` is replaced by the audio file path.
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_analysis_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub resolution: ResolutionMode,
}

fn default_analysis_timeout() -> u64 {
    120
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            backend: AnalysisBackend::default(),
            command: None,
            args: Vec::new(),
            timeout_secs: default_analysis_timeout(),
            resolution: ResolutionMode::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CHORDS_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite://chords.db?mode=rwc")?
            .set_default("storage.upload_dir", "uploads")?
            // Load from config/config.toml
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., CHORDS__DATABASE__URL)
            .add_source(Environment::with_prefix("CHORDS").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
