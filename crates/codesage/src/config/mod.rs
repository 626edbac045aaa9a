use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

mod loader;

/// Example configuration embedded at compile time.
///
/// Library users can access this to generate a starter config file.
pub const EXAMPLE_CONFIG: &str = include_str!("../../codesage.example.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Config for CodeSage
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server bind settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Sandbox execution settings
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// External feedback-generator settings
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl Config {
    /// Create a config with the embedded defaults
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::parse_toml(EXAMPLE_CONFIG).expect("embedded default config should be valid")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the server to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionConfig {
    /// Wall-clock deadline for each compile or run step, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of concurrently running candidate processes
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// Model identifier for the feedback API
    #[serde(default = "default_model")]
    pub model: String,

    /// Base endpoint of the generateContent REST API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Caller-side deadline on generator calls, in seconds.
    /// Expiry is recovered via the per-call-site fallback.
    #[serde(default = "default_generator_timeout_secs")]
    pub timeout_secs: u64,
}

impl GeneratorConfig {
    /// Read the API key from the configured environment variable.
    ///
    /// Returns `None` when the variable is unset or empty, which puts every
    /// call site on its fallback path.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_generator_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

fn default_port() -> u16 {
    8000
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_max_concurrent() -> usize {
    8
}

fn default_model() -> String {
    "gemini-2.5-pro".to_owned()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_owned()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_owned()
}

fn default_generator_timeout_secs() -> u64 {
    20
}
