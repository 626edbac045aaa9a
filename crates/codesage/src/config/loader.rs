//! Configuration file loading for CodeSage
//!
//! Handles loading and parsing configuration files using the config crate.

use std::path::Path;

use config::{Config as ConfigBuilder, File, FileFormat};

use crate::config::{Config, ConfigError};

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = ConfigBuilder::builder()
            .add_source(File::from(path))
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config = ConfigBuilder::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        if self.execution.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "execution.timeout_secs must be at least 1".to_owned(),
            ));
        }
        if self.execution.max_concurrent == 0 {
            return Err(ConfigError::Invalid(
                "execution.max_concurrent must be at least 1".to_owned(),
            ));
        }
        if self.generator.endpoint.is_empty() {
            return Err(ConfigError::Invalid(
                "generator.endpoint must not be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
[server]
port = 9000
"#;

        let config = Config::parse_toml(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        // Unspecified sections fall back to defaults
        assert_eq!(config.execution.timeout_secs, 5);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080

[execution]
timeout_secs = 10
max_concurrent = 4

[generator]
model = "gemini-2.0-flash"
endpoint = "https://example.invalid/models"
api_key_env = "MY_KEY"
timeout_secs = 30
"#;

        let config = Config::parse_toml(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.execution.timeout_secs, 10);
        assert_eq!(config.execution.max_concurrent, 4);
        assert_eq!(config.generator.model, "gemini-2.0-flash");
        assert_eq!(config.generator.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_zero_timeout() {
        let toml = r#"
[execution]
timeout_secs = 0
"#;

        let result = Config::parse_toml(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_zero_concurrency() {
        let toml = r#"
[execution]
max_concurrent = 0
"#;

        let result = Config::parse_toml(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.generator.api_key_env, "GEMINI_API_KEY");
    }
}
