//! Configuration management
//!
//! Values come from the process environment, optionally seeded from a
//! `.env.local` file. Platform credentials are required; department numbers
//! are not (a missing number only disables that menu option).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::domain::directory::{standard_entries, DepartmentDirectory, DepartmentEntry};
use crate::domain::shared::error::CallError;

/// File read before the environment, if present
pub const ENV_FILE: &str = ".env.local";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(String),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}

impl From<ConfigError> for CallError {
    fn from(err: ConfigError) -> Self {
        CallError::Configuration(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub livekit: LiveKitConfig,
    pub model: ModelConfig,
    pub assistant: AssistantConfig,
    /// Destination numbers keyed by their environment variable name
    pub department_numbers: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LiveKitConfig {
    pub url: String,
    pub api_key: String,
    pub api_secret: String,
    pub request_timeout: Duration,
}

impl fmt::Debug for LiveKitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveKitConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub api_key: String,
    pub voice: String,
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &"<redacted>")
            .field("voice", &self.voice)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    pub company_name: String,
    pub join_timeout: Duration,
    /// Pause between the spoken confirmation and the REFER
    pub transfer_delay: Duration,
    pub reprompt_unknown_digit: bool,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            company_name: "Vandelay Industries".to_string(),
            join_timeout: Duration::from_secs(30),
            transfer_delay: Duration::from_secs(6),
            reprompt_unknown_digit: true,
        }
    }
}

impl Config {
    /// Load `.env.local` (if any) and read the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load_env_file(Path::new(ENV_FILE));

        let source = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        Self::from_source(&source)
    }

    /// Seed the environment from a dotenv file without overriding real variables
    pub fn load_env_file(path: &Path) {
        match dotenvy::from_path(path) {
            Ok(()) => debug!("Loaded environment from {}", path.display()),
            Err(e) => debug!("No environment file at {}: {}", path.display(), e),
        }
    }

    /// Build from an already assembled source. Keys are lower-case variable names.
    pub fn from_source(source: &config::Config) -> Result<Self, ConfigError> {
        let defaults = AssistantConfig::default();

        let server = ServerConfig {
            host: optional_string(source, "SERVER_HOST")?.unwrap_or_else(|| "0.0.0.0".to_string()),
            port: optional_parsed(source, "SERVER_PORT")?.unwrap_or(8080),
        };

        let livekit = LiveKitConfig {
            url: required_string(source, "LIVEKIT_URL")?,
            api_key: required_string(source, "LIVEKIT_API_KEY")?,
            api_secret: required_string(source, "LIVEKIT_API_SECRET")?,
            request_timeout: Duration::from_secs(
                optional_parsed(source, "LIVEKIT_REQUEST_TIMEOUT_SECS")?.unwrap_or(10),
            ),
        };

        let model = ModelConfig {
            api_key: required_string(source, "OPENAI_API_KEY")?,
            voice: optional_string(source, "ASSISTANT_VOICE")?.unwrap_or_else(|| "sage".to_string()),
        };

        let assistant = AssistantConfig {
            company_name: optional_string(source, "COMPANY_NAME")?.unwrap_or(defaults.company_name),
            join_timeout: optional_parsed(source, "JOIN_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.join_timeout),
            transfer_delay: optional_parsed(source, "TRANSFER_DELAY_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.transfer_delay),
            reprompt_unknown_digit: optional_parsed(source, "REPROMPT_UNKNOWN_DIGIT")?
                .unwrap_or(defaults.reprompt_unknown_digit),
        };

        let mut department_numbers = HashMap::new();
        for entry in standard_entries() {
            if let Some(number) = optional_string(source, &entry.config_key)? {
                department_numbers.insert(entry.config_key, number);
            }
        }

        Ok(Self {
            server,
            livekit,
            model,
            assistant,
            department_numbers,
        })
    }

    /// Build the department directory for `entries` from the configured numbers
    pub fn directory(&self, entries: Vec<DepartmentEntry>) -> Result<DepartmentDirectory, ConfigError> {
        DepartmentDirectory::from_source(entries, &self.department_numbers).map_err(|e| {
            ConfigError::Invalid {
                key: "departments".to_string(),
                message: e.to_string(),
            }
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn optional_string(source: &config::Config, key: &str) -> Result<Option<String>, ConfigError> {
    match source.get_string(&key.to_lowercase()) {
        Ok(value) => Ok(Some(value)),
        Err(config::ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(ConfigError::Invalid {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}

fn required_string(source: &config::Config, key: &str) -> Result<String, ConfigError> {
    match optional_string(source, key)? {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::Missing(key.to_string())),
    }
}

fn optional_parsed<T>(source: &config::Config, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match optional_string(source, key)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|e: T::Err| ConfigError::Invalid {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::directory::Resolution;
    use crate::domain::dtmf::DtmfDigit;

    fn source(pairs: &[(&str, &str)]) -> config::Config {
        let mut builder = config::Config::builder();
        for (key, value) in pairs {
            builder = builder.set_override(key.to_lowercase(), *value).unwrap();
        }
        builder.build().unwrap()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("LIVEKIT_URL", "wss://example.livekit.cloud"),
            ("LIVEKIT_API_KEY", "APIkey"),
            ("LIVEKIT_API_SECRET", "secret"),
            ("OPENAI_API_KEY", "sk-test"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_source(&source(&required())).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.model.voice, "sage");
        assert_eq!(config.assistant.company_name, "Vandelay Industries");
        assert_eq!(config.assistant.transfer_delay, Duration::from_secs(6));
        assert!(config.assistant.reprompt_unknown_digit);
        assert!(config.department_numbers.is_empty());
    }

    #[test]
    fn test_missing_required_key_is_fatal() {
        let mut pairs = required();
        pairs.retain(|(k, _)| *k != "LIVEKIT_API_SECRET");

        let err = Config::from_source(&source(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(key) if key == "LIVEKIT_API_SECRET"));
    }

    #[test]
    fn test_blank_required_key_is_fatal() {
        let mut pairs = required();
        pairs.retain(|(k, _)| *k != "OPENAI_API_KEY");
        pairs.push(("OPENAI_API_KEY", "  "));

        let err = Config::from_source(&source(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(key) if key == "OPENAI_API_KEY"));
    }

    #[test]
    fn test_invalid_number() {
        let mut pairs = required();
        pairs.push(("JOIN_TIMEOUT_SECS", "soon"));

        let err = Config::from_source(&source(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key, .. } if key == "JOIN_TIMEOUT_SECS"));
    }

    #[test]
    fn test_directory_from_department_numbers() {
        let mut pairs = required();
        pairs.push(("TECH_SUPPORT_PHONE_NUMBER", "+15550001111"));
        pairs.push(("BILLING_PHONE_NUMBER", ""));

        let config = Config::from_source(&source(&pairs)).unwrap();
        let directory = config.directory(standard_entries()).unwrap();

        assert!(matches!(
            directory.resolve(DtmfDigit::Two),
            Resolution::Destination(_, number) if number.as_str() == "+15550001111"
        ));
        assert!(matches!(directory.resolve(DtmfDigit::One), Resolution::Misconfigured(_)));
        assert!(matches!(directory.resolve(DtmfDigit::Three), Resolution::Misconfigured(_)));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::from_source(&source(&required())).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-test"));
        assert!(!rendered.contains("\"secret\""));
        assert!(rendered.contains("<redacted>"));
    }
}
