//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `ROOMFIX_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{DEFAULT_DUPLICATE_THRESHOLD, DEFAULT_MAX_RESULTS};
use crate::providers::ProviderEndpoint;
use crate::providers::embedding::{DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL_PREFIX};
use crate::providers::vision::DEFAULT_VISION_MODEL;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `ROOMFIX_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Root for profile vectors, the report log, and uploaded images. Default: `./.data`.
    pub storage_path: PathBuf,

    /// Base URL of the embedding API. Default: [`DEFAULT_EMBEDDING_URL`].
    pub embedding_url: String,

    /// Text model family; `-passage` / `-query` is appended per call.
    pub embedding_model_prefix: String,

    /// Image embedding model.
    pub image_model: String,

    /// Base URL of the vision (chat completions) API. Default: [`DEFAULT_VISION_URL`].
    pub vision_url: String,

    /// Vision model used for repair analysis.
    pub vision_model: String,

    /// Bearer token sent to both APIs. Required unless `mock_provider` is set.
    pub api_key: Option<String>,

    /// Similarity at or above which a report is a duplicate. Default: `0.80`.
    pub duplicate_threshold: f32,

    /// Cap on ranked results. Default: `20`.
    pub max_results: usize,

    /// Use offline, deterministic providers instead of the HTTP APIs.
    pub mock_provider: bool,

    /// Per-request timeout for provider calls, in seconds. Default: `30`.
    pub request_timeout_secs: u64,
}

/// Default embedding API used when `ROOMFIX_EMBEDDING_URL` is not set.
pub const DEFAULT_EMBEDDING_URL: &str = "https://api.upstage.ai/v1/solar";

/// Default vision API used when `ROOMFIX_VISION_URL` is not set.
pub const DEFAULT_VISION_URL: &str = "https://api.openai.com/v1";

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            storage_path: PathBuf::from("./.data"),
            embedding_url: DEFAULT_EMBEDDING_URL.to_string(),
            embedding_model_prefix: DEFAULT_TEXT_MODEL_PREFIX.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            vision_url: DEFAULT_VISION_URL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            api_key: None,
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            max_results: DEFAULT_MAX_RESULTS,
            mock_provider: false,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    pub const ENV_PORT: &'static str = "ROOMFIX_PORT";
    pub const ENV_BIND_ADDR: &'static str = "ROOMFIX_BIND_ADDR";
    pub const ENV_STORAGE_PATH: &'static str = "ROOMFIX_STORAGE_PATH";
    pub const ENV_EMBEDDING_URL: &'static str = "ROOMFIX_EMBEDDING_URL";
    pub const ENV_EMBEDDING_MODEL_PREFIX: &'static str = "ROOMFIX_EMBEDDING_MODEL_PREFIX";
    pub const ENV_IMAGE_MODEL: &'static str = "ROOMFIX_IMAGE_MODEL";
    pub const ENV_VISION_URL: &'static str = "ROOMFIX_VISION_URL";
    pub const ENV_VISION_MODEL: &'static str = "ROOMFIX_VISION_MODEL";
    pub const ENV_API_KEY: &'static str = "ROOMFIX_API_KEY";
    pub const ENV_DUPLICATE_THRESHOLD: &'static str = "ROOMFIX_DUPLICATE_THRESHOLD";
    pub const ENV_MAX_RESULTS: &'static str = "ROOMFIX_MAX_RESULTS";
    pub const ENV_MOCK_PROVIDER: &'static str = "ROOMFIX_MOCK_PROVIDER";
    pub const ENV_REQUEST_TIMEOUT_SECS: &'static str = "ROOMFIX_REQUEST_TIMEOUT_SECS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let storage_path = Self::parse_path_from_env(Self::ENV_STORAGE_PATH, defaults.storage_path);
        let embedding_url =
            Self::parse_string_from_env(Self::ENV_EMBEDDING_URL, defaults.embedding_url);
        let embedding_model_prefix = Self::parse_string_from_env(
            Self::ENV_EMBEDDING_MODEL_PREFIX,
            defaults.embedding_model_prefix,
        );
        let image_model = Self::parse_string_from_env(Self::ENV_IMAGE_MODEL, defaults.image_model);
        let vision_url = Self::parse_string_from_env(Self::ENV_VISION_URL, defaults.vision_url);
        let vision_model =
            Self::parse_string_from_env(Self::ENV_VISION_MODEL, defaults.vision_model);
        let api_key = Self::parse_optional_string_from_env(Self::ENV_API_KEY);
        let duplicate_threshold = Self::parse_threshold_from_env(defaults.duplicate_threshold)?;
        let max_results = Self::parse_usize_from_env(Self::ENV_MAX_RESULTS, defaults.max_results);
        let mock_provider = Self::parse_bool_from_env(Self::ENV_MOCK_PROVIDER, defaults.mock_provider);
        let request_timeout_secs = Self::parse_u64_from_env(
            Self::ENV_REQUEST_TIMEOUT_SECS,
            defaults.request_timeout_secs,
        );

        Ok(Self {
            port,
            bind_addr,
            storage_path,
            embedding_url,
            embedding_model_prefix,
            image_model,
            vision_url,
            vision_model,
            api_key,
            duplicate_threshold,
            max_results,
            mock_provider,
            request_timeout_secs,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_path.exists() && !self.storage_path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.storage_path.clone(),
            });
        }

        if !(0.0..=1.0).contains(&self.duplicate_threshold) {
            return Err(ConfigError::InvalidThreshold {
                value: self.duplicate_threshold,
            });
        }

        if self.max_results == 0 {
            return Err(ConfigError::InvalidMaxResults);
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        if !self.mock_provider && self.api_key.is_none() {
            return Err(ConfigError::MissingEnvVar {
                name: Self::ENV_API_KEY,
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Endpoint for the embedding API, with the shared key and timeout.
    pub fn embedding_endpoint(&self) -> ProviderEndpoint {
        ProviderEndpoint::new(self.embedding_url.clone(), self.api_key.clone())
            .with_timeout(self.request_timeout())
    }

    /// Endpoint for the vision API, with the shared key and timeout.
    pub fn vision_endpoint(&self) -> ProviderEndpoint {
        ProviderEndpoint::new(self.vision_url.clone(), self.api_key.clone())
            .with_timeout(self.request_timeout())
    }

    pub fn vectors_dir(&self) -> PathBuf {
        self.storage_path.join("vectors")
    }

    pub fn reports_log(&self) -> PathBuf {
        self.storage_path.join("reports.jsonl")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.storage_path.join("images")
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_threshold_from_env(default: f32) -> Result<f32, ConfigError> {
        match env::var(Self::ENV_DUPLICATE_THRESHOLD) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::ThresholdParseError { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn parse_usize_from_env(var_name: &str, default: usize) -> usize {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn parse_bool_from_env(var_name: &str, default: bool) -> bool {
        match env::var(var_name) {
            Ok(value) => matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            ),
            Err(_) => default,
        }
    }
}
