//! TOML Configuration File Support
//!
//! Configuration for the studio lives in a TOML file at
//! `~/.config/handwriting-studio/config.toml`.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. TOML configuration file
//! 3. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [api]
//! base_url = "https://handwrittenletter.onrender.com"
//! timeout_ms = 10000
//! non_json_success = "accept_as_empty"
//!
//! [canvas]
//! width = 200
//! height = 300
//!
//! [session]
//! symbols = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::NonJsonSuccessPolicy;
use crate::symbols::SymbolSequence;

/// Hosted handwriting service
pub const DEFAULT_BASE_URL: &str = "https://handwrittenletter.onrender.com";

/// Client-side timeout applied to every request
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where the configuration came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// At least one value from a command-line argument
    Cli,
    /// Loaded from the TOML configuration file
    File,
    /// Defaults only
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// API section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiToml {
    /// Base URL of the handwriting service
    pub base_url: Option<String>,

    /// Request timeout in milliseconds
    pub timeout_ms: Option<u64>,

    /// Handling of non-JSON success responses
    pub non_json_success: Option<NonJsonSuccessPolicy>,
}

/// Canvas section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasToml {
    /// Stroke buffer width in pixels
    pub width: Option<u32>,

    /// Stroke buffer height in pixels
    pub height: Option<u32>,
}

/// Session section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionToml {
    /// Symbols to capture, in order
    pub symbols: Option<String>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioToml {
    /// API configuration section
    pub api: ApiToml,

    /// Canvas configuration section
    pub canvas: CanvasToml,

    /// Session configuration section
    pub session: SessionToml,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Configuration handed to the API client at construction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL; endpoint paths are appended
    pub base_url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// Handling of non-JSON success responses
    pub non_json_success: NonJsonSuccessPolicy,
}

impl ApiConfig {
    /// Configuration for `base_url` with default timeout and policy
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the timeout
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// The timeout as a [`Duration`]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            non_json_success: NonJsonSuccessPolicy::default(),
        }
    }
}

/// Stroke buffer dimensions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasConfig {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 300,
        }
    }
}

/// Values given on the command line
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Base URL of the service
    pub base_url: Option<String>,
    /// Request timeout in milliseconds
    pub timeout_ms: Option<u64>,
    /// Symbols to capture
    pub symbols: Option<String>,
}

impl ConfigOverrides {
    fn is_empty(&self) -> bool {
        self.base_url.is_none() && self.timeout_ms.is_none() && self.symbols.is_none()
    }
}

/// Centralized configuration for the studio
#[derive(Clone, Debug)]
pub struct StudioConfig {
    /// API client configuration
    pub api: ApiConfig,

    /// Stroke buffer configuration
    pub canvas: CanvasConfig,

    /// Symbols to capture
    pub symbols: SymbolSequence,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            canvas: CanvasConfig::default(),
            symbols: SymbolSequence::default(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl StudioConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Apply command-line overrides on top of file and defaults
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if an override is invalid.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> Result<(), ConfigError> {
        if overrides.is_empty() {
            return Ok(());
        }

        if let Some(ref base_url) = overrides.base_url {
            self.api.base_url.clone_from(base_url);
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.api.timeout_ms = timeout_ms;
        }
        if let Some(ref symbols) = overrides.symbols {
            self.symbols = parse_symbols(symbols)?;
        }
        self.source = ConfigSource::Cli;

        self.validate()
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first
    /// invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api.base_url must not be empty".to_string(),
            ));
        }
        if self.api.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "api.timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ConfigError::ValidationError(format!(
                "canvas must have a non-zero size, got {}x{}",
                self.canvas.width, self.canvas.height
            )));
        }
        Ok(())
    }
}

fn parse_symbols(symbols: &str) -> Result<SymbolSequence, ConfigError> {
    SymbolSequence::parse(symbols)
        .map_err(|e| ConfigError::ValidationError(format!("session.symbols: {e}")))
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/handwriting-studio/config.toml` or the platform
/// equivalent.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("handwriting-studio").join("config.toml"))
}

/// Load configuration from the default path
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<StudioConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Arguments
///
/// * `path` - Optional path to the configuration file. If `None`, only
///   defaults are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read, parsed or
/// validated.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<StudioConfig, ConfigError> {
    let mut config = StudioConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: StudioToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    config.validate()?;
    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut StudioConfig, toml: &StudioToml) -> Result<(), ConfigError> {
    if let Some(ref base_url) = toml.api.base_url {
        config.api.base_url.clone_from(base_url);
    }
    if let Some(timeout_ms) = toml.api.timeout_ms {
        config.api.timeout_ms = timeout_ms;
    }
    if let Some(policy) = toml.api.non_json_success {
        config.api.non_json_success = policy;
    }

    if let Some(width) = toml.canvas.width {
        config.canvas.width = width;
    }
    if let Some(height) = toml.canvas.height {
        config.canvas.height = height;
    }

    if let Some(ref symbols) = toml.session.symbols {
        config.symbols = parse_symbols(symbols)?;
    }

    Ok(())
}
