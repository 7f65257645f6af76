//! Configuration management for the itinerary planner
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::PlannerError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Environment variable holding the Gemini API key
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Environment variable holding the Google Places API key
pub const PLACES_API_KEY_VAR: &str = "GOOGLE_PLACES_API_KEY";

/// Root configuration structure for the itinerary planner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// LLM API configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Places API configuration
    #[serde(default)]
    pub places: PlacesConfig,
    /// Web server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Prompt template configuration
    #[serde(default)]
    pub prompts: PromptsConfig,
    /// Default application settings
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Gemini API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Gemini API key, falls back to `GEMINI_API_KEY`
    pub api_key: Option<String>,
    /// Model identifier
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Base URL for the generative language API
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Sampling temperature
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate per answer
    #[serde(default = "default_llm_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Top-p sampling parameter
    #[serde(default = "default_llm_top_p")]
    pub top_p: f32,
    /// Top-k sampling parameter
    #[serde(default = "default_llm_top_k")]
    pub top_k: u32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Google Places API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    /// Whether suggestions are cross-referenced against the places API
    #[serde(default = "default_places_enabled")]
    pub enabled: bool,
    /// Places API key, falls back to `GOOGLE_PLACES_API_KEY`
    pub api_key: Option<String>,
    /// Geocoding endpoint
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,
    /// Nearby search endpoint
    #[serde(default = "default_nearby_url")]
    pub nearby_url: String,
    /// Search radius in meters around the destination
    #[serde(default = "default_radius_meters")]
    pub radius_meters: u32,
    /// Number of places passed on to the LLM
    #[serde(default = "default_max_places")]
    pub max_places: u32,
    /// Keyword used when the traveller gave no preferences
    #[serde(default = "default_query")]
    pub default_query: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Web server configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served under `/static`
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    /// Upper bound for a whole page request, upstream calls included
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
    /// PEM certificate, enables TLS together with `tls_key`
    pub tls_cert: Option<String>,
    /// PEM private key
    pub tls_key: Option<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Prompt template settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptsConfig {
    /// Directory whose `suggestions.hbs` / `itinerary.hbs` replace the built-in prompts
    pub dir: Option<String>,
}

/// Default application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Maximum number of suggestions kept from an LLM answer
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: u32,
}

// Default value functions
fn default_llm_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_llm_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_llm_temperature() -> f32 {
    0.2
}

fn default_llm_max_output_tokens() -> u32 {
    500
}

fn default_llm_top_p() -> f32 {
    0.95
}

fn default_llm_top_k() -> u32 {
    40
}

fn default_timeout() -> u32 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_places_enabled() -> bool {
    true
}

fn default_geocode_url() -> String {
    "https://maps.googleapis.com/maps/api/geocode/json".to_string()
}

fn default_nearby_url() -> String {
    "https://maps.googleapis.com/maps/api/place/nearbysearch/json".to_string()
}

fn default_radius_meters() -> u32 {
    10_000
}

fn default_max_places() -> u32 {
    5
}

fn default_query() -> String {
    "tourist attraction".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_request_timeout() -> u32 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_max_suggestions() -> u32 {
    10
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_llm_model(),
            base_url: default_llm_base_url(),
            temperature: default_llm_temperature(),
            max_output_tokens: default_llm_max_output_tokens(),
            top_p: default_llm_top_p(),
            top_k: default_llm_top_k(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            enabled: default_places_enabled(),
            api_key: None,
            geocode_url: default_geocode_url(),
            nearby_url: default_nearby_url(),
            radius_meters: default_radius_meters(),
            max_places: default_max_places(),
            default_query: default_query(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            request_timeout_seconds: default_request_timeout(),
            tls_cert: None,
            tls_key: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            max_suggestions: default_max_suggestions(),
        }
    }
}

impl PlannerConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // PLANNER_LLM__MODEL=... overrides llm.model
        builder = builder.add_source(
            Environment::with_prefix("PLANNER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: PlannerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_env_keys();
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("itinerary-planner").join("config.toml"))
    }

    /// Fill missing API keys from the conventional environment variables
    pub fn apply_env_keys(&mut self) {
        if self.llm.api_key.is_none() {
            self.llm.api_key = env::var(GEMINI_API_KEY_VAR).ok().filter(|k| !k.is_empty());
        }
        if self.places.api_key.is_none() {
            self.places.api_key = env::var(PLACES_API_KEY_VAR).ok().filter(|k| !k.is_empty());
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.llm.model.is_empty() {
            self.llm.model = default_llm_model();
        }
        if self.llm.base_url.is_empty() {
            self.llm.base_url = default_llm_base_url();
        }
        if self.llm.timeout_seconds == 0 {
            self.llm.timeout_seconds = default_timeout();
        }
        if self.places.timeout_seconds == 0 {
            self.places.timeout_seconds = default_timeout();
        }
        if self.places.default_query.trim().is_empty() {
            self.places.default_query = default_query();
        }
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.defaults.max_suggestions == 0 {
            self.defaults.max_suggestions = default_max_suggestions();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys when present; absence is only an error once a client is built
    pub fn validate_api_keys(&self) -> Result<()> {
        for (name, key) in [
            ("Gemini", &self.llm.api_key),
            ("Google Places", &self.places.api_key),
        ] {
            if let Some(api_key) = key {
                if api_key.len() < 8 {
                    return Err(PlannerError::config(format!(
                        "{name} API key appears to be invalid (too short). Please check your API key."
                    ))
                    .into());
                }

                if api_key.len() > 200 {
                    return Err(PlannerError::config(format!(
                        "{name} API key appears to be invalid (too long). Please check your API key."
                    ))
                    .into());
                }
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(PlannerError::config("LLM temperature must be between 0.0 and 2.0").into());
        }

        if !(0.0..=1.0).contains(&self.llm.top_p) {
            return Err(PlannerError::config("LLM top_p must be between 0.0 and 1.0").into());
        }

        if self.llm.max_output_tokens == 0 || self.llm.max_output_tokens > 8192 {
            return Err(
                PlannerError::config("LLM max_output_tokens must be between 1 and 8192").into(),
            );
        }

        if self.llm.timeout_seconds > 300 || self.places.timeout_seconds > 300 {
            return Err(PlannerError::config("API timeout cannot exceed 300 seconds").into());
        }

        if self.llm.max_retries > 10 || self.places.max_retries > 10 {
            return Err(PlannerError::config("API max retries cannot exceed 10").into());
        }

        if self.places.radius_meters == 0 || self.places.radius_meters > 50_000 {
            return Err(
                PlannerError::config("Places search radius must be between 1 and 50000 meters")
                    .into(),
            );
        }

        if self.places.max_places > 20 {
            return Err(PlannerError::config("Places max_places cannot exceed 20").into());
        }

        if self.defaults.max_suggestions > 50 {
            return Err(PlannerError::config("Maximum suggestions cannot exceed 50").into());
        }

        if self.server.request_timeout_seconds > 600 {
            return Err(
                PlannerError::config("Server request timeout cannot exceed 600 seconds").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PlannerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PlannerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("LLM base URL", &self.llm.base_url),
            ("Geocoding URL", &self.places.geocode_url),
            ("Nearby search URL", &self.places.nearby_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(
                    PlannerError::config(format!("{name} must be a valid HTTP or HTTPS URL")).into(),
                );
            }
        }

        if self.server.tls_cert.is_some() != self.server.tls_key.is_some() {
            return Err(PlannerError::config(
                "TLS requires both server.tls_cert and server.tls_key",
            )
            .into());
        }

        Ok(())
    }

    /// The Gemini API key, or a configuration error naming the missing variable
    pub fn require_llm_key(&self) -> crate::Result<&str> {
        self.llm
            .api_key
            .as_deref()
            .ok_or_else(|| PlannerError::config(format!("{GEMINI_API_KEY_VAR} is not set")))
    }

    /// The Places API key, or a configuration error naming the missing variable
    pub fn require_places_key(&self) -> crate::Result<&str> {
        self.places
            .api_key
            .as_deref()
            .ok_or_else(|| PlannerError::config(format!("{PLACES_API_KEY_VAR} is not set")))
    }
}
