//! Configuration management for the `FoodGuide` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::models::{CuisineCategory, GeoLocation};
use crate::search::composer::{DEFAULT_LANGUAGE, DEFAULT_TEMPERATURE};
use crate::FoodGuideError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `FoodGuide` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodGuideConfig {
    /// Gemini API configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Search behaviour
    #[serde(default)]
    pub search: SearchConfig,
    /// Optional fixed location
    #[serde(default)]
    pub location: LocationConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP API settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Gemini API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Gemini API key
    pub api_key: Option<String>,
    /// Model identifier
    #[serde(default = "default_gemini_model")]
    pub model: String,
    /// Base URL for the Gemini API
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    /// Sampling temperature
    #[serde(default = "default_gemini_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds, 0 for none
    #[serde(default)]
    pub timeout_seconds: u32,
}

/// Search configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Language for descriptions and reviews
    #[serde(default = "default_search_language")]
    pub language: String,
    /// Category selected when a session starts
    #[serde(default = "default_search_category")]
    pub default_category: String,
}

/// Fixed location used when none is given on the command line
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Place name to geocode
    pub name: Option<String>,
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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_port")]
    pub port: u16,
}

// Default value functions
fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_search_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_search_category() -> String {
    CuisineCategory::default().to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_server_port() -> u16 {
    8080
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
            temperature: default_gemini_temperature(),
            timeout_seconds: 0,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            language: default_search_language(),
            default_category: default_search_category(),
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

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
        }
    }
}

impl FoodGuideConfig {
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

        // Environment overrides, e.g. FOODGUIDE_GEMINI__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("FOODGUIDE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: FoodGuideConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.gemini.api_key.is_none() {
            config.gemini.api_key = std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("API_KEY"))
                .ok();
        }

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("foodguide").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.gemini.model.is_empty() {
            self.gemini.model = default_gemini_model();
        }
        if self.gemini.base_url.is_empty() {
            self.gemini.base_url = default_gemini_base_url();
        }
        if self.search.language.is_empty() {
            self.search.language = default_search_language();
        }
        if self.search.default_category.is_empty() {
            self.search.default_category = default_search_category();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.port == 0 {
            self.server.port = default_server_port();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        // The key may be absent until a search is actually made
        if let Some(api_key) = &self.gemini.api_key {
            if api_key.trim().is_empty() {
                return Err(FoodGuideError::config(
                    "Gemini API key cannot be empty if provided. Either remove it or provide a valid key."
                ).into());
            }

            if api_key.len() < 8 {
                return Err(FoodGuideError::config(
                    "Gemini API key appears to be invalid (too short). Please check your API key."
                ).into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        // Zero is greedy decoding; keep some sampling
        let temperature = self.gemini.temperature;
        if !temperature.is_finite() || temperature <= 0.0 || temperature > 2.0 {
            return Err(FoodGuideError::config(
                "Gemini temperature must be above 0.0 and at most 2.0"
            ).into());
        }

        if self.gemini.timeout_seconds > 600 {
            return Err(FoodGuideError::config(
                "Gemini API timeout cannot exceed 600 seconds"
            ).into());
        }

        if let Some(location) = self.location.fixed() {
            location.validate().map_err(|e| FoodGuideError::config(
                format!("Configured location is invalid: {e}")
            ))?;
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(FoodGuideError::config(
                format!("Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_log_levels.join(", ")
                )
            ).into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(FoodGuideError::config(
                format!("Invalid log format '{}'. Must be one of: {}",
                    self.logging.format,
                    valid_log_formats.join(", ")
                )
            ).into());
        }

        if !self.gemini.base_url.starts_with("http://") && !self.gemini.base_url.starts_with("https://") {
            return Err(FoodGuideError::config(
                "Gemini API base URL must be a valid HTTP or HTTPS URL"
            ).into());
        }

        self.default_category()?;

        Ok(())
    }

    /// The configured starting category
    pub fn default_category(&self) -> Result<CuisineCategory> {
        self.search
            .default_category
            .parse::<CuisineCategory>()
            .map_err(|e| FoodGuideError::config(format!("Invalid default category: {e}")).into())
    }
}

impl LocationConfig {
    /// Fixed coordinates when both are configured
    #[must_use]
    pub fn fixed(&self) -> Option<GeoLocation> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(GeoLocation::new(lat, lng)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = FoodGuideConfig::default();
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.gemini.base_url, "https://generativelanguage.googleapis.com/v1beta");
        assert!((config.gemini.temperature - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.gemini.timeout_seconds, 0);
        assert_eq!(config.search.default_category, "Recommended");
        assert_eq!(config.logging.level, "info");
        assert!(config.gemini.api_key.is_none());
        assert!(config.location.fixed().is_none());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(FoodGuideConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_short_api_key() {
        let mut config = FoodGuideConfig::default();
        config.gemini.api_key = Some("abc".to_string());
        let result = config.validate_api_keys();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = FoodGuideConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[rstest]
    #[case(3.5, false)]
    #[case(0.0, false)]
    #[case(-0.2, false)]
    #[case(f32::NAN, false)]
    #[case(0.1, true)]
    #[case(2.0, true)]
    fn test_config_validation_temperature_range(#[case] temperature: f32, #[case] valid: bool) {
        let mut config = FoodGuideConfig::default();
        config.gemini.temperature = temperature;
        let result = config.validate();
        assert_eq!(result.is_ok(), valid);
        if let Err(err) = result {
            assert!(err.to_string().contains("temperature"));
        }
    }

    #[test]
    fn test_config_validation_unknown_category() {
        let mut config = FoodGuideConfig::default();
        config.search.default_category = "Fusion".to_string();
        assert!(config.validate().is_err());

        config.search.default_category = "cafe".to_string();
        assert_eq!(config.default_category().unwrap(), CuisineCategory::Cafe);
    }

    #[test]
    fn test_config_validation_fixed_location() {
        let mut config = FoodGuideConfig::default();
        config.location.latitude = Some(95.0);
        config.location.longitude = Some(121.56);
        assert!(config.validate().is_err());

        config.location.latitude = Some(25.03);
        assert_eq!(config.location.fixed(), Some(GeoLocation::new(25.03, 121.56)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("foodguide-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[gemini]\nmodel = \"gemini-2.5-pro\"\n\n[search]\nlanguage = \"English\"\ndefault_category = \"Japanese\"\n\n[location]\nlatitude = 35.68\nlongitude = 139.76"
        )
        .unwrap();

        let config = FoodGuideConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.gemini.model, "gemini-2.5-pro");
        assert_eq!(config.search.language, "English");
        assert_eq!(config.default_category().unwrap(), CuisineCategory::Japanese);
        assert_eq!(config.location.fixed(), Some(GeoLocation::new(35.68, 139.76)));
        assert_eq!(config.logging.format, "pretty");

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = FoodGuideConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("foodguide"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
