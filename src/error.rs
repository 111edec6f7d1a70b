//! Error types and handling for the `FoodGuide` application

use thiserror::Error;

pub const LOCATION_UNSUPPORTED_MESSAGE: &str = "Location services are not supported on this device.";

pub const LOCATION_UNAVAILABLE_MESSAGE: &str =
    "Unable to get your location. Please enable location services to find food nearby.";

pub const SEARCH_FAILED_MESSAGE: &str = "Search failed, the AI may be busy. Please try again later.";

/// Main error type for the `FoodGuide` application
#[derive(Error, Debug)]
pub enum FoodGuideError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Search input rejected before any request was sent
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Network or service failure talking to the completion API
    #[error("Transport failure: {message}")]
    Transport { message: String },

    /// The model answered, but not with the JSON we asked for
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// The location capability is not available at all
    #[error("Location unsupported: {message}")]
    LocationUnsupported { message: String },

    /// Location was denied or the provider could not produce a position
    #[error("Location unavailable: {message}")]
    LocationUnavailable { message: String },
}

impl FoodGuideError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new input validation error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new malformed response error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn location_unsupported<S: Into<String>>(message: S) -> Self {
        Self::LocationUnsupported {
            message: message.into(),
        }
    }

    pub fn location_unavailable<S: Into<String>>(message: S) -> Self {
        Self::LocationUnavailable {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            FoodGuideError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
            FoodGuideError::InvalidInput { message } => format!("Invalid input: {message}"),
            FoodGuideError::Transport { .. } | FoodGuideError::MalformedResponse { .. } => {
                SEARCH_FAILED_MESSAGE.to_string()
            }
            FoodGuideError::LocationUnsupported { .. } => LOCATION_UNSUPPORTED_MESSAGE.to_string(),
            FoodGuideError::LocationUnavailable { .. } => LOCATION_UNAVAILABLE_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = FoodGuideError::config("missing API key");
        assert!(matches!(config_err, FoodGuideError::Config { .. }));

        let transport_err = FoodGuideError::transport("connection reset");
        assert!(matches!(transport_err, FoodGuideError::Transport { .. }));

        let malformed_err = FoodGuideError::malformed("no fenced block");
        assert!(matches!(malformed_err, FoodGuideError::MalformedResponse { .. }));

        let input_err = FoodGuideError::invalid_input("latitude out of range");
        assert!(matches!(input_err, FoodGuideError::InvalidInput { .. }));
    }

    #[test]
    fn test_user_messages_hide_details() {
        let transport_err = FoodGuideError::transport("HTTP 503: upstream overloaded");
        assert!(!transport_err.user_message().contains("503"));

        let malformed_err = FoodGuideError::malformed("expected `,` at line 3");
        assert_eq!(malformed_err.user_message(), transport_err.user_message());

        let input_err = FoodGuideError::invalid_input("category must not be empty");
        assert!(input_err.user_message().contains("category must not be empty"));
    }

    #[test]
    fn test_location_messages_are_distinct() {
        let unsupported = FoodGuideError::location_unsupported("no provider");
        let unavailable = FoodGuideError::location_unavailable("permission denied");
        assert_eq!(unsupported.user_message(), LOCATION_UNSUPPORTED_MESSAGE);
        assert_eq!(unavailable.user_message(), LOCATION_UNAVAILABLE_MESSAGE);
        assert_ne!(unsupported.user_message(), unavailable.user_message());
    }
}
