//! Error types and handling for `WeatherAlert`

use thiserror::Error;

/// Main error type for the `WeatherAlert` application
#[derive(Error, Debug)]
pub enum WeatherAlertError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Transport or status errors from the location and forecast services
    #[error("API error: {message}")]
    Api { message: String },

    /// Response bodies that do not have the expected shape
    #[error("Unexpected payload: {message}")]
    Payload { message: String },

    /// Delivery failures on a notification channel
    #[error("{channel} notification failed: {message}")]
    Notification { channel: String, message: String },
}

impl WeatherAlertError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new payload error
    pub fn payload<S: Into<String>>(message: S) -> Self {
        Self::Payload {
            message: message.into(),
        }
    }

    /// Create a new notification error for the named channel
    pub fn notification<C: Into<String>, S: Into<String>>(channel: C, message: S) -> Self {
        Self::Notification {
            channel: channel.into(),
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherAlertError::Config { .. } => {
                "Configuration error. Please check your config file and credentials.".to_string()
            }
            WeatherAlertError::Api { .. } => {
                "Unable to reach the weather services. Please check your internet connection."
                    .to_string()
            }
            WeatherAlertError::Payload { .. } => {
                "The weather service returned data we could not understand.".to_string()
            }
            WeatherAlertError::Notification { channel, .. } => {
                format!("Could not deliver the alert via {channel}. Please check its credentials.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = WeatherAlertError::config("missing API key");
        assert!(matches!(config_err, WeatherAlertError::Config { .. }));

        let api_err = WeatherAlertError::api("connection failed");
        assert!(matches!(api_err, WeatherAlertError::Api { .. }));

        let payload_err = WeatherAlertError::payload("no list");
        assert!(matches!(payload_err, WeatherAlertError::Payload { .. }));
    }

    #[test]
    fn test_notification_error_names_channel() {
        let err = WeatherAlertError::notification("Email", "authentication rejected");
        assert_eq!(
            err.to_string(),
            "Email notification failed: authentication rejected"
        );
        assert!(err.user_message().contains("via Email"));
    }

    #[test]
    fn test_user_messages() {
        let config_err = WeatherAlertError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let api_err = WeatherAlertError::api("test");
        assert!(api_err.user_message().contains("Unable to reach"));
    }

    #[test]
    fn test_payload_user_message() {
        let err = WeatherAlertError::payload("missing list");
        assert!(err.user_message().contains("could not understand"));
    }
}
