//! Configuration management for `WeatherAlert`
//!
//! Handles loading configuration from a TOML or JSON file plus environment
//! variables, and validates that every enabled channel is fully populated.

use crate::WeatherAlertError;
use crate::alert::Thresholds;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "WEATHERALERT_CONFIG";

/// Root configuration structure for the `WeatherAlert` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherAlertConfig {
    /// Forecast provider configuration
    pub weather: WeatherConfig,
    /// IP location lookup configuration
    pub location: LocationConfig,
    /// Extreme weather thresholds
    pub thresholds: Thresholds,
    /// Cycle scheduling
    pub schedule: ScheduleConfig,
    /// Delivery channels
    pub notifications: NotificationsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Forecast provider (OpenWeatherMap) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    pub api_key: Option<String>,
    /// Base URL for the forecast API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Unit system requested from the provider
    #[serde(default = "default_weather_units")]
    pub units: String,
    /// Request timeout in seconds, shared by all outbound HTTP calls
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Endpoint returning `{ city, loc: "lat,lon" }` for the caller's IP
    #[serde(default = "default_resolver_url")]
    pub resolver_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Hours to sleep between cycles
    #[serde(default = "default_notif_frequency")]
    pub notif_frequency_hours: u32,
    /// Stop the process on the first failed cycle instead of waiting for the next one
    #[serde(default)]
    pub fail_fast: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub desktop: DesktopConfig,
    pub email: EmailConfig,
    pub discord: DiscordConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesktopConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_alert_title")]
    pub title: String,
    /// How long the popup stays visible, in milliseconds
    #[serde(default = "default_desktop_timeout")]
    pub timeout_ms: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Account the alert is sent from, also used as SMTP username
    pub sender: Option<String>,
    /// SMTP (application) password of the sender account
    pub password: Option<String>,
    pub recipient: Option<String>,
    #[serde(default = "default_smtp_relay")]
    pub smtp_relay: String,
    #[serde(default = "default_alert_title")]
    pub subject: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Bot token
    pub token: Option<String>,
    /// Id of the user receiving the direct message
    pub user_id: Option<u64>,
    #[serde(default = "default_discord_api")]
    pub api_base_url: String,
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

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_weather_units() -> String {
    "metric".to_string()
}

fn default_weather_timeout() -> u32 {
    30
}

fn default_resolver_url() -> String {
    "https://ipinfo.io/json".to_string()
}

fn default_notif_frequency() -> u32 {
    12
}

fn default_enabled() -> bool {
    true
}

fn default_alert_title() -> String {
    "Weather Alert".to_string()
}

fn default_desktop_timeout() -> u32 {
    1000
}

fn default_smtp_relay() -> String {
    "smtp.gmail.com".to_string()
}

fn default_discord_api() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            units: default_weather_units(),
            timeout_seconds: default_weather_timeout(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            resolver_url: default_resolver_url(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            notif_frequency_hours: default_notif_frequency(),
            fail_fast: false,
        }
    }
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            title: default_alert_title(),
            timeout_ms: default_desktop_timeout(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            sender: None,
            password: None,
            recipient: None,
            smtp_relay: default_smtp_relay(),
            subject: default_alert_title(),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            token: None,
            user_id: None,
            api_base_url: default_discord_api(),
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

impl ScheduleConfig {
    /// Sleep between two cycles
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.notif_frequency_hours) * 3600)
    }
}

impl NotificationsConfig {
    #[must_use]
    pub fn any_enabled(&self) -> bool {
        self.desktop.enabled || self.email.enabled || self.discord.enabled
    }
}

impl WeatherAlertConfig {
    /// Load configuration from the default locations and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(Self::resolve_config_path);

        if config_file.exists() {
            // Format follows the extension, so both config.toml and config.json work
            builder = builder.add_source(File::from(config_file.clone()).required(false));
        } else {
            tracing::debug!("No config file at {}", config_file.display());
        }

        // e.g. WEATHERALERT_WEATHER__API_KEY, WEATHERALERT_THRESHOLDS__COLD
        // Values stay strings until deserialization so digit-only secrets keep leading zeros
        builder = builder.add_source(
            Environment::with_prefix("WEATHERALERT")
                .prefix_separator("_")
                .separator("__"),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WeatherAlertConfig = settings.try_deserialize().with_context(|| {
            format!(
                "Failed to deserialize configuration from {}",
                config_file.display()
            )
        })?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Explicit env path, then the user config dir, then `./config.toml`
    #[must_use]
    pub fn resolve_config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }
        Self::get_config_path()
            .filter(|path| path.exists())
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weatheralert").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.units.is_empty() {
            self.weather.units = default_weather_units();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.location.resolver_url.is_empty() {
            self.location.resolver_url = default_resolver_url();
        }
        if self.notifications.email.smtp_relay.is_empty() {
            self.notifications.email.smtp_relay = default_smtp_relay();
        }
        if self.notifications.discord.api_base_url.is_empty() {
            self.notifications.discord.api_base_url = default_discord_api();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_channels()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// The forecast provider needs a key
    pub fn validate_api_key(&self) -> Result<()> {
        match self.weather.api_key.as_deref() {
            None | Some("") => Err(WeatherAlertError::config(
                "Missing weather.api_key. Please provide your OpenWeatherMap API key.",
            )
            .into()),
            Some(_) => Ok(()),
        }
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        let t = &self.thresholds;
        if ![t.cold, t.heat, t.rain, t.snow].iter().all(|v| v.is_finite()) {
            return Err(WeatherAlertError::config("Thresholds must be finite numbers").into());
        }

        if self.schedule.notif_frequency_hours == 0 {
            return Err(WeatherAlertError::config(
                "Notification frequency must be at least 1 hour",
            )
            .into());
        }

        if self.schedule.notif_frequency_hours > 168 {
            return Err(WeatherAlertError::config(
                "Notification frequency cannot exceed 168 hours (1 week)",
            )
            .into());
        }

        if self.weather.timeout_seconds > 300 {
            return Err(WeatherAlertError::config(
                "Request timeout cannot exceed 300 seconds",
            )
            .into());
        }

        Ok(())
    }

    /// Every enabled channel must carry its credentials
    fn validate_channels(&self) -> Result<()> {
        let email = &self.notifications.email;
        if email.enabled {
            require("notifications.email.sender", email.sender.as_deref())?;
            require("notifications.email.password", email.password.as_deref())?;
            require("notifications.email.recipient", email.recipient.as_deref())?;
        }

        let discord = &self.notifications.discord;
        if discord.enabled {
            require("notifications.discord.token", discord.token.as_deref())?;
            if discord.user_id.is_none() {
                return Err(WeatherAlertError::config(
                    "Missing notifications.discord.user_id (required while Discord alerts are enabled)",
                )
                .into());
            }
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherAlertError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherAlertError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (key, url) in [
            ("weather.base_url", &self.weather.base_url),
            ("location.resolver_url", &self.location.resolver_url),
            ("notifications.discord.api_base_url", &self.notifications.discord.api_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WeatherAlertError::config(format!(
                    "{key} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

fn require(key: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(v) if !v.is_empty() => Ok(()),
        _ => Err(WeatherAlertError::config(format!(
            "Missing {key} (required while this channel is enabled)"
        ))
        .into()),
    }
}
