//! `WeatherAlert` - extreme weather notifications for your current location
//!
//! This library resolves where the machine is, fetches the multi-day forecast,
//! flags extreme cold, heat, rain and snow per day, and delivers a single alert
//! sentence via desktop popup, email and Discord.

pub mod alert;
pub mod config;
pub mod cycle;
pub mod error;
pub mod location;
pub mod models;
pub mod notify;
pub mod telemetry;
pub mod weather;

// Re-export core types for public API
pub use alert::{AlertCategory, Thresholds, evaluate_forecast};
pub use config::WeatherAlertConfig;
pub use cycle::{AlertCycle, CycleReport};
pub use error::WeatherAlertError;
pub use location::{IpLocationResolver, LocationProvider};
pub use models::{Forecast, ForecastInterval, Location};
pub use notify::{NotificationDispatcher, Notifier};
pub use weather::{ForecastProvider, OpenWeatherMapClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
