//! Data models for the WeatherAlert application
//!
//! - Location: where the forecast is fetched for
//! - Forecast: the ordered forecast intervals evaluated each cycle

pub mod forecast;
pub mod location;

// Re-export all public types for convenient access
pub use forecast::{Forecast, ForecastInterval};
pub use location::Location;
