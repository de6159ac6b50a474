//! Threshold predicates for a single forecast interval.
//!
//! All comparisons are strict: cold triggers below its limit, the other
//! categories trigger above theirs. Missing precipitation never triggers.

use serde::{Deserialize, Serialize};

use crate::models::ForecastInterval;

/// Limits above/below which an interval counts as extreme
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum temperature in Celsius below which it is extreme cold
    #[serde(default = "default_cold")]
    pub cold: f64,
    /// Maximum temperature in Celsius above which it is extreme heat
    #[serde(default = "default_heat")]
    pub heat: f64,
    /// Rain in mm per provider window above which it is heavy rain
    #[serde(default = "default_rain")]
    pub rain: f64,
    /// Snow in mm per provider window above which it is heavy snow
    #[serde(default = "default_snow")]
    pub snow: f64,
}

fn default_cold() -> f64 {
    0.0
}

fn default_heat() -> f64 {
    30.0
}

fn default_rain() -> f64 {
    45.0
}

fn default_snow() -> f64 {
    25.0
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cold: default_cold(),
            heat: default_heat(),
            rain: default_rain(),
            snow: default_snow(),
        }
    }
}

#[must_use]
pub fn is_extreme_cold(interval: &ForecastInterval, cold_limit: f64) -> bool {
    interval.min_temperature < cold_limit
}

#[must_use]
pub fn is_extreme_hot(interval: &ForecastInterval, heat_limit: f64) -> bool {
    interval.max_temperature > heat_limit
}

#[must_use]
pub fn is_heavy_rain(interval: &ForecastInterval, rain_limit: f64) -> bool {
    describes(interval, "rain") && interval.rain_mm.is_some_and(|mm| mm > rain_limit)
}

#[must_use]
pub fn is_heavy_snow(interval: &ForecastInterval, snow_limit: f64) -> bool {
    describes(interval, "snow") && interval.snow_mm.is_some_and(|mm| mm > snow_limit)
}

fn describes(interval: &ForecastInterval, condition: &str) -> bool {
    interval.description.to_lowercase().contains(condition)
}
