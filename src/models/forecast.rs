//! Forecast model: ordered intervals plus retrieval metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One discrete forecast entry covering a multi-hour window
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastInterval {
    /// Start of the forecast window
    pub timestamp: DateTime<Utc>,
    /// Minimum temperature in Celsius
    pub min_temperature: f64,
    /// Maximum temperature in Celsius
    pub max_temperature: f64,
    /// Provider weather description, e.g. "light rain"
    pub description: String,
    /// Rain accumulated over the provider window, in mm
    pub rain_mm: Option<f64>,
    /// Snow accumulated over the provider window, in mm
    pub snow_mm: Option<f64>,
}

impl ForecastInterval {
    /// Create an interval without precipitation data
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        min_temperature: f64,
        max_temperature: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            min_temperature,
            max_temperature,
            description: description.into(),
            rain_mm: None,
            snow_mm: None,
        }
    }

    #[must_use]
    pub fn with_rain(mut self, mm: f64) -> Self {
        self.rain_mm = Some(mm);
        self
    }

    #[must_use]
    pub fn with_snow(mut self, mm: f64) -> Self {
        self.snow_mm = Some(mm);
        self
    }

    /// Weekday name used to group intervals by calendar day, e.g. "Monday"
    #[must_use]
    pub fn day_label(&self) -> String {
        self.timestamp.format("%A").to_string()
    }
}

/// Forecast for one location, intervals sorted by timestamp
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Forecast {
    /// City name reported by the provider, if any
    pub city: Option<String>,
    /// Forecast intervals in chronological order
    pub intervals: Vec<ForecastInterval>,
    /// When this forecast was retrieved
    pub retrieved_at: DateTime<Utc>,
}

impl Forecast {
    /// Create a new forecast, ordering the intervals chronologically
    #[must_use]
    pub fn new(city: Option<String>, mut intervals: Vec<ForecastInterval>) -> Self {
        intervals.sort_by_key(|interval| interval.timestamp);
        Self {
            city,
            intervals,
            retrieved_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}
