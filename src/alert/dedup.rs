//! Per-day deduplication of extreme readings.
//!
//! Intervals are walked chronologically. The first interval of a day that
//! crosses any threshold claims that day for its category; every later
//! interval on the same day is ignored, even if it is more severe.

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use super::classifier::{Thresholds, is_extreme_cold, is_extreme_hot, is_heavy_rain, is_heavy_snow};
use crate::models::ForecastInterval;

/// Extreme weather classification, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertCategory {
    Cold,
    Hot,
    Rain,
    Snow,
}

impl AlertCategory {
    /// All categories in precedence and rendering order
    pub const ALL: [AlertCategory; 4] = [
        AlertCategory::Cold,
        AlertCategory::Hot,
        AlertCategory::Rain,
        AlertCategory::Snow,
    ];

    /// Uppercase token appended to values in alert text
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            AlertCategory::Cold => "COLD",
            AlertCategory::Hot => "HOT",
            AlertCategory::Rain => "RAIN",
            AlertCategory::Snow => "SNOW",
        }
    }

    fn index(self) -> usize {
        match self {
            AlertCategory::Cold => 0,
            AlertCategory::Hot => 1,
            AlertCategory::Rain => 2,
            AlertCategory::Snow => 3,
        }
    }

    /// Value that triggers this category for the interval, if it does
    fn triggering_value(self, interval: &ForecastInterval, thresholds: &Thresholds) -> Option<f64> {
        match self {
            AlertCategory::Cold => is_extreme_cold(interval, thresholds.cold)
                .then_some(interval.min_temperature),
            AlertCategory::Hot => is_extreme_hot(interval, thresholds.heat)
                .then_some(interval.max_temperature),
            AlertCategory::Rain => is_heavy_rain(interval, thresholds.rain)
                .then_some(interval.rain_mm)
                .flatten(),
            AlertCategory::Snow => is_heavy_snow(interval, thresholds.snow)
                .then_some(interval.snow_mm)
                .flatten(),
        }
    }
}

impl fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlertCategory::Cold => "cold",
            AlertCategory::Hot => "hot",
            AlertCategory::Rain => "rain",
            AlertCategory::Snow => "snow",
        };
        f.write_str(name)
    }
}

/// A day flagged under one category with the value that triggered it
#[derive(Debug, Clone, PartialEq)]
pub struct ExtremeDayRecord {
    pub day: String,
    pub value: f64,
}

/// Flagged days grouped by category, each day claimed at most once
#[derive(Debug, Clone, Default)]
pub struct ExtremeWeatherDays {
    records: [Vec<ExtremeDayRecord>; 4],
    claimed_days: HashSet<String>,
}

impl ExtremeWeatherDays {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a day under a category. Returns false if the day was already claimed.
    pub fn record(&mut self, category: AlertCategory, day: impl Into<String>, value: f64) -> bool {
        let day = day.into();
        if !self.claimed_days.insert(day.clone()) {
            return false;
        }
        self.records[category.index()].push(ExtremeDayRecord { day, value });
        true
    }

    #[must_use]
    pub fn is_claimed(&self, day: &str) -> bool {
        self.claimed_days.contains(day)
    }

    /// Records for a category in the order they were flagged
    #[must_use]
    pub fn records(&self, category: AlertCategory) -> &[ExtremeDayRecord] {
        &self.records[category.index()]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claimed_days.is_empty()
    }

    /// Number of flagged days across all categories
    #[must_use]
    pub fn len(&self) -> usize {
        self.claimed_days.len()
    }
}

/// Walk the intervals in order and keep the first extreme category per day
#[must_use]
pub fn collect_extreme_days(
    intervals: &[ForecastInterval],
    thresholds: &Thresholds,
) -> ExtremeWeatherDays {
    let mut days = ExtremeWeatherDays::new();

    for interval in intervals {
        let day = interval.day_label();
        if days.is_claimed(&day) {
            continue;
        }

        let hit = AlertCategory::ALL.into_iter().find_map(|category| {
            category
                .triggering_value(interval, thresholds)
                .map(|value| (category, value))
        });

        if let Some((category, value)) = hit {
            debug!(%day, %category, value, "Flagged extreme weather");
            days.record(category, day, value);
        }
    }

    days
}
