//! Forecast-to-alert decision logic
//!
//! - classifier: per-interval threshold predicates
//! - dedup: first extreme category per calendar day
//! - composer: alert sentence rendering

pub mod classifier;
pub mod composer;
pub mod dedup;

pub use classifier::{Thresholds, is_extreme_cold, is_extreme_hot, is_heavy_rain, is_heavy_snow};
pub use composer::{NORMAL_FORECAST, compose_alert};
pub use dedup::{AlertCategory, ExtremeDayRecord, ExtremeWeatherDays, collect_extreme_days};

use crate::models::ForecastInterval;

/// Classify, deduplicate and compose the alert for a chronological forecast
#[must_use]
pub fn evaluate_forecast(intervals: &[ForecastInterval], thresholds: &Thresholds) -> String {
    compose_alert(&collect_extreme_days(intervals, thresholds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    // 2024-04-01 is a Monday
    fn at(day: u32, hour: u32, min: f64, max: f64, description: &str) -> ForecastInterval {
        let ts = Utc.with_ymd_and_hms(2024, 4, day, hour, 0, 0).unwrap();
        ForecastInterval::new(ts, min, max, description)
    }

    #[test]
    fn test_monday_cold() {
        let intervals = vec![at(1, 6, -5.0, 2.0, "clear sky")];
        assert_eq!(
            evaluate_forecast(&intervals, &Thresholds::default()),
            "It will Monday (-5COLD)"
        );
    }

    #[test]
    fn test_tuesday_hot_then_cold_keeps_hot() {
        let thresholds = Thresholds {
            heat: 30.0,
            ..Thresholds::default()
        };
        let intervals = vec![
            at(2, 12, 22.0, 35.0, "clear sky"),
            at(2, 23, -2.0, 4.0, "clear sky"),
        ];
        assert_eq!(
            evaluate_forecast(&intervals, &thresholds),
            "It will Tuesday (35HOT)"
        );
    }

    #[test]
    fn test_wednesday_rain() {
        let intervals = vec![at(3, 15, 12.0, 16.0, "heavy intensity rain").with_rain(50.0)];
        assert_eq!(
            evaluate_forecast(&intervals, &Thresholds::default()),
            "It will Wednesday (50RAIN)"
        );
    }

    #[test]
    fn test_thursday_cold_and_friday_rain() {
        let intervals = vec![
            at(4, 3, -4.0, 1.0, "clear sky"),
            at(5, 9, 8.0, 11.0, "very heavy rain").with_rain(60.0),
        ];
        assert_eq!(
            evaluate_forecast(&intervals, &Thresholds::default()),
            "It will Thursday (-4COLD), and Friday (60RAIN)"
        );
    }

    #[test]
    fn test_nothing_extreme() {
        let intervals = vec![
            at(1, 0, 5.0, 12.0, "scattered clouds"),
            at(2, 0, 8.0, 18.0, "light rain").with_rain(1.2),
            at(3, 0, 9.0, 21.0, "clear sky"),
        ];
        assert_eq!(
            evaluate_forecast(&intervals, &Thresholds::default()),
            NORMAL_FORECAST
        );
    }
}
