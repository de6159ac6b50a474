//! Render flagged days into the alert sentence sent to every channel.

use super::dedup::{AlertCategory, ExtremeWeatherDays};

/// Sentence used when nothing crosses a threshold
pub const NORMAL_FORECAST: &str = "Normal forecast for your current location";

/// Build the alert text, e.g. `It will Monday (-5COLD), and Friday (50RAIN)`.
///
/// The category token doubles as the unit suffix of each value.
#[must_use]
pub fn compose_alert(days: &ExtremeWeatherDays) -> String {
    let clauses: Vec<String> = AlertCategory::ALL
        .into_iter()
        .filter_map(|category| category_clause(days, category))
        .collect();

    if clauses.is_empty() {
        NORMAL_FORECAST.to_string()
    } else {
        format!("It will {}", clauses.join(", and "))
    }
}

fn category_clause(days: &ExtremeWeatherDays, category: AlertCategory) -> Option<String> {
    let records = days.records(category);
    if records.is_empty() {
        return None;
    }

    let rendered: Vec<String> = records
        .iter()
        .map(|record| format!("{} ({}{})", record.day, record.value, category.suffix()))
        .collect();
    Some(rendered.join(", "))
}
