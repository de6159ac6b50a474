//! OpenWeatherMap 5 day / 3 hour forecast client and payload mapping

use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use super::ForecastProvider;
use crate::WeatherAlertError;
use crate::config::WeatherConfig;
use crate::models::{Forecast, ForecastInterval, Location};

/// Forecast client for the OpenWeatherMap `forecast` endpoint
pub struct OpenWeatherMapClient {
    client: Client,
    base_url: String,
    api_key: String,
    units: String,
}

impl OpenWeatherMapClient {
    /// Create a client from the weather section of the configuration
    pub fn new(client: Client, config: &WeatherConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| WeatherAlertError::config("Missing weather.api_key"))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            units: config.units.clone(),
        })
    }

    fn forecast_url(&self, location: &Location) -> String {
        format!(
            "{}/forecast?lat={}&lon={}&appid={}&units={}",
            self.base_url,
            location.latitude,
            location.longitude,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.units)
        )
    }
}

#[async_trait]
impl ForecastProvider for OpenWeatherMapClient {
    #[instrument(skip(self), fields(lat = location.latitude, lon = location.longitude))]
    async fn forecast(&self, location: &Location) -> Result<Forecast> {
        info!("Getting forecast for {}", location);
        let start_time = Instant::now();

        let response = self
            .client
            .get(self.forecast_url(location))
            .send()
            .await
            .map_err(|e| WeatherAlertError::api(format!("Forecast request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_default();
            error!("Forecast request returned HTTP {}: {}", status, detail);
            return Err(WeatherAlertError::api(format!(
                "Forecast request returned HTTP {status}: {detail}"
            ))
            .into());
        }

        let body = response
            .text()
            .await
            .with_context(|| "Failed to read OpenWeatherMap forecast response")?;
        let forecast = parse_forecast(&body)?;

        let total_duration = start_time.elapsed();
        info!(
            "Retrieved forecast with {} intervals in {:.3}s",
            forecast.intervals.len(),
            total_duration.as_secs_f64()
        );
        if total_duration.as_secs() > 5 {
            warn!(
                "Slow forecast API response: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Ok(forecast)
    }
}

/// Parse a raw forecast response body into a [`Forecast`]
pub fn parse_forecast(body: &str) -> Result<Forecast> {
    let response: ForecastResponse = serde_json::from_str(body).map_err(|e| {
        WeatherAlertError::payload(format!("Invalid OpenWeatherMap forecast payload: {e}"))
    })?;
    response.into_forecast()
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<ListEntry>,
    city: Option<City>,
}

#[derive(Debug, Deserialize)]
struct City {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListEntry {
    /// Unix timestamp (UTC) of the forecast window
    dt: i64,
    main: MainReadings,
    #[serde(default)]
    weather: Vec<Condition>,
    rain: Option<Accumulation>,
    snow: Option<Accumulation>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct Accumulation {
    #[serde(rename = "3h")]
    three_hours: Option<f64>,
}

impl ForecastResponse {
    fn into_forecast(self) -> Result<Forecast> {
        let intervals = self
            .list
            .into_iter()
            .map(ListEntry::into_interval)
            .collect::<Result<Vec<_>>>()?;

        debug!("Mapped {} forecast intervals", intervals.len());
        Ok(Forecast::new(self.city.and_then(|c| c.name), intervals))
    }
}

impl ListEntry {
    fn into_interval(self) -> Result<ForecastInterval> {
        let timestamp = DateTime::from_timestamp(self.dt, 0).ok_or_else(|| {
            WeatherAlertError::payload(format!("Forecast timestamp out of range: {}", self.dt))
        })?;

        let description = self
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .unwrap_or_default();

        Ok(ForecastInterval {
            timestamp,
            min_temperature: self.main.temp_min,
            max_temperature: self.main.temp_max,
            description,
            rain_mm: self.rain.and_then(|r| r.three_hours),
            snow_mm: self.snow.and_then(|s| s.three_hours),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "cod": "200",
        "cnt": 2,
        "list": [
            {
                "dt": 1712026800,
                "main": {"temp": 14.2, "temp_min": 12.1, "temp_max": 14.9},
                "weather": [{"id": 502, "main": "Rain", "description": "heavy intensity rain"}],
                "rain": {"3h": 50.0},
                "dt_txt": "2024-04-02 03:00:00"
            },
            {
                "dt": 1712016000,
                "main": {"temp": -1.0, "temp_min": -2.5, "temp_max": 0.4},
                "weather": [{"id": 800, "main": "Clear", "description": "clear sky"}],
                "dt_txt": "2024-04-02 00:00:00"
            }
        ],
        "city": {"name": "Springfield", "timezone": -18000}
    }"#;

    #[test]
    fn test_parse_forecast_maps_fields() {
        let forecast = parse_forecast(SAMPLE).unwrap();

        assert_eq!(forecast.city.as_deref(), Some("Springfield"));
        assert_eq!(forecast.intervals.len(), 2);

        // Sorted chronologically regardless of payload order
        let first = &forecast.intervals[0];
        assert_eq!(first.timestamp.timestamp(), 1712016000);
        assert_eq!(first.min_temperature, -2.5);
        assert_eq!(first.rain_mm, None);
        assert_eq!(first.description, "clear sky");

        let second = &forecast.intervals[1];
        assert_eq!(second.max_temperature, 14.9);
        assert_eq!(second.rain_mm, Some(50.0));
        assert_eq!(second.day_label(), "Tuesday");
    }

    #[test]
    fn test_missing_list_is_payload_error() {
        let err = parse_forecast(r#"{"cod":"200","city":{"name":"X"}}"#).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WeatherAlertError>(),
            Some(WeatherAlertError::Payload { .. })
        ));
    }

    #[test]
    fn test_empty_rain_object_is_absent() {
        let body = r#"{"list":[{"dt":1712016000,"main":{"temp_min":1.0,"temp_max":2.0},
            "weather":[{"description":"light rain"}],"rain":{"1h":0.3}}]}"#;
        let forecast = parse_forecast(body).unwrap();
        assert_eq!(forecast.intervals[0].rain_mm, None);
    }

    #[test]
    fn test_forecast_url() {
        let config = WeatherConfig {
            api_key: Some("abc 123".to_string()),
            base_url: "https://api.example.test/data/2.5/".to_string(),
            ..WeatherConfig::default()
        };
        let client = OpenWeatherMapClient::new(Client::new(), &config).unwrap();
        let url = client.forecast_url(&Location::new("Test", 41.85, -87.65));
        assert_eq!(
            url,
            "https://api.example.test/data/2.5/forecast?lat=41.85&lon=-87.65&appid=abc%20123&units=metric"
        );
    }

    #[test]
    fn test_missing_api_key() {
        let config = WeatherConfig::default();
        assert!(OpenWeatherMapClient::new(Client::new(), &config).is_err());
    }
}
