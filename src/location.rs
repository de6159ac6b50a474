//! Location Resolution Module
//!
//! Resolves the caller's approximate location from their public IP address.

use crate::WeatherAlertError;
use crate::models::Location;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Source of the location the forecast is fetched for
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> Result<Location>;
}

/// Resolver backed by an ipinfo.io compatible endpoint
pub struct IpLocationResolver {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    city: Option<String>,
    loc: Option<String>,
}

impl IpLocationResolver {
    #[must_use]
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl LocationProvider for IpLocationResolver {
    #[instrument(name = "resolve_location", skip(self), fields(url = %self.url))]
    async fn current_location(&self) -> Result<Location> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| WeatherAlertError::api(format!("IP location lookup failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherAlertError::api(format!(
                "IP location lookup returned HTTP {status}"
            ))
            .into());
        }

        let body: IpInfoResponse = response
            .json()
            .await
            .with_context(|| "Failed to parse IP location response")?;
        debug!(?body, "IP location response");

        let location = parse_ipinfo(body)?;
        info!("Resolved current location: {}", location);
        Ok(location)
    }
}

fn parse_ipinfo(body: IpInfoResponse) -> Result<Location> {
    let loc = body
        .loc
        .ok_or_else(|| WeatherAlertError::payload("IP location response has no 'loc' field"))?;

    let (latitude, longitude) = parse_coordinates(&loc).ok_or_else(|| {
        WeatherAlertError::payload(format!("Invalid coordinates in IP location response: '{loc}'"))
    })?;

    Ok(Location::new(
        body.city.unwrap_or_else(|| "Unknown".to_string()),
        latitude,
        longitude,
    ))
}

/// Parse `"lat,lon"` into a coordinate pair
fn parse_coordinates(loc: &str) -> Option<(f64, f64)> {
    let (lat, lon) = loc.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)).then_some((lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinates() {
        assert_eq!(parse_coordinates("46.8182,8.2275"), Some((46.8182, 8.2275)));
        assert_eq!(parse_coordinates(" -33.9, 151.2 "), Some((-33.9, 151.2)));
        assert_eq!(parse_coordinates("46.8182"), None);
        assert_eq!(parse_coordinates("north,south"), None);
        assert_eq!(parse_coordinates("123.0,8.0"), None);
    }

    #[test]
    fn test_parse_ipinfo_payload() {
        let body: IpInfoResponse = serde_json::from_str(
            r#"{"ip":"203.0.113.7","city":"Chicago","region":"Illinois","loc":"41.8500,-87.6500"}"#,
        )
        .unwrap();

        let location = parse_ipinfo(body).unwrap();
        assert_eq!(location, Location::new("Chicago", 41.85, -87.65));
    }

    #[test]
    fn test_missing_loc_is_payload_error() {
        let body: IpInfoResponse = serde_json::from_str(r#"{"city":"Nowhere"}"#).unwrap();
        let err = parse_ipinfo(body).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WeatherAlertError>(),
            Some(WeatherAlertError::Payload { .. })
        ));
    }
}
