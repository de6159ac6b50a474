//! Forecast retrieval
//!
//! The forecast provider sits behind [`ForecastProvider`] so the cycle can run
//! against any source; [`OpenWeatherMapClient`] is the production one.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::models::{Forecast, Location};

pub mod openweathermap;

pub use openweathermap::OpenWeatherMapClient;

/// Source of multi-day forecasts for a location
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn forecast(&self, location: &Location) -> Result<Forecast>;
}

/// HTTP client shared by the location, forecast and chat calls
pub fn http_client(timeout_seconds: u32) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.into()))
        .user_agent(concat!("WeatherAlert/", env!("CARGO_PKG_VERSION")))
        .build()
        .with_context(|| "Failed to create HTTP client")
}
