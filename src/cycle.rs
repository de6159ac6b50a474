//! Cycle driver: resolve, fetch, evaluate, notify, sleep, repeat.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, error, info, instrument, warn};

use crate::alert::{Thresholds, evaluate_forecast};
use crate::config::WeatherAlertConfig;
use crate::location::{IpLocationResolver, LocationProvider};
use crate::models::Location;
use crate::notify::NotificationDispatcher;
use crate::weather::{ForecastProvider, OpenWeatherMapClient, http_client};

/// Outcome of one successful cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub location: Location,
    pub interval_count: usize,
    pub alert: String,
    /// Channels the alert was delivered through, in order
    pub delivered: Vec<&'static str>,
}

/// One location, one forecast source, one set of channels
pub struct AlertCycle {
    locator: Box<dyn LocationProvider>,
    forecaster: Box<dyn ForecastProvider>,
    dispatcher: NotificationDispatcher,
    thresholds: Thresholds,
    fail_fast: bool,
}

impl AlertCycle {
    #[must_use]
    pub fn new(
        locator: Box<dyn LocationProvider>,
        forecaster: Box<dyn ForecastProvider>,
        dispatcher: NotificationDispatcher,
        thresholds: Thresholds,
    ) -> Self {
        Self {
            locator,
            forecaster,
            dispatcher,
            thresholds,
            fail_fast: false,
        }
    }

    /// Stop [`run_forever`](Self::run_forever) on the first failed cycle
    #[must_use]
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Wire the production collaborators from configuration
    pub fn from_config(config: &WeatherAlertConfig) -> Result<Self> {
        let client = http_client(config.weather.timeout_seconds)?;

        if !config.notifications.any_enabled() {
            info!("No notification channel enabled, alerts will be printed to stdout");
        }

        let locator = IpLocationResolver::new(client.clone(), &config.location.resolver_url);
        let forecaster = OpenWeatherMapClient::new(client.clone(), &config.weather)?;
        let dispatcher = NotificationDispatcher::from_config(&config.notifications, client)
            .context("Failed to set up notification channels")?;

        Ok(Self::new(
            Box::new(locator),
            Box::new(forecaster),
            dispatcher,
            config.thresholds,
        )
        .fail_fast(config.schedule.fail_fast))
    }

    /// Run a single fetch, evaluate and notify pass
    #[instrument(name = "alert_cycle", skip(self))]
    pub async fn run_once(&self) -> Result<CycleReport> {
        let location = self
            .locator
            .current_location()
            .await
            .context("Failed to resolve current location")?;

        let forecast = self
            .forecaster
            .forecast(&location)
            .await
            .context("Failed to fetch forecast")?;

        debug!(
            city = forecast.city.as_deref().unwrap_or("unknown"),
            retrieved_at = %forecast.retrieved_at,
            intervals = forecast.intervals.len(),
            "Forecast retrieved"
        );

        if forecast.is_empty() {
            warn!("Forecast for {} contains no intervals", location);
        }

        let alert = evaluate_forecast(&forecast.intervals, &self.thresholds);
        info!(%alert, "Composed weather alert");

        let delivered = self
            .dispatcher
            .dispatch(&alert)
            .await
            .context("Failed to deliver weather alert")?;

        Ok(CycleReport {
            location,
            interval_count: forecast.intervals.len(),
            alert,
            delivered,
        })
    }

    /// Repeat cycles every `interval` until `shutdown` resolves.
    ///
    /// Failed cycles are logged and retried after the next sleep unless
    /// fail-fast is set, in which case the error is returned.
    pub async fn run_forever<S>(&self, interval: Duration, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            match self.run_once().await {
                Ok(report) => info!(
                    location = %report.location,
                    intervals = report.interval_count,
                    channels = ?report.delivered,
                    "Cycle complete"
                ),
                Err(e) if self.fail_fast => return Err(e),
                Err(e) => error!("Cycle failed, waiting for the next one: {:#}", e),
            }

            info!("Next check in {}h", interval.as_secs() / 3600);
            tokio::select! {
                () = tokio::time::sleep(interval) => {}
                () = &mut shutdown => {
                    info!("Shutdown requested");
                    return Ok(());
                }
            }
        }
    }
}
