use std::process::ExitCode;

use weatheralert::{AlertCycle, VERSION, WeatherAlertConfig, WeatherAlertError, telemetry};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match WeatherAlertConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:#}");
            if let Some(err) = e.downcast_ref::<WeatherAlertError>() {
                eprintln!("{}", err.user_message());
            }
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = telemetry::init(&config.logging) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    tracing::info!(
        "WeatherAlert {} starting, checking every {}h",
        VERSION,
        config.schedule.notif_frequency_hours
    );

    let result = match AlertCycle::from_config(&config) {
        Ok(cycle) => {
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            };
            cycle.run_forever(config.schedule.interval(), shutdown).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            if let Some(err) = e.root_cause().downcast_ref::<WeatherAlertError>() {
                eprintln!("{}", err.user_message());
            }
            ExitCode::FAILURE
        }
    }
}
