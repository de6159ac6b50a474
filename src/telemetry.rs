//! Tracing subscriber setup

use anyhow::{Context, Result};
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

use crate::config::LoggingConfig;

type BoxedSubscriber = Box<dyn Subscriber + Send + Sync>;

/// Filter for the crate at the configured level, e.g. `weatheralert=info`
pub fn level_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(format!("weatheralert={level}"))
        .with_context(|| format!("Invalid log level '{level}'"))
}

/// Pretty or JSON formatter writing through `writer`
pub fn build_subscriber<W>(format: &str, filter: EnvFilter, writer: W) -> BoxedSubscriber
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer);

    match format {
        "json" => Box::new(builder.json().finish()),
        _ => Box::new(builder.finish()),
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the configured level.
pub fn init(logging: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(&logging.level)?,
    };

    let subscriber = build_subscriber(&logging.format, filter, std::io::stdout);
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let err = level_filter("loudest").unwrap_err();
        assert!(err.to_string().contains("Invalid log level 'loudest'"));
    }

    #[test]
    fn test_configured_levels_parse() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(level_filter(level).is_ok(), "{level} should parse");
        }
    }

    #[test]
    fn test_json_format_emits_json_lines() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = build_subscriber(
            "json",
            level_filter("info").unwrap(),
            move || writer.clone(),
        );

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(channel = "Email", "Alert delivered");
            tracing::debug!("filtered out at info");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 1);

        let event: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(event["level"], "INFO");
        assert_eq!(event["fields"]["message"], "Alert delivered");
        assert_eq!(event["fields"]["channel"], "Email");
    }

    #[test]
    fn test_init_installs_global_subscriber_once() {
        let logging = LoggingConfig {
            format: "json".to_string(),
            ..LoggingConfig::default()
        };

        assert!(init(&logging).is_ok());
        assert!(init(&logging).is_err());
    }
}
