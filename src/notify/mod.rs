//! Alert delivery
//!
//! Each channel implements [`Notifier`]. The dispatcher sends to every enabled
//! channel in turn (desktop, email, discord) and stops at the first failure.
//! Desktop popups are fire-and-forget and never report one.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use crate::config::NotificationsConfig;

pub mod desktop;
pub mod discord;
pub mod email;

pub use desktop::DesktopNotifier;
pub use discord::DiscordNotifier;
pub use email::EmailNotifier;

/// A channel the composed alert can be delivered through
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name used in logs and confirmations
    fn name(&self) -> &'static str;

    async fn send(&self, alert: &str) -> Result<()>;
}

/// Sends one alert through every configured channel
#[derive(Default)]
pub struct NotificationDispatcher {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotificationDispatcher {
    #[must_use]
    pub fn new(notifiers: Vec<Box<dyn Notifier>>) -> Self {
        Self { notifiers }
    }

    /// Build the enabled channels in delivery order
    pub fn from_config(config: &NotificationsConfig, client: Client) -> Result<Self> {
        let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();

        if config.desktop.enabled {
            notifiers.push(Box::new(DesktopNotifier::new(&config.desktop)));
        }
        if config.email.enabled {
            notifiers.push(Box::new(EmailNotifier::new(&config.email)?));
        }
        if config.discord.enabled {
            notifiers.push(Box::new(DiscordNotifier::new(&config.discord, client)?));
        }

        Ok(Self::new(notifiers))
    }

    #[must_use]
    pub fn channels(&self) -> Vec<&'static str> {
        self.notifiers.iter().map(|n| n.name()).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    /// Deliver the alert, returning the channels that succeeded.
    ///
    /// With no channel enabled the alert is printed to stdout instead.
    pub async fn dispatch(&self, alert: &str) -> Result<Vec<&'static str>> {
        if self.notifiers.is_empty() {
            println!("{alert}");
            return Ok(Vec::new());
        }

        let mut delivered = Vec::with_capacity(self.notifiers.len());
        for notifier in &self.notifiers {
            notifier.send(alert).await?;
            info!(channel = notifier.name(), "Alert delivered");
            println!("{} notification successfully sent", notifier.name());
            delivered.push(notifier.name());
        }

        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WeatherAlertError;
    use crate::config::DesktopConfig;
    use std::sync::{Arc, Mutex};

    struct Recording {
        name: &'static str,
        sent: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn send(&self, alert: &str) -> Result<()> {
            if self.fail {
                return Err(WeatherAlertError::notification(self.name, "rejected").into());
            }
            self.sent.lock().unwrap().push(format!("{}:{alert}", self.name));
            Ok(())
        }
    }

    fn recording(
        name: &'static str,
        sent: &Arc<Mutex<Vec<String>>>,
        fail: bool,
    ) -> Box<dyn Notifier> {
        Box::new(Recording {
            name,
            sent: Arc::clone(sent),
            fail,
        })
    }

    #[tokio::test]
    async fn test_dispatch_in_order() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = NotificationDispatcher::new(vec![
            recording("Desktop", &sent, false),
            recording("Email", &sent, false),
        ]);

        let delivered = dispatcher.dispatch("It will Monday (-5COLD)").await.unwrap();

        assert_eq!(delivered, vec!["Desktop", "Email"]);
        assert_eq!(
            *sent.lock().unwrap(),
            vec![
                "Desktop:It will Monday (-5COLD)".to_string(),
                "Email:It will Monday (-5COLD)".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_dispatch_stops_at_first_failure() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = NotificationDispatcher::new(vec![
            recording("Email", &sent, true),
            recording("Discord", &sent, false),
        ]);

        let err = dispatcher.dispatch("alert").await.unwrap_err();

        assert!(err.to_string().contains("Email notification failed"));
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_desktop_popup_does_not_block_later_channels() {
        fn no_daemon(_: &str, _: &str, _: u32) -> std::result::Result<(), String> {
            Err("org.freedesktop.Notifications was not provided".to_string())
        }

        let sent = Arc::new(Mutex::new(Vec::new()));
        let desktop = DesktopNotifier::with_backend(&DesktopConfig::default(), no_daemon);
        let dispatcher =
            NotificationDispatcher::new(vec![Box::new(desktop), recording("Email", &sent, false)]);

        let delivered = dispatcher.dispatch("It will Friday (60RAIN)").await.unwrap();

        assert_eq!(delivered, vec!["Desktop", "Email"]);
        assert_eq!(
            *sent.lock().unwrap(),
            vec!["Email:It will Friday (60RAIN)".to_string()]
        );
    }

    #[tokio::test]
    async fn test_no_channels_prints_and_succeeds() {
        let dispatcher = NotificationDispatcher::default();
        assert!(dispatcher.is_empty());
        assert!(dispatcher.dispatch("alert").await.unwrap().is_empty());
    }

    #[test]
    fn test_from_config_respects_enable_flags() {
        let mut config = NotificationsConfig::default();
        config.email.enabled = false;
        config.discord.enabled = false;

        let dispatcher = NotificationDispatcher::from_config(&config, Client::new()).unwrap();
        assert_eq!(dispatcher.channels(), vec!["Desktop"]);
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let mut config = NotificationsConfig::default();
        config.desktop.enabled = false;
        config.email.enabled = false;

        assert!(NotificationDispatcher::from_config(&config, Client::new()).is_err());
    }
}
