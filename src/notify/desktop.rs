use anyhow::Result;
use async_trait::async_trait;
use notify_rust::{Notification, Timeout};
use tokio::task;
use tracing::warn;

use super::Notifier;
use crate::config::DesktopConfig;

/// Shows one popup: title, body and timeout in milliseconds
type ShowPopup = fn(&str, &str, u32) -> std::result::Result<(), String>;

/// Desktop popup through the platform notification service.
///
/// Fire-and-forget: a missing or failing notification daemon is logged and
/// never stops the remaining channels.
pub struct DesktopNotifier {
    title: String,
    timeout_ms: u32,
    show: ShowPopup,
}

fn show_popup(title: &str, body: &str, timeout_ms: u32) -> std::result::Result<(), String> {
    Notification::new()
        .summary(title)
        .body(body)
        .timeout(Timeout::Milliseconds(timeout_ms))
        .show()
        .map(|_| ())
        .map_err(|e| e.to_string())
}

impl DesktopNotifier {
    #[must_use]
    pub fn new(config: &DesktopConfig) -> Self {
        Self::with_backend(config, show_popup)
    }

    pub(crate) fn with_backend(config: &DesktopConfig, show: ShowPopup) -> Self {
        Self {
            title: config.title.clone(),
            timeout_ms: config.timeout_ms,
            show,
        }
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    fn name(&self) -> &'static str {
        "Desktop"
    }

    async fn send(&self, alert: &str) -> Result<()> {
        let title = self.title.clone();
        let body = alert.to_string();
        let timeout_ms = self.timeout_ms;
        let show = self.show;

        // Talks to the notification daemon synchronously
        match task::spawn_blocking(move || show(&title, &body, timeout_ms)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Desktop notification not shown: {}", e),
            Err(e) => warn!("Desktop notification task failed: {}", e),
        }

        Ok(())
    }
}
