use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::{
    Message, Transport, message::Mailbox, transport::smtp::SmtpTransport,
    transport::smtp::authentication::Credentials,
};
use tokio::task;

use super::Notifier;
use crate::WeatherAlertError;
use crate::config::EmailConfig;

/// Email alert sent through an authenticated SMTP relay
pub struct EmailNotifier {
    sender: Mailbox,
    recipient: Mailbox,
    subject: String,
    mailer: SmtpTransport,
}

fn required<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            WeatherAlertError::config(format!("Missing notifications.email.{key}")).into()
        })
}

impl EmailNotifier {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let sender_address = required(&config.sender, "sender")?;
        let password = required(&config.password, "password")?;
        let recipient = required(&config.recipient, "recipient")?;

        let sender: Mailbox = format!("Weather Alert <{sender_address}>")
            .parse()
            .context("Failed to parse sender address")?;
        let recipient: Mailbox = recipient
            .parse()
            .context("Failed to parse recipient address")?;

        let credentials = Credentials::new(sender_address.to_string(), password.to_string());
        let mailer = SmtpTransport::relay(&config.smtp_relay)
            .with_context(|| format!("Invalid SMTP relay {}", config.smtp_relay))?
            .credentials(credentials)
            .build();

        Ok(Self {
            sender,
            recipient,
            subject: config.subject.clone(),
            mailer,
        })
    }

    fn build_message(&self, alert: &str) -> Result<Message> {
        Message::builder()
            .from(self.sender.clone())
            .to(self.recipient.clone())
            .subject(self.subject.clone())
            .body(alert.to_string())
            .context("Failed to build alert email")
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &'static str {
        "Email"
    }

    async fn send(&self, alert: &str) -> Result<()> {
        let email = self.build_message(alert)?;
        let mailer = self.mailer.clone();

        task::spawn_blocking(move || mailer.send(&email))
            .await?
            .map_err(|e| WeatherAlertError::notification("Email", e.to_string()))?;

        tracing::info!("Sent weather alert email to {}", self.recipient);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmailConfig {
        EmailConfig {
            sender: Some("bot@example.com".to_string()),
            password: Some("app-password".to_string()),
            recipient: Some("me@example.com".to_string()),
            ..EmailConfig::default()
        }
    }

    #[test]
    fn test_builds_message_with_subject() {
        let notifier = EmailNotifier::new(&config()).unwrap();
        let message = notifier.build_message("It will Monday (-5COLD)").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: Weather Alert"));
        assert!(raw.contains("To: me@example.com"));
        assert!(raw.contains("It will Monday (-5COLD)"));
    }

    #[test]
    fn test_invalid_recipient_is_rejected() {
        let mut config = config();
        config.recipient = Some("not an address".to_string());
        assert!(EmailNotifier::new(&config).is_err());
    }

    #[test]
    fn test_missing_password_is_config_error() {
        let mut config = config();
        config.password = None;
        let err = EmailNotifier::new(&config).err().unwrap();
        assert!(err.to_string().contains("notifications.email.password"));
    }
}
