//! Outbound email
//!
//! Magic links leave the system through a mail relay reached over HTTP.
//! Without a relay configured the mailer only logs the recipient.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::invitation::Role;

/// Email handed to the relay
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Connection state reported on `/api/gmail/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerStatus {
    pub connected: bool,
    pub provider: String,
    pub from: String,
}

/// HTTP client for the mail relay
#[derive(Clone)]
pub struct HttpMailer {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, from: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            from: from.into(),
        }
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    pub async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let response = self
            .request(self.client.post(format!("{}/send", self.base_url)))
            .json(email)
            .send()
            .await
            .map_err(|e| AppError::Mailer(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Mailer(format!(
                "Failed to send email: {} - {}",
                status, text
            )));
        }

        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        match self
            .request(self.client.get(format!("{}/status", self.base_url)))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!("Mail relay unreachable: {}", e);
                false
            }
        }
    }
}

#[derive(Clone)]
pub enum Mailer {
    Http(HttpMailer),
    /// Logs instead of sending
    Log { from: String },
}

impl Mailer {
    pub fn log(from: impl Into<String>) -> Self {
        Mailer::Log { from: from.into() }
    }

    pub fn provider(&self) -> &'static str {
        match self {
            Mailer::Http(_) => "http",
            Mailer::Log { .. } => "log",
        }
    }

    pub fn from_address(&self) -> &str {
        match self {
            Mailer::Http(mailer) => &mailer.from,
            Mailer::Log { from } => from,
        }
    }

    pub async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        match self {
            Mailer::Http(mailer) => mailer.send(email).await,
            Mailer::Log { .. } => {
                tracing::info!(to = %email.to, subject = %email.subject, "Email not sent, no mail relay configured");
                Ok(())
            }
        }
    }

    pub async fn status(&self) -> MailerStatus {
        let connected = match self {
            Mailer::Http(mailer) => mailer.is_connected().await,
            Mailer::Log { .. } => false,
        };
        MailerStatus {
            connected,
            provider: self.provider().to_string(),
            from: self.from_address().to_string(),
        }
    }

    /// Send the magic link for an invitation
    pub async fn send_invitation(
        &self,
        to: &str,
        role: Role,
        link: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let email = invitation_email(self.from_address(), to, role, link, expires_at);
        self.send(&email).await
    }
}

pub fn invitation_email(
    from: &str,
    to: &str,
    role: Role,
    link: &str,
    expires_at: DateTime<Utc>,
) -> OutgoingEmail {
    OutgoingEmail {
        from: from.to_string(),
        to: to.to_string(),
        subject: "You're invited to the portal".to_string(),
        text: format!(
            "You have been invited to join as {}.\n\nOpen this link to accept:\n{}\n\nThe link can be used once and expires {}.",
            role.label(),
            link,
            expires_at.format("%Y-%m-%d %H:%M UTC")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invitation_email_contains_link() {
        let expires_at = "2026-03-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let email = invitation_email(
            "ops@example.com",
            "jane@example.com",
            Role::ClientAdmin,
            "http://localhost:3000/invite/abc",
            expires_at,
        );
        assert_eq!(email.to, "jane@example.com");
        assert!(email.text.contains("http://localhost:3000/invite/abc"));
        assert!(email.text.contains("Client Admin"));
        assert!(email.text.contains("2026-03-01 12:00 UTC"));
    }

    #[tokio::test]
    async fn test_log_mailer_never_fails() {
        let mailer = Mailer::log("ops@example.com");
        let email = invitation_email(
            mailer.from_address(),
            "jane@example.com",
            Role::Vendor,
            "link",
            Utc::now(),
        );
        assert!(mailer.send(&email).await.is_ok());
    }

    #[tokio::test]
    async fn test_log_mailer_status() {
        let status = Mailer::log("ops@example.com").status().await;
        assert!(!status.connected);
        assert_eq!(status.provider, "log");
        assert_eq!(status.from, "ops@example.com");
    }
}
