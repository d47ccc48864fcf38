//! Server configuration from flags and environment

use clap::Parser;

use crate::mailer::{HttpMailer, Mailer};

/// Portal server
#[derive(Debug, Clone, Parser)]
#[command(name = "portal")]
#[command(about = "Portal server - client, vendor and staff onboarding with deliverable review")]
#[command(version)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "PORTAL_BIND", default_value = "0.0.0.0:3000")]
    pub bind: String,

    /// SQLite connection string
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:portal.db?mode=rwc")]
    pub database_url: String,

    /// Upper bound on pooled SQLite connections
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Base URL magic links point at
    #[arg(long, env = "PUBLIC_BASE_URL", default_value = "http://localhost:3000")]
    pub public_base_url: String,

    /// Invitation lifetime when a request does not give one (7 days, at most 30)
    #[arg(
        long,
        env = "INVITE_TTL_MINUTES",
        default_value_t = 10080,
        value_parser = clap::value_parser!(i64).range(1..=43200)
    )]
    pub invite_ttl_minutes: i64,

    /// Mail relay endpoint; links are only logged when unset
    #[arg(long, env = "MAILER_URL")]
    pub mailer_url: Option<String>,

    /// Bearer token sent to the mail relay
    #[arg(long, env = "MAILER_KEY", hide_env_values = true)]
    pub mailer_key: Option<String>,

    #[arg(long, env = "MAIL_FROM", default_value = "no-reply@localhost")]
    pub mail_from: String,
}

impl Config {
    pub fn invite_settings(&self) -> InviteSettings {
        InviteSettings {
            public_base_url: self.public_base_url.clone(),
            default_ttl_minutes: self.invite_ttl_minutes,
        }
    }

    pub fn mailer(&self) -> Mailer {
        match &self.mailer_url {
            Some(url) => Mailer::Http(HttpMailer::new(
                url.clone(),
                self.mailer_key.clone(),
                self.mail_from.clone(),
            )),
            None => Mailer::Log {
                from: self.mail_from.clone(),
            },
        }
    }
}

/// Settings the invitation flow needs at request time
#[derive(Debug, Clone)]
pub struct InviteSettings {
    pub public_base_url: String,
    pub default_ttl_minutes: i64,
}

impl Default for InviteSettings {
    fn default() -> Self {
        Self {
            public_base_url: "http://localhost:3000".to_string(),
            default_ttl_minutes: 7 * 24 * 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let config = Config::try_parse_from([
            "portal",
            "--invite-ttl-minutes",
            "60",
            "--public-base-url",
            "https://portal.example.com",
        ])
        .unwrap();
        let settings = config.invite_settings();
        assert_eq!(settings.default_ttl_minutes, 60);
        assert_eq!(settings.public_base_url, "https://portal.example.com");
    }

    #[test]
    fn test_invite_ttl_out_of_range_is_rejected() {
        assert!(Config::try_parse_from(["portal", "--invite-ttl-minutes", "0"]).is_err());
        assert!(Config::try_parse_from(["portal", "--invite-ttl-minutes", "43201"]).is_err());

        let config = Config::try_parse_from(["portal", "--invite-ttl-minutes", "43200"]).unwrap();
        assert_eq!(config.invite_ttl_minutes, 43200);
    }

    #[test]
    fn test_mailer_url_selects_http_mailer() {
        let config = Config::try_parse_from([
            "portal",
            "--mailer-url",
            "http://mail.internal",
            "--mail-from",
            "ops@example.com",
        ])
        .unwrap();
        assert_eq!(config.mailer().provider(), "http");
    }

    #[test]
    fn test_default_invite_settings() {
        let settings = InviteSettings::default();
        assert_eq!(settings.default_ttl_minutes, 10080);
    }
}
