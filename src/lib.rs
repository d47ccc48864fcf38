//! Portal server - client, vendor and staff onboarding with deliverable review

pub mod config;
pub mod deliverable;
pub mod error;
pub mod invitation;
pub mod mailer;
pub mod models;
pub mod routes;
pub mod store;

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config::InviteSettings;
use crate::mailer::Mailer;

/// Application state shared across handlers
pub struct AppState {
    pub store: store::Store,
    pub mailer: Mailer,
    pub invites: InviteSettings,
}

impl AppState {
    /// State with default invite settings and a log-only mailer
    pub fn new(pool: SqlitePool) -> Arc<Self> {
        Self::with_mailer(pool, Mailer::log("no-reply@localhost"), InviteSettings::default())
    }

    pub fn with_mailer(pool: SqlitePool, mailer: Mailer, invites: InviteSettings) -> Arc<Self> {
        Arc::new(Self {
            store: store::Store::new(pool),
            mailer,
            invites,
        })
    }
}

/// Build the HTTP application
pub fn app(state: Arc<AppState>) -> axum::Router {
    routes::router(state)
}
