use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Local;
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scheduling_cell::SchedulingSession;
use shared_api::PortalClient;
use shared_config::PortalConfig;
use shared_models::SessionContext;

/// Dev harness: starts a scheduling session against a live portal API and
/// logs a one-shot summary of what the UI would render.
#[tokio::main]
async fn main() -> Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting portal scheduling harness");

    let config = PortalConfig::from_env();
    if !config.is_configured() {
        bail!("PORTAL_API_URL must be set");
    }

    let token = match std::env::var("PORTAL_AUTH_TOKEN") {
        Ok(token) => token,
        Err(_) => bail!("PORTAL_AUTH_TOKEN must be set"),
    };

    let api = Arc::new(PortalClient::new(&config));
    let ctx = SessionContext::login(token, None);
    let today = Local::now().date_naive();

    let mut session = SchedulingSession::new(ctx, api, today);
    let notices = session.start().await?;
    for notice in &notices {
        warn!("startup notice: {}", notice.text);
    }

    if let Some(user) = session.user() {
        info!("signed in as user {} ({:?})", user.user_id, user.role);
    }
    info!(
        "{} facilities, {} providers loaded",
        session.facilities().len(),
        session.providers().len()
    );

    let now = chrono::Utc::now();
    for appointment in session.store().upcoming(now) {
        info!(
            "upcoming: {} {} at facility {} ({})",
            appointment.scheduled_start,
            appointment.appointment_type,
            appointment.facility_id,
            appointment.status
        );
    }
    info!(
        "{} notifications, {} unread (badge: {})",
        session.feed().notifications().len(),
        session.feed().unread_count(),
        session.feed().unread_badge()
    );

    Ok(())
}
