// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Teamsheet client core
//!
//! Loads configuration from the environment, opens the local store and
//! reports the persisted session and navigation state. When signed in, it
//! also pulls events, teams and registrations from the remote service.

use teamsheet::{config::Config, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        api = %config.api_base_url,
        data_dir = %config.data_dir.display(),
        "Starting teamsheet"
    );

    let state = AppState::open(config).await?;

    let healthy = state.api.health_check().await;
    tracing::info!(healthy, "Remote service checked");

    let session = state.session.load_session().await;
    let breadcrumbs = state.navigation.breadcrumbs().await;
    tracing::info!(
        authenticated = session.is_authenticated,
        username = session.user.as_ref().map(|u| u.username.as_str()),
        breadcrumbs = %breadcrumbs,
        "Session loaded"
    );

    if !session.is_authenticated {
        return Ok(());
    }

    let events = state.sync.get_events().await?;
    let teams = state.sync.get_teams().await?;
    let registrations = state.sync.get_registrations().await?;
    tracing::info!(
        events = events.len(),
        teams = teams.len(),
        registrations = registrations.len(),
        "Sync complete"
    );

    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("teamsheet=debug,info")),
        )
        .with(format)
        .init();
}
