use anyhow::Context;
use tracing::{info, warn};

use crate::app::app;
use crate::auth::bootstrap::ensure_admin;
use crate::config::config;
use crate::is_production;
use crate::state::AppState;

pub async fn handle(port: Option<u16>) -> anyhow::Result<()> {
    let config = config();
    info!("Starting LuxeHaven in {:?} mode", config.environment);

    if is_production!() && config.payments.provider_url.is_none() && config.payments.simulate_transfers {
        warn!("PAYMENT_SIMULATE_TRANSFERS is set in production; no funds will move");
    }

    let state = AppState::from_config(config).await?;

    if let (Some(email), Some(password)) = (&config.security.admin_email, &config.security.admin_password) {
        ensure_admin(state.store.as_ref(), email, password, "Administrator", config.security.bcrypt_cost)
            .await
            .context("admin bootstrap failed")?;
    }

    let router = app(state, config);

    let bind_addr = format!("0.0.0.0:{}", port.unwrap_or(config.server.port));
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("LuxeHaven listening on http://{}", bind_addr);
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
