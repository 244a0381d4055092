use std::{sync::Arc, time::Duration};

use snipsy::{config::AppConfig, router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (ignore error if file is absent — env vars may already be set)
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snipsy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("Starting snipsy on {}:{}", config.host, config.port);
    tracing::info!("Base URL: {}", config.base_url);

    let bind_addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::new(config));

    // Expired sessions are otherwise only dropped once the store fills up
    let pruner = state.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(300));
        loop {
            tick.tick().await;
            let pruned = pruner.sessions.prune_expired();
            if pruned > 0 {
                tracing::info!("Pruned {} expired session(s)", pruned);
            }
        }
    });

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
