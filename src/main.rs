//! FlowShield server binary

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flowshield::logic::model::ModelState;
use flowshield::{create_router, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "flowshield=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();

    tracing::info!("FlowShield starting...");
    tracing::info!(
        "Idle threshold: {} µs, prediction threshold: {}, debug: {}",
        config.idle_threshold_us,
        config.prediction_threshold,
        config.debug_mode
    );

    // A failed load keeps the server up; /predict answers 503 until restart.
    let model = ModelState::load(&config.model_path);

    let addr = config.bind_addr();
    let app = create_router(AppState::new(config, model));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
