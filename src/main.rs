use mindcare_portal::{
    AppState,
    config::{AppConfig, Env},
    create_router,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Development mock server: serves the fixture registry over HTTP so the client (or a
/// browser build) can run without the real backend.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mindcare_portal=debug,tower_http=info,axum=trace".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Mock server starting in {:?} mode", config.env);
    if config.env == Env::Production {
        tracing::warn!("Serving fixture data with APP_ENV=production; clients will not use it");
    }

    // 4. Fixture Registry
    let addr = config.mock_server_addr.clone();
    let base_path = config.api_base_path.clone();
    let state = AppState::from_config(config);
    tracing::info!("{} mock endpoints registered", state.registry.len());

    // 5. Router and Server Startup
    let app = create_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .expect("FATAL: Failed to bind MOCK_SERVER_ADDR.");

    tracing::info!("Listening on {} (API under {})", addr, base_path);

    axum::serve(listener, app)
        .await
        .expect("FATAL: Mock server terminated unexpectedly.");
}
