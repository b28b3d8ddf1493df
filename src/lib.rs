use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    routing::{any, get},
};
use std::sync::Arc;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Client side: API gateway, session and navigation.
pub mod api;
pub mod guard;
pub mod navigation;
pub mod routes;
pub mod session;

// Offline backend: fixture registry and the HTTP surface of the mock server.
pub mod handlers;
pub mod mock;

// Shared foundations.
pub mod auth;
pub mod config;
pub mod error;
pub mod models;

// --- Public Re-exports ---

pub use api::{ApiClient, RequestOptions};
pub use config::AppConfig;
pub use error::{ApiError, ApiResult, NavigationError};
pub use guard::{GuardDecision, RouteGuard};
pub use mock::MockRegistry;
pub use navigation::{NavigationOutcome, Navigator};
pub use session::{Role, Session, SessionStore};

/// RegistryState
///
/// The fixture registry as shared by the mock server. Read-only once built.
pub type RegistryState = Arc<MockRegistry>;

/// AppState
///
/// State of the development mock server: the dispatch table and the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    pub registry: RegistryState,
    pub config: AppConfig,
}

impl AppState {
    /// Seeded fixture registry signed with the configured mock token secret.
    pub fn from_config(config: AppConfig) -> Self {
        let registry = Arc::new(MockRegistry::with_fixtures(&config.mock_token_secret));
        Self { registry, config }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RegistryState {
    fn from_ref(app_state: &AppState) -> RegistryState {
        app_state.registry.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Mock server routes: `/health`, and every method and path under the API base path
/// forwarded to the registry. Wrapped in request-id, tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let api_routes = Router::new().route("/{*path}", any(handlers::dispatch));
    let base_path = state.config.api_base_path.clone();

    let router = Router::new().route("/health", get(handlers::health));
    let router = if base_path.is_empty() {
        router.merge(api_routes)
    } else {
        router.nest(&base_path, api_routes)
    };

    router
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// One span per request, tagged with the `x-request-id` set by `SetRequestIdLayer`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
