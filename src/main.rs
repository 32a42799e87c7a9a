mod admin;
mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod notifier;
mod repository;
mod turnstile;
mod validation;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::notifier::Notifier;
use crate::turnstile::TurnstileClient;

/// Build the CORS layer from the configured origin allow-list.
///
/// An empty list falls back to a permissive (wildcard) policy so local and
/// preview deployments work without extra configuration.
fn cors_layer(config: &Config) -> CorsLayer {
    if config.allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring unparseable CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-api-key"),
        ])
        .max_age(Duration::from_secs(86400))
}

/// Main entry point for the application.
///
/// Initializes logging, configuration, the database pool, the Turnstile
/// client, and the startup-selected notification provider, then serves the
/// Axum router.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "interest_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database connection pool
    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    // Initialize the Turnstile verification client
    let turnstile = TurnstileClient::new(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize Turnstile client: {}", e))?;

    // Select the notification provider once, from configuration
    let notifier = match Notifier::from_config(&config) {
        Ok(notifier) => Arc::new(notifier),
        Err(e) => {
            tracing::error!("Failed to initialize notifier, notifications disabled: {}", e);
            Arc::new(Notifier::Disabled)
        }
    };

    let cors = cors_layer(&config);

    // Build application state
    let app_state = Arc::new(handlers::AppState {
        db: db.pool.clone(),
        config: config.clone(),
        turnstile,
        notifier,
    });

    // API routes with a request size limit; form submissions are small
    let api_routes = Router::new()
        .route("/api/interest", post(handlers::submit_interest))
        .route("/api/admin/submissions", get(admin::list_submissions))
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(1024 * 1024)));

    // Build final app with health check
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(api_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
