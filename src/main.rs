use axum::{
    routing::{get, post},
    Router,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use pesalog::api::{self, ApiState};
use pesalog::config::AppConfig;
use pesalog::database::{init_pool_from_config, intent_repository::IntentRepository};
use pesalog::health::HealthChecker;
use pesalog::logging::init_tracing;
use pesalog::middleware::logging::{request_logging_middleware, UuidRequestId};
use pesalog::services::reconciler::Reconciler;

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    config.validate()?;

    init_tracing(&config.logging);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "🚀 Starting pesalog service"
    );

    info!("📊 Initializing database connection pool...");
    let db_pool = init_pool_from_config(&config.database).await.map_err(|e| {
        error!("Failed to initialize database pool: {}", e);
        anyhow::anyhow!(e)
    })?;

    sqlx::migrate!().run(&db_pool).await?;
    info!("✅ Database ready, migrations applied");

    let store = Arc::new(IntentRepository::new(db_pool.clone()));
    let reconciler = Arc::new(Reconciler::new(
        store,
        Duration::from_secs(config.database.operation_timeout),
    ));

    let state = ApiState {
        reconciler,
        health: HealthChecker::new(db_pool),
    };

    let app = Router::new()
        .route("/health", get(api::health))
        .route("/api/stk/initiations", post(api::intents::log_initiation))
        .route("/api/stk/callback", post(api::callbacks::stk_callback))
        .route("/api/stk/intents", get(api::intents::list_intents))
        .route(
            "/api/stk/intents/{checkout_request_id}",
            get(api::intents::get_intent),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(axum::middleware::from_fn(request_logging_middleware)),
        )
        .with_state(state);

    let host: IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "✅ pesalog listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
