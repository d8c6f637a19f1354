use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use roi_lead_api::config::Config;
use roi_lead_api::db::Database;
use roi_lead_api::handlers::AppState;
use roi_lead_api::router::build_router;
use roi_lead_api::session::SessionStore;

/// Main entry point for the application.
///
/// Initializes tracing, configuration, the database pool and schema, the
/// admin session cache and the HTTP router, then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    roi_lead_api::obs::init_tracing();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Initialize database connection pool
    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    db.initialize_schema().await?;

    // Admin sessions expire with the cookie
    let sessions = SessionStore::new(
        Duration::from_secs(config.session_ttl_secs),
        config.secure_cookies,
    );
    tracing::info!(
        "Admin session cache initialized ({}s TTL)",
        config.session_ttl_secs
    );

    let port = config.port;
    let app_state = Arc::new(AppState {
        db: db.pool.clone(),
        config,
        sessions,
    });

    let app = build_router(app_state)?;

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
