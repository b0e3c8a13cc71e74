use std::sync::Arc;

use anyhow::Result;
use api::{
    AppState,
    config::ServerConfig,
    create_router,
    jwt::{JwtConfig, JwtService},
    password::PasswordService,
    repositories::{PgHealthProbe, PgSloganRepository, PgUserRepository},
};
use common::database::{DatabaseConfig, connect_with_retry};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting API service");

    let jwt_config = JwtConfig::from_env()?;
    let server_config = ServerConfig::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = connect_with_retry(&db_config).await?;

    let app_state = AppState {
        user_repository: Arc::new(PgUserRepository::new(pool.clone())),
        slogan_repository: Arc::new(PgSloganRepository::new(pool.clone())),
        health_probe: Arc::new(PgHealthProbe::new(pool)),
        jwt_service: JwtService::new(jwt_config),
        password_service: PasswordService::new()?,
    };

    let app = create_router(app_state);

    let address = server_config.address();
    let listener = TcpListener::bind(&address).await?;
    info!("API service listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("Received Ctrl+C, shutting down"),
        _ = terminate => warn!("Received SIGTERM, shutting down"),
    }
}
