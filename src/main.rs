use std::sync::Arc;

use account_service::app;
use account_service::config::{AppConfig, StoreBackend};
use account_service::logging::{init_logging, LoggingConfig};
use account_service::services::account_service::AccountService;
use account_service::services::audit::{AuditSink, HttpAuditSink, NoopAuditSink};
use account_service::state::AppState;
use account_service::store::{AccountStore, InMemoryAccountStore, PgAccountStore};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())?;

    let config = AppConfig::from_env();
    config.validate()?;

    let store: Arc<dyn AccountStore> = match config.backend()? {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or("DATABASE_URL is required when STORE_BACKEND is postgres")?;
            let store = PgAccountStore::connect(database_url, config.max_connections()?).await?;
            store.migrate().await?;
            tracing::info!("Using Postgres account store");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory account store, data is lost on restart");
            Arc::new(InMemoryAccountStore::new())
        }
    };

    let audit: Arc<dyn AuditSink> = match config.audit_log_url.as_deref() {
        Some(url) => {
            let sink = HttpAuditSink::new(url, config.audit_timeout())?;
            tracing::info!("Audit events will be sent to {}", sink.endpoint());
            Arc::new(sink)
        }
        None => {
            tracing::info!("AUDIT_LOG_URL not set, audit logging disabled");
            Arc::new(NoopAuditSink)
        }
    };

    let state = AppState {
        accounts: AccountService::new(store, audit),
    };
    let app = app::create_app(state);

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Account service running at http://{}/", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
