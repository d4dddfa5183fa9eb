use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use alms_api::config::ServerConfig;
use alms_api::router::build_app_router;
use alms_api::state::AppState;
use alms_events::{
    ActivityLogger, EmailConfig, EventBus, LogMailer, Mailer, NotificationDispatcher, SmtpMailer,
};
use alms_gateway::PaystackClient;
use alms_storage::{SignedUrlCache, StorageClient};

/// How often stale signed URLs are dropped from the cache.
const SIGNED_URL_PURGE_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alms_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = alms_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    alms_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    alms_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Payment gateway ---
    let gateway = PaystackClient::new(
        &config.payment.base_url,
        &config.payment.secret_key,
        Duration::from_secs(config.payment.timeout_secs),
    )
    .expect("Failed to build payment gateway client");
    tracing::info!(base_url = %config.payment.base_url, "Payment gateway client created");

    // --- Object storage ---
    let storage = StorageClient::new(
        &config.storage.url,
        &config.storage.service_key,
        Duration::from_secs(config.storage.timeout_secs),
    )
    .expect("Failed to build storage client");
    let signed_urls = Arc::new(SignedUrlCache::new(
        Arc::new(storage),
        Duration::from_secs(config.storage.signed_url_ttl_secs),
        Duration::from_secs(config.storage.refresh_margin_secs),
    ));

    // --- Email ---
    let mailer: Arc<dyn Mailer> = match EmailConfig::from_env() {
        Some(email_config) => {
            tracing::info!(host = %email_config.smtp_host, "SMTP mailer configured");
            Arc::new(SmtpMailer::new(&email_config).expect("Failed to build SMTP mailer"))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, outgoing email will only be logged");
            Arc::new(LogMailer)
        }
    };

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    // Spawn activity logging (writes every event to the database).
    let logger_handle = tokio::spawn(ActivityLogger::run(pool.clone(), event_bus.subscribe()));

    // Spawn the notification dispatcher (receipts, acknowledgements, decisions).
    let dispatcher = NotificationDispatcher::new(Arc::clone(&mailer), config.site_url.clone());
    let dispatcher_handle = tokio::spawn(dispatcher.run(event_bus.subscribe()));

    // Periodically drop expired signed URLs.
    let purge_cancel = CancellationToken::new();
    let purge_handle = tokio::spawn(purge_signed_urls(
        Arc::clone(&signed_urls),
        purge_cancel.clone(),
    ));

    tracing::info!("Event services started (activity log, notifications, signed URL purge)");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        gateway: Arc::new(gateway),
        signed_urls,
        mailer,
        event_bus: Arc::clone(&event_bus),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    purge_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), purge_handle).await;

    // Dropping the last sender closes the broadcast channel, which ends the
    // logger and dispatcher loops once they drain.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), logger_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await;
    tracing::info!("Event services shut down");

    tracing::info!("Graceful shutdown complete");
}

async fn purge_signed_urls(cache: Arc<SignedUrlCache>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(SIGNED_URL_PURGE_INTERVAL);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                let removed = cache.purge_expired().await;
                if removed > 0 {
                    tracing::debug!(removed, "Purged expired signed URLs");
                }
            }
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
