use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use authgate_auth::cache::{MemorySessionCache, RedisSessionCache};
use authgate_auth::mailer::LogMailer;
use authgate_auth::password::Argon2Hasher;
use authgate_auth::ports::{MailDispatch, SessionCache};
use authgate_auth::store::PgStore;
use authgate_auth::TokenSigner;
use authgate_mail::EmailDelivery;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use authgate_api::background::session_cleanup;
use authgate_api::config::ServerConfig;
use authgate_api::router::build_app_router;
use authgate_api::state::{AppState, Collaborators};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "authgate_api=debug,authgate_auth=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let pool = authgate_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    authgate_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    authgate_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let store = PgStore::new(pool.clone());

    // --- Session cache ---
    let cache: Arc<dyn SessionCache> = match &config.redis_url {
        Some(url) => {
            let cache = RedisSessionCache::connect(url)
                .await
                .expect("Failed to connect to Redis");
            tracing::info!("Redis session cache connected");
            Arc::new(cache)
        }
        None => {
            tracing::warn!("REDIS_URL not set, using in-process session cache");
            Arc::new(MemorySessionCache::new())
        }
    };

    // --- Mail ---
    let mailer: Arc<dyn MailDispatch> = match config.email.clone() {
        Some(email_config) => {
            tracing::info!(smtp_host = %email_config.smtp_host, "SMTP delivery enabled");
            Arc::new(EmailDelivery::new(email_config))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, outbound email disabled");
            Arc::new(LogMailer)
        }
    };

    // --- Token signer ---
    let signer = Arc::new(
        TokenSigner::new(config.tokens.clone()).expect("Invalid token signing configuration"),
    );

    // --- Session cleanup ---
    let cleanup_cancel = CancellationToken::new();
    let cleanup_handle = tokio::spawn(session_cleanup::run(
        store.clone(),
        Duration::from_secs(config.session_cleanup_interval_secs),
        config.session_retention_days,
        cleanup_cancel.clone(),
    ));

    // --- App state ---
    let store = Arc::new(store);
    let deps = Collaborators {
        users: store.clone(),
        sessions: store.clone(),
        tokens: store,
        cache,
        hasher: Arc::new(Argon2Hasher),
        mailer,
    };
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let state = AppState::new(config, signer, deps, Some(pool));

    // --- Router ---
    let app = build_app_router(state);

    // --- Start server ---
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

    cleanup_cancel.cancel();
    let _ = tokio::time::timeout(shutdown_timeout, cleanup_handle).await;
    tracing::info!("Session cleanup job stopped");

    tracing::info!("Graceful shutdown complete");
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
