use agrisense::{
    api::{build_router, AppState},
    auth::{bootstrap_admin, CredentialStore, SessionManager, SledCredentialStore},
    config::Config,
    logging,
    ml::ModelCache,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    // Initialize tracing
    logging::init_tracing(&config.observability);

    tracing::info!("Starting Agrisense v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = agrisense::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
            tracing::warn!("Continuing without metrics");
        } else {
            tracing::info!("✅ Prometheus metrics initialized");
        }
    } else {
        tracing::info!("⚠️  Prometheus metrics disabled in configuration");
    }

    // Credential store
    let store = SledCredentialStore::open(&config.auth.db_path, config.auth.hash_iterations)?;
    if let Some(admin) = &config.auth.bootstrap_admin {
        let password = std::env::var(&config.auth.bootstrap_password_env).ok();
        match bootstrap_admin(&store, admin, password.as_deref()) {
            Ok(true) => {}
            Ok(false) => tracing::debug!("Credential store already populated"),
            Err(e) => tracing::warn!("⚠️  Could not bootstrap '{}': {}", admin, e),
        }
    }
    let users = store.user_count()?;
    if users == 0 {
        tracing::warn!("⚠️  No users registered; nobody can log in");
    }
    tracing::info!("✅ Credential store ready ({} users)", users);

    // Model artifact, loaded once and shared
    let model = Arc::new(ModelCache::new(&config.data.model_path));
    if model.preload() {
        tracing::info!("✅ Model loaded from {}", config.data.model_path.display());
    } else {
        tracing::warn!("⚠️  Serving rule-based recommendations only");
    }

    let state = AppState::new(
        Arc::new(store),
        SessionManager::new(config.auth.session_ttl()),
        model,
        config.data.history_path.clone(),
    );
    let sessions = state.sessions.clone();
    let app = build_router(state);

    // Drop expired sessions periodically
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired();
            if purged > 0 {
                tracing::debug!("Purged {} expired sessions", purged);
            }
        }
    });

    // Start HTTP server
    let http_addr = config.bind_address();
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("🚀 HTTP API server listening on http://{}", http_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(http_listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received");
            }
        })
        .await?;

    tracing::info!("👋 Agrisense stopped");
    Ok(())
}
