//! Kala Connect storefront - shopper storefront, seller dashboard and
//! content generation API.
//!
//! This binary serves the JSON API on port 3000.
//!
//! # Architecture
//!
//! - Axum JSON API, sessions via tower-sessions
//! - Gemini for listings, captions, stories, forecasts, designs and speech
//! - `PostgreSQL` for snapshots, shared carts and sessions when
//!   `KALA_DATABASE_URL` is set; in-memory storage otherwise (demo mode)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use kala_connect_storefront::ai::GeminiClient;
use kala_connect_storefront::config::StorefrontConfig;
use kala_connect_storefront::middleware::create_session_layer;
use kala_connect_storefront::state::{AppState, Backends};
use kala_connect_storefront::{build_router, db};
use sentry::integrations::tracing as sentry_tracing;
use tower_sessions::MemoryStore;
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Start Sentry when a DSN is configured. Events stop when the guard drops.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config.sentry_environment.clone().map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!(environment = ?config.sentry_environment, "sentry enabled");
    Some(guard)
}

/// Warnings and errors become Sentry events, info and debug become breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let config = StorefrontConfig::from_env().expect("invalid storefront configuration");

    // Sentry before the subscriber so its layer has a client to report to
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let model = GeminiClient::new(&config.gemini).expect("cannot build Gemini client");

    // Schema changes go through `kala-connect-cli migrate`, never here
    let app = if let Some(database_url) = &config.database_url {
        let pool = db::create_pool(database_url)
            .await
            .expect("cannot connect to PostgreSQL");
        tracing::info!("connected to PostgreSQL");

        let backends = Backends::postgres(pool.clone())
            .await
            .expect("cannot listen for shared cart changes");
        let state = AppState::new(backends, Arc::new(model));
        let session_layer = create_session_layer(PostgresStore::new(pool), config.is_secure());
        build_router(state, session_layer)
    } else {
        tracing::warn!("no database configured; demo mode with in-memory storage");
        let state = AppState::new(Backends::memory(), Arc::new(model));
        let session_layer = create_session_layer(MemoryStore::default(), config.is_secure());
        build_router(state, session_layer)
    };

    // Outermost, so every request gets a hub and a transaction
    let app = app
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!("storefront listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("cannot bind {addr}: {e}"));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("storefront server failed");
}

/// Text logs locally, flattened JSON on Fly.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kala_connect_storefront=info,tower_http=debug".into());

    let on_fly = std::env::var_os("FLY_APP_NAME").is_some();
    let json_layer = on_fly.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!on_fly).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutting down, draining open requests");
}
