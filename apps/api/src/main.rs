mod config;
mod db;
mod errors;
mod models;
mod resume;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::resume::identity::PgIdentityProvider;
use crate::resume::persistence::{PgResumeStore, ResumeStore};
use crate::resume::render::HtmlPrintRenderer;
use crate::resume::session::{SessionFactory, SessionRegistry};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Builder API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    let store: Arc<dyn ResumeStore> = Arc::new(PgResumeStore::new(db.clone()));
    let identity = Arc::new(PgIdentityProvider::new(db));

    info!(
        "Export timings: print after {:?}, fallback {:?}, close {:?}; overwrite policy {:?}",
        config.export_timings.print_delay,
        config.export_timings.load_fallback,
        config.export_timings.close_delay,
        config.overwrite_policy
    );

    let state = AppState {
        config: config.clone(),
        store: store.clone(),
        identity,
        session_factory: SessionFactory {
            store,
            renderer: Arc::new(HtmlPrintRenderer),
            timings: config.export_timings,
            policy: config.overwrite_policy,
        },
        sessions: SessionRegistry::default(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
