//! Snippetbox: a small web application for sharing text snippets

use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod csrf;
mod error;
mod forms;
mod middleware;
mod models;
mod password;
mod repositories;
mod routes;
mod session;
mod state;
mod templates;
mod validation;

use common::database;

use crate::{
    config::Settings,
    repositories::{PgSnippetRepository, PgUserRepository},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting snippetbox");

    let settings = Settings::load()?;

    // Initialize database connection pool
    let pool = database::init_pool(&settings.database).await?;
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }
    database::migrate(&pool).await?;

    let session_store = PostgresStore::new(pool.clone());
    session_store.migrate().await?;
    let sessions = session::layer(session_store, &settings.session);

    let state = AppState::new(
        Arc::new(PgSnippetRepository::new(pool.clone())),
        Arc::new(PgUserRepository::new(pool)),
    );

    let app = routes::create_router(state, sessions, &settings.server);

    let listener = TcpListener::bind(&settings.server.addr).await?;
    info!("Snippetbox listening on {}", settings.server.addr);

    axum::serve(listener, app).await?;

    Ok(())
}
