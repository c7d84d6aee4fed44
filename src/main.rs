mod categories;
mod config;
mod db;
mod entities;
mod error;
mod models;
mod routes;
mod storage;
mod templates;
mod tmdb;
mod watchlist;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::sync::Mutex;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    storage::SqliteStorage,
    tmdb::{Credentials, TmdbClient},
    watchlist::WatchlistStore,
};

pub struct AppState {
    pub tmdb: TmdbClient,
    /// Serializes watchlist mutations so each request observes the previous one.
    pub watchlist: Mutex<WatchlistStore<SqliteStorage>>,
}

impl AppState {
    pub fn new(tmdb: TmdbClient, watchlist: WatchlistStore<SqliteStorage>) -> Self {
        Self { tmdb, watchlist: Mutex::new(watchlist) }
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/search", get(routes::search))
        .route("/categories", get(routes::categories))
        .route("/category/{slug}", get(routes::category))
        .route("/movie/{id}", get(routes::movie))
        .route("/watchlist", get(routes::watchlist))
        .route("/watchlist/add", post(routes::add_to_watchlist))
        .route("/watchlist/remove", post(routes::remove_from_watchlist))
        .route("/watchlist/clear", post(routes::clear_watchlist))
        .route("/watchlist/events", get(routes::watchlist_events))
        .route("/static/{file}", get(routes::static_file))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,moviesadda=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let http = reqwest::Client::builder()
        .user_agent("moviesadda/0.1")
        .timeout(config.http_timeout)
        .build()?;

    let db = db::connect_and_migrate(&config.database_url).await?;
    let watchlist = WatchlistStore::hydrate(SqliteStorage::new(db)).await?;
    tracing::info!(saved = watchlist.len(), "watchlist ready");

    let tmdb = TmdbClient::new(
        http,
        Credentials::from_parts(&config.tmdb_access_token, &config.tmdb_api_key),
        config.tmdb_base_url.clone(),
        config.tmdb_language.clone(),
        config.tmdb_rps,
    );

    let state = Arc::new(AppState::new(tmdb, watchlist));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app(state)).await?;

    Ok(())
}
