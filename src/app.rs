use crate::favorites::{AddOutcome, FavoritesStore};
use crate::models::{
    CatalogListing, FavoriteItem, Genre, MovieListing, Page, TvListing, BACKDROP_BASE, POSTER_BASE,
};
use crate::notify::LogNotifier;
use crate::storage::FileSlot;
use crate::tmdb::{CatalogApi, DiscoverFilter, TmdbClient};
use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::{env, net::SocketAddr, sync::Arc};
use tokio::sync::Mutex;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info};

const MAX_BODY_BYTES: usize = 64 * 1024;
const DEFAULT_DATA_DIR: &str = "data";
const SLOT_FILE_NAME: &str = "favorites.json";

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogApi>,
    pub favorites: Arc<Mutex<FavoritesStore>>,
}

pub async fn run_server() -> Result<()> {
    let catalog: Arc<dyn CatalogApi> = Arc::new(TmdbClient::from_env()?);

    let data_dir =
        env::var("STREAMFLIX_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
    let slot = FileSlot::new(std::path::Path::new(&data_dir).join(SLOT_FILE_NAME));
    info!("Favorites slot at {}", slot.path().display());
    // The slot is read exactly once per process lifetime, before the server
    // accepts requests.
    let store = FavoritesStore::load(Box::new(slot), Box::new(LogNotifier));
    info!("Hydrated {} favorite(s)", store.len());

    let state = AppState {
        catalog,
        favorites: Arc::new(Mutex::new(store)),
    };

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 3117));
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/config", get(config))
        .route("/api/movies", get(discover_movies))
        .route("/api/movies/search", get(search_movies))
        .route("/api/tv", get(discover_tv))
        .route("/api/tv/search", get(search_tv))
        .route("/api/genres/:kind", get(genres))
        .route(
            "/api/favorites",
            get(list_favorites)
                .post(add_favorite)
                .delete(clear_favorites),
        )
        .route(
            "/api/favorites/:id",
            get(get_favorite).delete(remove_favorite),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

/// Image path fragments in catalog records are resolved against these bases.
async fn config() -> Json<serde_json::Value> {
    Json(json!({
        "poster_base_url": POSTER_BASE,
        "backdrop_base_url": BACKDROP_BASE,
    }))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
    #[serde(default = "first_page")]
    page: u32,
}

fn first_page() -> u32 {
    1
}

async fn discover_movies(
    State(state): State<AppState>,
    Query(filter): Query<DiscoverFilter>,
) -> Result<Json<Page<MovieListing>>, StatusCode> {
    match state.catalog.discover_movies(&filter).await {
        Ok(page) => Ok(Json(page)),
        Err(e) => {
            error!("Failed to fetch movies: {:?}", e);
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}

async fn discover_tv(
    State(state): State<AppState>,
    Query(filter): Query<DiscoverFilter>,
) -> Result<Json<Page<TvListing>>, StatusCode> {
    match state.catalog.discover_tv(&filter).await {
        Ok(page) => Ok(Json(page)),
        Err(e) => {
            error!("Failed to fetch TV shows: {:?}", e);
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}

async fn search_movies(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Page<MovieListing>>, StatusCode> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    match state.catalog.search_movies(query, params.page).await {
        Ok(page) => Ok(Json(page)),
        Err(e) => {
            error!("Failed to search movies: {:?}", e);
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}

async fn search_tv(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Page<TvListing>>, StatusCode> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    match state.catalog.search_tv(query, params.page).await {
        Ok(page) => Ok(Json(page)),
        Err(e) => {
            error!("Failed to search TV shows: {:?}", e);
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}

async fn genres(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<Genre>>, StatusCode> {
    let result = match kind.as_str() {
        "movie" => state.catalog.movie_genres().await,
        "tv" => state.catalog.tv_genres().await,
        _ => return Err(StatusCode::NOT_FOUND),
    };
    match result {
        Ok(genres) => Ok(Json(genres)),
        Err(e) => {
            error!("Failed to fetch {} genres: {:?}", kind, e);
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}

async fn list_favorites(State(state): State<AppState>) -> Json<Vec<FavoriteItem>> {
    Json(state.favorites.lock().await.items())
}

async fn add_favorite(
    State(state): State<AppState>,
    Json(listing): Json<CatalogListing>,
) -> Response {
    let item = FavoriteItem::from(listing);
    let id = item.id;
    let mut store = state.favorites.lock().await;
    match store.add(item) {
        Ok(outcome) => {
            let status = match outcome {
                AddOutcome::Added => StatusCode::CREATED,
                AddOutcome::AlreadyPresent => StatusCode::OK,
            };
            // On a duplicate the first insertion wins; echo the stored record.
            match store.get(id) {
                Some(stored) => (status, Json(stored.clone())).into_response(),
                None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            }
        }
        Err(e) => {
            error!("Failed to persist favorites: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn get_favorite(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<FavoriteItem>, StatusCode> {
    state
        .favorites
        .lock()
        .await
        .get(id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn remove_favorite(State(state): State<AppState>, Path(id): Path<i32>) -> StatusCode {
    // A missing id is a silent no-op, so removal is idempotent.
    match state.favorites.lock().await.remove(id) {
        Ok(_) => StatusCode::NO_CONTENT,
        Err(e) => {
            error!("Failed to persist favorites: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn clear_favorites(State(state): State<AppState>) -> StatusCode {
    match state.favorites.lock().await.clear() {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(e) => {
            error!("Failed to persist favorites: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        term.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
