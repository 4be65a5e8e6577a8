use crate::config::Config;
use crate::error::CatalogError;
use crate::present::YearLabels;
use crate::render;
use crate::tmdb::{parse_tmdb_id, TmdbApi, TmdbClient};
use crate::view;
use anyhow::Result;
use axum::{
    extract::{Form, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};

const MAX_BODY_BYTES: usize = 16 * 1024; // search forms and empty POSTs only

#[derive(Clone)]
pub struct AppState {
    pub tmdb: Arc<dyn TmdbApi>,
    pub token: String,
    pub year_labels: YearLabels,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search: String,
}

/// Request failures. Catalog errors never reach the client in detail.
#[derive(Debug)]
pub enum AppError {
    NotFound,
    Catalog(CatalogError),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError::Catalog(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            AppError::Catalog(err) => {
                error!("Catalog request failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong").into_response()
            }
        }
    }
}

type PageResult = std::result::Result<Html<String>, AppError>;

pub async fn run_server(config: Config) -> Result<()> {
    let tmdb: Arc<dyn TmdbApi> = Arc::new(TmdbClient::new(
        config.api_base.clone(),
        config.include_adult,
    )?);
    info!(
        "Using TMDB at {} (include_adult={})",
        config.api_base, config.include_adult
    );

    let state = AppState {
        tmdb,
        token: config.token,
        year_labels: config.year_labels,
    };

    let app = build_router(state);

    info!("Listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/search", get(search_query).post(search_form))
        .route("/movie/:id", get(movie))
        .route("/movie/:id/graph", get(movie_graph))
        .route("/castMember/:id", get(cast_member))
        .route("/castMember/:id/graph", get(cast_member_graph))
        .route("/subGraph/movie/:id", post(sub_graph_movie))
        .route("/subGraph/person/:id", post(sub_graph_person))
        .route("/assets/no-image.svg", get(placeholder_image))
        .route("/health", get(health))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn index() -> Html<String> {
    Html(render::index())
}

async fn placeholder_image() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        render::PLACEHOLDER_SVG,
    )
}

async fn search_query(State(state): State<AppState>, Query(params): Query<SearchParams>) -> PageResult {
    search(&state, &params.search).await
}

async fn search_form(State(state): State<AppState>, Form(params): Form<SearchParams>) -> PageResult {
    search(&state, &params.search).await
}

async fn search(state: &AppState, query: &str) -> PageResult {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Html(render::search(query, &[])));
    }

    let (movies, people) = tokio::try_join!(
        state.tmdb.search_movies(&state.token, query),
        state.tmdb.search_people(&state.token, query),
    )?;
    let rows = view::merge_search_results(&movies, &people, &state.year_labels.search);
    debug!(
        query,
        movies = movies.len(),
        people = people.len(),
        "Search merged"
    );
    Ok(Html(render::search(query, &rows)))
}

async fn movie(State(state): State<AppState>, Path(raw_id): Path<String>) -> PageResult {
    let id = entity_id(&raw_id)?;
    let (details, credits) = tokio::try_join!(
        state.tmdb.movie_details(&state.token, id),
        state.tmdb.movie_credits(&state.token, id),
    )?;
    Ok(Html(render::movie(
        &details,
        &credits.cast,
        &state.year_labels.detail,
    )))
}

async fn cast_member(State(state): State<AppState>, Path(raw_id): Path<String>) -> PageResult {
    let id = entity_id(&raw_id)?;
    let (details, credits) = tokio::try_join!(
        state.tmdb.person_details(&state.token, id),
        state.tmdb.person_credits(&state.token, id),
    )?;
    let filmography = view::filmography(credits.cast);
    Ok(Html(render::person(
        &details,
        &filmography,
        &state.year_labels.detail,
    )))
}

async fn movie_graph(State(state): State<AppState>, Path(raw_id): Path<String>) -> PageResult {
    let id = entity_id(&raw_id)?;
    let (details, credits) = tokio::try_join!(
        state.tmdb.movie_details(&state.token, id),
        state.tmdb.movie_credits(&state.token, id),
    )?;
    Ok(Html(render::graph(&view::movie_graph(&details, credits))))
}

async fn cast_member_graph(State(state): State<AppState>, Path(raw_id): Path<String>) -> PageResult {
    let id = entity_id(&raw_id)?;
    let (details, credits) = tokio::try_join!(
        state.tmdb.person_details(&state.token, id),
        state.tmdb.person_credits(&state.token, id),
    )?;
    Ok(Html(render::graph(&view::person_graph(&details, credits))))
}

async fn sub_graph_movie(State(state): State<AppState>, Path(raw_id): Path<String>) -> PageResult {
    let id = entity_id(&raw_id)?;
    let credits = state.tmdb.movie_credits(&state.token, id).await?;
    Ok(Html(render::sub_graph(&view::movie_sub_graph(credits))))
}

async fn sub_graph_person(State(state): State<AppState>, Path(raw_id): Path<String>) -> PageResult {
    let id = entity_id(&raw_id)?;
    let credits = state.tmdb.person_credits(&state.token, id).await?;
    Ok(Html(render::sub_graph(&view::person_sub_graph(credits))))
}

fn entity_id(raw: &str) -> std::result::Result<i64, AppError> {
    parse_tmdb_id(raw).ok_or_else(|| {
        warn!("Rejecting non-numeric id '{}'", raw);
        AppError::NotFound
    })
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
