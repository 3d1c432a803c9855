use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use bookrec_core::{recommend_by_title, BookRecord, Catalog, GenreFilter, RecommendQuery, SharedIndex, TfidfConfig, VectorIndex, YearRange};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct RecommendParams {
    pub title: String,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    pub genre: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
}
fn default_top_n() -> usize { 5 }

#[derive(Serialize)]
pub struct RecommendResponse {
    pub query: String,
    pub took_s: f64,
    pub selected: Option<BookRecord>,
    pub results: Vec<RecommendHit>,
}

#[derive(Serialize)]
pub struct RecommendHit {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub year: i32,
    pub score: f32,
    pub description: String,
}

#[derive(Deserialize)]
pub struct TitleParams {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_title_limit")]
    pub limit: usize,
}
fn default_title_limit() -> usize { 2000 }

#[derive(Serialize)]
pub struct StatsResponse {
    pub num_books: usize,
    pub vocabulary_size: usize,
    pub genres: Vec<String>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub top_genres: Vec<GenreCount>,
    pub top_rated: Vec<BookRecord>,
}

#[derive(Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog_path: PathBuf,
    pub tfidf: TfidfConfig,
    pub index: Arc<SharedIndex>,
    pub admin_token: Option<String>,
}

/// Error response: a status code and a `{"error": ...}` JSON body.
pub type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(status: StatusCode, message: impl std::fmt::Display) -> ApiError {
    (status, Json(serde_json::json!({ "error": message.to_string() })))
}

fn load_and_build(path: &std::path::Path, tfidf: TfidfConfig) -> bookrec_core::Result<VectorIndex> {
    let catalog = Catalog::from_path(path)?;
    VectorIndex::build_with(Arc::new(catalog), tfidf)
}

/// Startup settings, usually filled from CLI flags and the environment.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub catalog_path: PathBuf,
    pub tfidf: TfidfConfig,
    /// Required value of the X-ADMIN-TOKEN header; admin routes are closed without it.
    pub admin_token: Option<String>,
    /// Comma-separated allowed origins; any origin when unset.
    pub cors_allow_origin: Option<String>,
}

pub fn build_app(config: AppConfig) -> Result<Router> {
    // Build the index before serving; queries never see a partial index.
    let index = load_and_build(&config.catalog_path, config.tfidf)?;
    let app_state = AppState {
        catalog_path: config.catalog_path,
        tfidf: config.tfidf,
        index: Arc::new(SharedIndex::new(index)),
        admin_token: config.admin_token,
    };

    let cors = match config.cors_allow_origin {
        Some(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        None => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/recommend", get(recommend_handler))
        .route("/titles", get(titles_handler))
        .route("/book/:id", get(book_handler))
        .route("/stats", get(stats_handler))
        .route("/admin/reload", post(reload_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn recommend_handler(State(state): State<AppState>, Query(params): Query<RecommendParams>) -> Result<Json<RecommendResponse>, ApiError> {
    let start = std::time::Instant::now();
    let index = state.index.current();
    let years = match (params.year_from, params.year_to) {
        (Some(from), Some(to)) => Some(YearRange::new(from, to)),
        _ => None,
    };
    let query = RecommendQuery {
        top_n: params.top_n.min(100),
        genre: GenreFilter::parse(params.genre.as_deref()),
        years,
    };
    let (row, recs) = recommend_by_title(&index, &params.title, &query).map_err(|e| {
        tracing::error!(error = %e, "recommendation failed");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e)
    })?;

    let selected = row.and_then(|r| index.catalog().get(r)).cloned();
    let results = recs
        .into_iter()
        .map(|r| RecommendHit {
            id: r.book.id,
            title: r.book.title,
            author: r.book.author,
            genre: r.book.genre,
            year: r.book.year,
            score: r.score,
            description: r.book.description,
        })
        .collect();
    let elapsed = start.elapsed();
    Ok(Json(RecommendResponse { query: params.title, took_s: elapsed.as_secs_f64(), selected, results }))
}

pub async fn titles_handler(State(state): State<AppState>, Query(params): Query<TitleParams>) -> Json<Vec<String>> {
    let index = state.index.current();
    let titles = index.catalog().titles_matching(&params.q, params.limit);
    Json(titles.into_iter().map(str::to_string).collect())
}

pub async fn book_handler(State(state): State<AppState>, Path(id): Path<i64>) -> (StatusCode, Json<serde_json::Value>) {
    let index = state.index.current();
    match index.catalog().find_by_id(id) {
        Some(book) => (StatusCode::OK, Json(serde_json::json!(book))),
        None => api_error(StatusCode::NOT_FOUND, "not found"),
    }
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let index = state.index.current();
    let catalog = index.catalog();
    let bounds = catalog.year_bounds();
    Json(StatsResponse {
        num_books: catalog.len(),
        vocabulary_size: index.vocabulary_size(),
        genres: catalog.genres(),
        year_min: bounds.map(|b| b.0),
        year_max: bounds.map(|b| b.1),
        top_genres: catalog
            .genre_counts(10)
            .into_iter()
            .map(|(genre, count)| GenreCount { genre, count })
            .collect(),
        top_rated: catalog.top_rated(10).into_iter().cloned().collect(),
    })
}

// --- Admin endpoints ---
async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    let path = state.catalog_path.clone();
    let tfidf = state.tfidf;
    let index = tokio::task::spawn_blocking(move || load_and_build(&path, tfidf))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?
        .map_err(|e| {
            tracing::warn!(error = %e, "reload failed; keeping current index");
            api_error(StatusCode::UNPROCESSABLE_ENTITY, e)
        })?;
    let (num_books, vocabulary_size) = (index.row_count(), index.vocabulary_size());
    state.index.replace(index);
    Ok(Json(serde_json::json!({ "num_books": num_books, "vocabulary_size": vocabulary_size })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err(api_error(StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set")),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err(api_error(StatusCode::UNAUTHORIZED, "invalid admin token"))
    }
}
