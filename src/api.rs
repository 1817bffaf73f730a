// src/api.rs
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::filter::FilterCriteria;
use crate::monitor::Monitor;
use crate::present::{render_html, Page};

#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<Monitor>,
}

impl AppState {
    pub fn new(monitor: Monitor) -> Self {
        Self {
            monitor: Arc::new(monitor),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/documents", get(documents))
        .route("/health", get(|| async { "OK" }))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn build_page(state: &AppState, pairs: &[(String, String)]) -> Page {
    let criteria = FilterCriteria::from_query(pairs);
    let today = chrono::Local::now().date_naive();
    let feed = state
        .monitor
        .get_filtered_documents_on(&criteria, today)
        .await;
    Page::build(&feed, &criteria, today)
}

async fn index(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Html<String> {
    let page = build_page(&state, &pairs).await;
    Html(render_html(&page))
}

async fn documents(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<Page> {
    Json(build_page(&state, &pairs).await)
}
