// Post Insights HTTP interface - query, view mutation, ingestion and assistant routes

use axum::{
    extract::{Path as AxumPath, State},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    app_state::AppState,
    core::Metrics,
    error::{AppError, AppResult},
    infrastructure::record_store::IngestReport,
    ingest::{decode_csv, decode_json_rows, inspect, require_rows, DataQualityReport},
    models::{ChartSpec, ColumnSchema, FilterPredicate, Post, Series, ViewState, ViewUpdate},
    services::assistant::AssistantReply,
};

#[derive(Deserialize)]
pub struct SheetImportRequest {
    pub url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetImportResponse {
    /// A newer sheet import started before this one finished
    pub superseded: bool,
    pub report: Option<IngestReport>,
}

#[derive(Deserialize)]
pub struct AssistantRequest {
    pub query: String,
}

// HTTP Handlers - posts

pub async fn get_filtered_posts_handler(State(state): State<AppState>) -> Json<Vec<Post>> {
    Json(state.store.filtered_posts().await)
}

pub async fn get_all_posts_handler(State(state): State<AppState>) -> Json<Vec<Post>> {
    Json(state.store.posts().await)
}

pub async fn replace_posts_handler(
    State(state): State<AppState>,
    Json(posts): Json<Vec<Post>>,
) -> Json<Value> {
    let total = state.store.replace(posts).await;
    Json(json!({ "total": total }))
}

pub async fn clear_posts_handler(State(state): State<AppState>) -> Json<Value> {
    state.store.clear().await;
    Json(json!({ "total": 0 }))
}

pub async fn ingest_rows_handler(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> AppResult<Json<IngestReport>> {
    let rows = require_rows(decode_json_rows(body)?)?;
    Ok(Json(state.store.ingest(rows).await))
}

pub async fn import_csv_handler(
    State(state): State<AppState>,
    body: String,
) -> AppResult<Json<IngestReport>> {
    let rows = require_rows(decode_csv(&body)?)?;
    Ok(Json(state.store.ingest(rows).await))
}

pub async fn import_sheet_handler(
    State(state): State<AppState>,
    Json(req): Json<SheetImportRequest>,
) -> AppResult<Json<SheetImportResponse>> {
    let report = match state.sheets.fetch(&req.url).await? {
        Some(rows) => Some(state.store.ingest(require_rows(rows)?).await),
        None => None,
    };
    Ok(Json(SheetImportResponse {
        superseded: report.is_none(),
        report,
    }))
}

pub async fn inspect_csv_handler(body: String) -> AppResult<Json<DataQualityReport>> {
    let rows = require_rows(decode_csv(&body)?)?;
    let report = inspect(&rows);
    info!("Inspected CSV: rows={} issues={}", report.rows, report.issues.len());
    Ok(Json(report))
}

// HTTP Handlers - queries

pub async fn get_columns_handler(State(state): State<AppState>) -> Json<Vec<ColumnSchema>> {
    Json(state.store.columns().await)
}

pub async fn get_metrics_handler(State(state): State<AppState>) -> Json<Metrics> {
    Json(state.store.metrics().await)
}

pub async fn generate_series_handler(
    State(state): State<AppState>,
    Json(spec): Json<ChartSpec>,
) -> AppResult<Json<Series>> {
    if spec.group_field.trim().is_empty() {
        return Err(AppError::Validation("groupField must not be empty".to_string()));
    }
    Ok(Json(state.store.generate_series(&spec).await))
}

// HTTP Handlers - view

pub async fn get_view_handler(State(state): State<AppState>) -> Json<ViewState> {
    Json(state.store.view().await)
}

pub async fn update_view_handler(
    State(state): State<AppState>,
    Json(update): Json<ViewUpdate>,
) -> Json<ViewState> {
    Json(state.store.set_view(update).await)
}

pub async fn add_predicate_handler(
    State(state): State<AppState>,
    Json(predicate): Json<FilterPredicate>,
) -> Json<ViewState> {
    Json(state.store.add_predicate(predicate).await)
}

pub async fn clear_predicates_handler(State(state): State<AppState>) -> Json<ViewState> {
    Json(state.store.clear_predicates().await)
}

pub async fn remove_predicate_handler(
    State(state): State<AppState>,
    AxumPath(index): AxumPath<usize>,
) -> Json<ViewState> {
    Json(state.store.remove_predicate(index).await)
}

pub async fn clear_filters_handler(State(state): State<AppState>) -> Json<ViewState> {
    Json(state.store.clear_filters().await)
}

// HTTP Handlers - assistant

pub async fn assistant_handler(
    State(state): State<AppState>,
    Json(req): Json<AssistantRequest>,
) -> AppResult<Json<AssistantReply>> {
    if req.query.trim().is_empty() {
        return Err(AppError::BadRequest("query must not be empty".to_string()));
    }
    Ok(Json(state.assistant.respond(&req.query).await))
}

// Create insights router
pub fn create_insights_router(state: AppState) -> Router {
    Router::new()
        // Post collection
        .route(
            "/posts",
            get(get_filtered_posts_handler)
                .put(replace_posts_handler)
                .delete(clear_posts_handler),
        )
        .route("/posts/all", get(get_all_posts_handler))
        .route("/posts/ingest", post(ingest_rows_handler))
        .route("/posts/import/csv", post(import_csv_handler))
        .route("/posts/import/sheet", post(import_sheet_handler))
        .route("/posts/inspect/csv", post(inspect_csv_handler))

        // Derived queries
        .route("/columns", get(get_columns_handler))
        .route("/metrics", get(get_metrics_handler))
        .route("/series", post(generate_series_handler))

        // View state
        .route("/view", get(get_view_handler).patch(update_view_handler))
        .route(
            "/view/predicates",
            post(add_predicate_handler).delete(clear_predicates_handler),
        )
        .route("/view/predicates/{index}", delete(remove_predicate_handler))
        .route("/view/filters", delete(clear_filters_handler))

        // Assistant
        .route("/assistant", post(assistant_handler))

        .with_state(state)
}
