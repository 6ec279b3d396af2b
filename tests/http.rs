use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use post_insights::{
    app_state::AppState, config::Config, infrastructure::MemorySnapshotStore,
    insights_interface::create_insights_router,
};

async fn app() -> Router {
    let state = AppState::with_snapshots(Config::default(), Arc::new(MemorySnapshotStore::new()))
        .await
        .unwrap();
    Router::new().nest("/api/v1", create_insights_router(state))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn send_csv(app: &Router, uri: &str, csv: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "text/csv")
        .body(Body::from(csv.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_csv_import_metrics_and_series() {
    let app = app().await;
    let (status, report) = send_csv(
        &app,
        "/api/v1/posts/import/csv",
        "text,likes,source,sentiment\na,10,X,positive\nb,bad,X,negative\nc,7,Y,positive\n",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["inserted"], 3);

    let (_, metrics) = send(&app, Method::GET, "/api/v1/metrics", None).await;
    assert_eq!(metrics["total"], 3);
    assert_eq!(metrics["totalEngagement"], 17);
    assert_eq!(metrics["sentimentBreakdown"]["positive"], 2);

    let spec = json!({"kind": "bar", "groupField": "platform", "valueField": "engagement", "reducer": "sum"});
    let (status, series) = send(&app, Method::POST, "/api/v1/series", Some(spec)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(series, json!([{"platform": "X", "engagement": 10}, {"platform": "Y", "engagement": 7}]));

    let (_, columns) = send(&app, Method::GET, "/api/v1/columns", None).await;
    assert_eq!(columns.as_array().map(|c| c.len()), Some(4));
}

#[tokio::test]
async fn test_view_routes() {
    let app = app().await;
    let rows = json!([
        {"content": "hello world", "platform": "X", "engagement": 3},
        {"content": "goodbye", "platform": "Y", "engagement": 9}
    ]);
    let (status, _) = send(&app, Method::POST, "/api/v1/posts/ingest", Some(rows)).await;
    assert_eq!(status, StatusCode::OK);

    let predicate = json!({"column": "content", "operator": "contains", "value": "HELLO"});
    let (_, view) = send(&app, Method::POST, "/api/v1/view/predicates", Some(predicate)).await;
    assert_eq!(view["predicates"].as_array().map(|p| p.len()), Some(1));

    let (_, posts) = send(&app, Method::GET, "/api/v1/posts", None).await;
    assert_eq!(posts.as_array().map(|p| p.len()), Some(1));

    let (_, view) = send(&app, Method::DELETE, "/api/v1/view/predicates/0", None).await;
    assert_eq!(view["predicates"], json!([]));

    let (_, view) = send(&app, Method::PATCH, "/api/v1/view", Some(json!({"selectedPlatforms": ["Y"]}))).await;
    assert_eq!(view["selectedPlatforms"], json!(["Y"]));
    let (_, posts) = send(&app, Method::GET, "/api/v1/posts", None).await;
    assert_eq!(posts[0]["platform"], "Y");

    let (_, view) = send(&app, Method::DELETE, "/api/v1/view/filters", None).await;
    assert_eq!(view["selectedPlatforms"], json!([]));
    let (_, all) = send(&app, Method::GET, "/api/v1/posts/all", None).await;
    assert_eq!(all.as_array().map(|p| p.len()), Some(2));
}

#[tokio::test]
async fn test_decode_failures_are_user_visible() {
    let app = app().await;
    let (status, body) = send(&app, Method::POST, "/api/v1/posts/ingest", Some(json!({"not": "rows"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], 422);

    let (status, _) = send_csv(&app, "/api/v1/posts/import/csv", "text,likes\n").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/posts/import/sheet",
        Some(json!({"url": "https://example.com/not-a-sheet"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inspect_csv_reports_issues() {
    let app = app().await;
    let (status, report) = send_csv(&app, "/api/v1/posts/inspect/csv", "text,likes\na,\na,\n").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["issues"], json!(["missingValues", "duplicateRows"]));
    assert_eq!(report["preview"].as_array().map(|p| p.len()), Some(2));

    // Inspection never ingests
    let (_, all) = send(&app, Method::GET, "/api/v1/posts/all", None).await;
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn test_clear_and_assistant() {
    let app = app().await;
    let rows = json!([{"text": "a", "sentiment": "negative", "likes": 4}]);
    send(&app, Method::POST, "/api/v1/posts/ingest", Some(rows)).await;

    let (status, reply) = send(&app, Method::POST, "/api/v1/assistant", Some(json!({"query": "sentiment?"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(reply["content"].as_str().unwrap().contains("negative sentiment dominates"));

    let (status, _) = send(&app, Method::DELETE, "/api/v1/posts", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, metrics) = send(&app, Method::GET, "/api/v1/metrics", None).await;
    assert_eq!(metrics["total"], 0);

    let (status, _) = send(&app, Method::POST, "/api/v1/assistant", Some(json!({"query": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
