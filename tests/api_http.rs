// tests/api_http.rs
//
// HTTP facade smoke tests via `tower::ServiceExt::oneshot`, with a cached
// Router (tokio::sync::OnceCell) so the config loads once per test binary.

use axum::{
    body::{to_bytes, Body},
    http::Request,
};
use http::StatusCode;
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tower::ServiceExt; // for `oneshot`

use portal_feed_engine::app;

static ROUTER: OnceCell<axum::Router> = OnceCell::const_new();

async fn test_app() -> axum::Router {
    ROUTER
        .get_or_init(|| async { app().expect("app() should build a Router") })
        .await
        .clone()
}

async fn post_rank(body: Value) -> (StatusCode, Value) {
    let router = test_app().await;
    let req = Request::builder()
        .method("POST")
        .uri("/rank")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 256 * 1024).await.unwrap();
    let v = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, v)
}

#[tokio::test]
async fn health_ok() {
    let router = test_app().await;
    let resp = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn rank_returns_ordered_items_with_flags() {
    let body = json!({
        "context": {
            "tenant_id": "hotel-ember",
            "track_key": "tonight",
            "day_part": "evening",
            "min_results": 1
        },
        "candidates": [
            {
                "id": "jazz",
                "kind": "event",
                "title": "Rooftop jazz night",
                "category": "music",
                "start_time": "19:00:00",
                "is_free": true,
                "source": { "name": "Downtown Alliance", "slug": "downtown-alliance" }
            },
            {
                "id": "club",
                "kind": "event",
                "title": "Community book club",
                "category": "learning",
                "start_time": "10:00:00",
                "source": { "name": "Downtown Alliance" }
            }
        ]
    });
    let (status, v) = post_rank(body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["acceptance"], json!("strict"));
    let items = v["items"].as_array().expect("items array");
    assert_eq!(items[0]["title"], json!("Rooftop jazz night"));
    assert_eq!(items[0]["is_live"], json!(true));
    // Score is an internal detail and must be stripped from the wire shape.
    assert!(items[0].get("score").is_none());
    assert!(items[0]["reasons"]
        .as_array()
        .expect("reasons")
        .contains(&json!("Perfect for tonight")));
}

#[tokio::test]
async fn empty_governed_track_reports_fallback() {
    let body = json!({
        "context": {
            "tenant_id": "st-luke",
            "track_key": "community-stories",
            "day_part": "morning"
        },
        "candidates": []
    });
    let (status, v) = post_rank(body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["acceptance"], json!("fallback_injected"));
    assert_eq!(v["live_count"], json!(0));
    assert!(v["items"].as_array().unwrap().len() >= 1);
    assert_eq!(v["items"][0]["is_live"], json!(false));
}

#[tokio::test]
async fn structurally_invalid_context_is_4xx() {
    let body = json!({
        "context": {
            "tenant_id": "hotel-ember",
            "track_key": "   ",
            "day_part": "evening"
        },
        "candidates": []
    });
    let (status, _) = post_rank(body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn debug_resolve_source_reports_rail() {
    let router = test_app().await;
    let resp = router
        .oneshot(
            Request::builder()
                .uri("/debug/resolve-source?name=city-parks")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("id=city-parks"), "got: {text}");
}
