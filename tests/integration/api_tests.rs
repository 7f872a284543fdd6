//! HTTP API tests.
//!
//! These drive the router in-process with `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::Router;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use gridcut::{create_router, AppState, GridSpec, RouterConfig, WatermarkSpec};

use super::test_utils::{gradient_raster, is_valid_jpeg, is_valid_png, jpeg_bytes, png_bytes};

// =============================================================================
// Helpers
// =============================================================================

fn test_router() -> Router {
    create_router(AppState::new(), RouterConfig::new().with_tracing(false))
}

fn post(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn header<'a>(response: &'a axum::response::Response, name: &str) -> &'a str {
    response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("missing header {}", name))
        .to_str()
        .unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = test_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// Cut Summary
// =============================================================================

#[tokio::test]
async fn test_cut_summary_default_grid() {
    let upload = png_bytes(&gradient_raster(1200, 900));

    let response = test_router().oneshot(post("/cut", upload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["width"], 1200);
    assert_eq!(json["height"], 900);
    assert_eq!(json["rows"], 3);
    assert_eq!(json["cols"], 4);
    assert_eq!(json["tile_count"], 12);
    assert_eq!(json["remainder_policy"], "drop");

    let tiles = json["tiles"].as_array().unwrap();
    assert_eq!(tiles.len(), 12);
    assert_eq!(tiles[0]["label"], "1-1");
    assert_eq!(tiles[0]["right"], 300);
    assert_eq!(tiles[11]["index"], 11);
    assert_eq!(tiles[11]["label"], "3-4");
    assert_eq!(tiles[11]["left"], 900);
    assert_eq!(tiles[11]["bottom"], 900);
}

#[tokio::test]
async fn test_cut_summary_query_overrides() {
    let upload = jpeg_bytes(&gradient_raster(100, 100));

    let response = test_router()
        .oneshot(post("/cut?rows=3&cols=3&stretch=true&label=%23%7Bindex%7D", upload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["tile_count"], 9);
    assert_eq!(json["remainder_policy"], "stretch");

    let tiles = json["tiles"].as_array().unwrap();
    assert_eq!(tiles[2]["right"], 100);
    assert_eq!(tiles[8]["width"], 34);
    assert_eq!(tiles[4]["label"], "#5");
}

#[tokio::test]
async fn test_cut_summary_uses_state_defaults() {
    let state = AppState::new()
        .with_grid(GridSpec::new(2, 2))
        .with_watermark(WatermarkSpec::new("acme", "r{row}c{col}"));
    let router = create_router(state, RouterConfig::new().with_tracing(false));

    let upload = png_bytes(&gradient_raster(64, 64));
    let response = router.oneshot(post("/cut", upload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["tile_count"], 4);
    assert_eq!(json["tiles"][3]["label"], "r2c2");
}

// =============================================================================
// Tile Download
// =============================================================================

#[tokio::test]
async fn test_tile_png_with_headers() {
    let upload = png_bytes(&gradient_raster(400, 300));

    let response = test_router()
        .oneshot(post("/cut/6.png", upload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), "image/png");
    assert_eq!(header(&response, "x-tile-row"), "1");
    assert_eq!(header(&response, "x-tile-col"), "2");
    assert_eq!(header(&response, "x-tile-label"), "2-3");
    assert_eq!(header(&response, "x-tile-watermark"), "applied");

    let data = body_bytes(response).await;
    assert!(is_valid_png(&data));

    let tile = image::load_from_memory(&data).unwrap();
    assert_eq!((tile.width(), tile.height()), (100, 100));
}

#[tokio::test]
async fn test_tile_jpeg_from_extension() {
    let upload = png_bytes(&gradient_raster(400, 300));

    let response = test_router()
        .oneshot(post("/cut/0.jpg", upload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), "image/jpeg");

    let data = body_bytes(response).await;
    assert!(is_valid_jpeg(&data));
}

#[tokio::test]
async fn test_tile_format_query_wins_over_extension() {
    let upload = png_bytes(&gradient_raster(400, 300));

    let response = test_router()
        .oneshot(post("/cut/0.png?format=jpeg&quality=60", upload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), "image/jpeg");
}

#[tokio::test]
async fn test_tile_without_extension_uses_default_format() {
    let upload = jpeg_bytes(&gradient_raster(400, 300));

    let response = test_router().oneshot(post("/cut/11", upload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), "image/png");
    assert_eq!(header(&response, "x-tile-label"), "3-4");
}

// =============================================================================
// Error Mapping
// =============================================================================

#[tokio::test]
async fn test_tile_index_out_of_range() {
    let upload = png_bytes(&gradient_raster(400, 300));

    let response = test_router()
        .oneshot(post("/cut/12.png", upload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"], "tile_out_of_range");
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_invalid_tile_filename() {
    let upload = png_bytes(&gradient_raster(40, 30));

    let response = test_router()
        .oneshot(post("/cut/first.png", upload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid_tile_index");
}

#[tokio::test]
async fn test_zero_rows_rejected() {
    let upload = png_bytes(&gradient_raster(40, 30));

    let response = test_router()
        .oneshot(post("/cut?rows=0", upload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid_grid");
}

#[tokio::test]
async fn test_grid_finer_than_upload_rejected() {
    let upload = png_bytes(&gradient_raster(3, 3));

    let response = test_router().oneshot(post("/cut", upload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid_grid");
}

#[tokio::test]
async fn test_invalid_quality_rejected() {
    let upload = png_bytes(&gradient_raster(40, 30));

    let response = test_router()
        .oneshot(post("/cut/0.jpg?quality=0", upload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid_quality");
}

#[tokio::test]
async fn test_unknown_output_format_rejected() {
    let upload = png_bytes(&gradient_raster(40, 30));

    let response = test_router()
        .oneshot(post("/cut/0?format=webp", upload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_label_with_control_character_rejected() {
    let upload = png_bytes(&gradient_raster(120, 90));

    let response = test_router()
        .oneshot(post("/cut/0.png?label=%7Brow%7D%0A%7Bcol%7D", upload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&response, "content-type"), "application/json");

    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid_watermark");
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_empty_label_rejected() {
    let upload = png_bytes(&gradient_raster(120, 90));

    let response = test_router()
        .oneshot(post("/cut?label=", upload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid_watermark");
}

#[tokio::test]
async fn test_multiline_text_accepted() {
    let upload = png_bytes(&gradient_raster(120, 90));

    let response = test_router()
        .oneshot(post("/cut/0.png?text=top%0Abottom", upload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-tile-watermark"), "applied");
}

#[tokio::test]
async fn test_unsupported_upload_format() {
    let response = test_router()
        .oneshot(post("/cut", b"GIF89a\x01\x00\x01\x00".to_vec()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let json = body_json(response).await;
    assert_eq!(json["error"], "unsupported_format");
}

#[tokio::test]
async fn test_truncated_upload() {
    let mut upload = png_bytes(&gradient_raster(200, 200));
    upload.truncate(64);

    let response = test_router().oneshot(post("/cut", upload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["error"], "decode_error");
}

#[tokio::test]
async fn test_empty_upload() {
    let response = test_router().oneshot(post("/cut", Vec::new())).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_upload_over_limit() {
    let router = create_router(
        AppState::new(),
        RouterConfig::new()
            .with_max_upload_bytes(1024)
            .with_tracing(false),
    );
    let upload = png_bytes(&gradient_raster(400, 300));
    assert!(upload.len() > 1024);

    let response = router.oneshot(post("/cut", upload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_unknown_route() {
    let request = Request::builder()
        .uri("/tiles")
        .body(Body::empty())
        .unwrap();

    let response = test_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// CORS
// =============================================================================

#[tokio::test]
async fn test_cors_exposes_tile_headers() {
    let request = Request::builder()
        .uri("/health")
        .header("origin", "https://viewer.example")
        .body(Body::empty())
        .unwrap();

    let response = test_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "access-control-allow-origin"), "*");

    let exposed = header(&response, "access-control-expose-headers").to_ascii_lowercase();
    for name in ["x-tile-row", "x-tile-col", "x-tile-label", "x-tile-watermark"] {
        assert!(exposed.contains(name), "{} missing from {}", name, exposed);
    }
}

#[tokio::test]
async fn test_cors_preflight_allows_post() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/cut")
        .header("origin", "https://viewer.example")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();

    let response = test_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "access-control-allow-origin"), "*");
    assert!(header(&response, "access-control-allow-methods").contains("POST"));
}

#[tokio::test]
async fn test_cors_restricted_origins() {
    let router = create_router(
        AppState::new(),
        RouterConfig::new()
            .with_cors_origins(vec!["https://viewer.example".to_string()])
            .with_tracing(false),
    );

    let allowed = Request::builder()
        .uri("/health")
        .header("origin", "https://viewer.example")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(allowed).await.unwrap();
    assert_eq!(
        header(&response, "access-control-allow-origin"),
        "https://viewer.example"
    );

    let other = Request::builder()
        .uri("/health")
        .header("origin", "https://elsewhere.example")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(other).await.unwrap();
    assert!(response.headers().get("access-control-allow-origin").is_none());
}
