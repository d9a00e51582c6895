use std::sync::Arc;

use axum::response::Response;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use image::RgbImage;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt;

use measurelog::chart::{color, PngRenderer};
use measurelog::http::app_server::{AppServer, AppState, PATH_HEALTH, PATH_MESSAGES};
use measurelog::store::{FileStore, TokenRegistry};

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Router over a store in a fresh temporary data directory.
fn setup_test() -> TestResult<(Router, TempDir)> {
    let temp_dir = tempfile::tempdir()?;

    let store = Arc::new(FileStore::open(temp_dir.path())?);
    let tokens = Arc::new(TokenRegistry::open(temp_dir.path())?);
    let renderer = Arc::new(PngRenderer::new(640, 320)?);

    let app = AppServer::new(AppState::new(
        store,
        tokens,
        renderer,
        "http://measure.test",
    ));

    Ok((app.router, temp_dir))
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResult<Response> {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json)?)
        }
        None => Body::empty(),
    };

    Ok(router.clone().oneshot(request.body(body)?).await?)
}

async fn json_body(response: Response) -> TestResult<Value> {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&body)?)
}

async fn post_message(router: &Router, user_id: i64, text: &str) -> TestResult<String> {
    let response = send(
        router,
        Method::POST,
        PATH_MESSAGES,
        Some(json!({ "user_id": user_id, "text": text })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await?;
    Ok(json["reply"].as_str().unwrap_or_default().to_owned())
}

/// Dashboard path ("/u/<token>") taken from the link in a bot reply.
async fn dashboard_path(router: &Router, user_id: i64) -> TestResult<String> {
    let link = post_message(router, user_id, "/link").await?;
    let path = link
        .strip_prefix("http://measure.test")
        .ok_or("link doesn't use the base URL")?;
    Ok(path.to_owned())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_health() -> TestResult {
    let (router, _dir) = setup_test()?;

    let response = send(&router, Method::GET, PATH_HEALTH, None).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await?["status"], "ok");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_message_then_dashboard() -> TestResult {
    let (router, _dir) = setup_test()?;

    let reply = post_message(&router, 1, "DATE: 2023-05-15\nWeight 75.3\nChest 117.8").await?;
    assert!(reply.starts_with("Saved 2 measurements for 2023-05-15:"), "{}", reply);
    post_message(&router, 1, "weight 75,1").await?;

    let dashboard = dashboard_path(&router, 1).await?;

    let response = send(&router, Method::GET, &dashboard, None).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await?;
    assert_eq!(json["latest"], json!({"Chest": 117.8, "Weight": 75.1}));
    assert_eq!(json["keys"], json!(["Chest", "Weight"]));
    assert_eq!(json["points"], 3);
    assert_eq!(json["chart"], format!("{}/chart.png", dashboard));

    let response = send(&router, Method::GET, &format!("{}/points", dashboard), None).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await?;
    let points = json.as_array().ok_or("points must be an array")?;
    assert_eq!(points.len(), 3);
    assert_eq!(points[0]["timestamp"], "2023-05-15T00:00:00.000Z");
    assert_eq!(points[2]["key"], "Weight");
    assert_eq!(points[2]["value"], 75.1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_parse_error_reply() -> TestResult {
    let (router, _dir) = setup_test()?;

    let reply = post_message(&router, 1, "Weight 75\nnot a valid line").await?;
    assert!(reply.contains("\"not a valid line\""), "{}", reply);

    let dashboard = dashboard_path(&router, 1).await?;
    let response = send(&router, Method::GET, &format!("{}/points", dashboard), None).await?;
    assert_eq!(json_body(response).await?, json!([]));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_point_and_clear() -> TestResult {
    let (router, _dir) = setup_test()?;

    post_message(&router, 3, "15.05.2023 Weight 75.3, Chest 117.8").await?;
    let dashboard = dashboard_path(&router, 3).await?;

    let uri = format!("{}/points?key=weight&timestamp=2023-05-15T00:00:00.000Z", dashboard);
    let response = send(&router, Method::DELETE, &uri, None).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await?, json!({"deleted": true}));

    let response = send(&router, Method::DELETE, &uri, None).await?;
    assert_eq!(json_body(response).await?, json!({"deleted": false}));

    let uri = format!("{}/points?key=Chest&timestamp=last-tuesday", dashboard);
    let response = send(&router, Method::DELETE, &uri, None).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&router, Method::DELETE, &dashboard, None).await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&router, Method::GET, &dashboard, None).await?;
    assert_eq!(json_body(response).await?["points"], 0);
    Ok(())
}

async fn chart_image(router: &Router, uri: &str) -> TestResult<RgbImage> {
    let response = send(router, Method::GET, uri, None).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(image::load_from_memory(&body)?.to_rgb8())
}

fn has_color(img: &RgbImage, key: &str) -> bool {
    let c = color(key);
    img.pixels().any(|p| p.0 == [c.0, c.1, c.2])
}

#[tokio::test(flavor = "multi_thread")]
async fn test_chart() -> TestResult {
    let (router, _dir) = setup_test()?;

    post_message(&router, 9, "Weight 75.3\nChest 117.8").await?;
    let dashboard = dashboard_path(&router, 9).await?;

    let img = chart_image(&router, &format!("{}/chart.png", dashboard)).await?;
    assert_eq!(img.dimensions(), (640, 320));
    assert!(has_color(&img, "Weight"));
    assert!(has_color(&img, "Chest"));

    let img = chart_image(&router, &format!("{}/chart.png?keys=chest", dashboard)).await?;
    assert!(has_color(&img, "Chest"));
    assert!(!has_color(&img, "Weight"));

    let img = chart_image(&router, &format!("{}/chart.png?keys=Hips", dashboard)).await?;
    assert!(!has_color(&img, "Chest"));
    assert!(!has_color(&img, "Weight"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_token() -> TestResult {
    let (router, _dir) = setup_test()?;

    for uri in ["/u/deadbeef", "/u/deadbeef/points", "/u/deadbeef/chart.png"] {
        let response = send(&router, Method::GET, uri, None).await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "for {}", uri);
        assert_eq!(json_body(response).await?["error"]["code"], "NOT_FOUND");
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_users_are_isolated() -> TestResult {
    let (router, _dir) = setup_test()?;

    post_message(&router, 1, "Weight 75").await?;
    post_message(&router, 2, "Weight 90").await?;

    let first = dashboard_path(&router, 1).await?;
    let second = dashboard_path(&router, 2).await?;
    assert_ne!(first, second);

    let json = json_body(send(&router, Method::GET, &first, None).await?).await?;
    assert_eq!(json["latest"], json!({"Weight": 75.0}));
    let json = json_body(send(&router, Method::GET, &second, None).await?).await?;
    assert_eq!(json["latest"], json!({"Weight": 90.0}));
    Ok(())
}
