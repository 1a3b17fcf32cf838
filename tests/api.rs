use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use tirl_lib::api::{self, ApiContext};
use tirl_lib::config::{AdminKey, AppEnv, Config, DbConfiguration, PluginsConfiguration, RateLimitConfiguration, ServerConfiguration};
use tirl_lib::db::SiteDb;
use tirl_lib::entities::Plugin;
use tirl_lib::error::SiteError;
use tirl_lib::plugins::StaticCatalog;
use tirl_lib::storage::{DbOperation, FileStorage, InMemoryStorage, Storage};

const ADMIN_KEY: &str = "s3cret";

fn config(admin_key: Option<&str>, rate_limit_max: u32) -> Config {
    Config {
        server: ServerConfiguration {
            port: 0,
            app_env: AppEnv::Production,
            admin_key: admin_key.map(AdminKey::new),
        },
        db: DbConfiguration {
            db_path: PathBuf::from("unused.db.json"),
        },
        plugins: PluginsConfiguration {
            url: "http://localhost/unused".to_string(),
            timeout: Duration::from_secs(1),
        },
        rate_limit: RateLimitConfiguration {
            max_requests: rate_limit_max,
            window: Duration::from_secs(900),
        },
    }
}

fn plugin(id: usize, name: &str, downloads: u64) -> Plugin {
    let now = Utc::now();
    Plugin {
        id,
        name: name.to_string(),
        author: "CinderBlock".to_string(),
        description: format!("{} for freeplay", name),
        views: downloads * 2,
        downloads,
        last_updated: "2024-05-01".to_string(),
        url: format!("https://bakkesplugins.com/plugins/view/{}", id),
        is_verified: id == 1,
        created_at: now,
        updated_at: now,
    }
}

async fn app_with(config: Config, storage: Box<dyn Storage>) -> Router {
    let db = SiteDb::init(storage).await.unwrap();
    let catalog = StaticCatalog::new(vec![
        plugin(1, "Rocket Plugin", 500),
        plugin(2, "Workshop Map Loader", 1500),
        plugin(3, "Ingame Rank", 900),
    ]);
    api::app(ApiContext::new(config, db, Arc::new(catalog)))
}

/// Starts empty and fails every write.
struct BrokenDiskStorage;

#[async_trait::async_trait]
impl Storage for BrokenDiskStorage {
    async fn read_all(&self) -> Result<Vec<DbOperation>, SiteError> {
        Ok(vec![])
    }

    async fn write(&mut self, _operation: DbOperation) -> Result<(), SiteError> {
        Err(SiteError::DbIOError(std::io::Error::new(std::io::ErrorKind::Other, "disk full")))
    }
}

async fn test_app() -> Router {
    app_with(config(Some(ADMIN_KEY), 1000), Box::new(InMemoryStorage::default())).await
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-client-id", "client_1");
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn raw_request(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let mut req = request(method, uri, body);
    req.headers_mut().insert("x-admin-key", ADMIN_KEY.parse().unwrap());
    req
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn new_term() -> Value {
    json!({
        "title": "Half Flip",
        "definition": "Flip backwards and cancel to turn around fast, see @Wave Dash@.",
        "category": "mechanics",
        "exampleUsage": "Half flip back to net.",
        "skillLevel": "intermediate",
        "submittedBy": "Kuxir",
    })
}

async fn create_and_publish_term(app: &Router) -> String {
    let (status, body) = send(app, request(Method::POST, "/api/terms", Some(new_term()))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["_id"].as_str().unwrap().to_string();

    let (status, _) = send(app, admin_request(Method::PUT, "/api/admin/submissions/status", Some(json!({
        "id": id,
        "type": "terms",
        "status": "published",
    })))).await;
    assert_eq!(status, StatusCode::OK);
    id
}

#[tokio::test]
async fn test_ping() {
    let app = test_app().await;
    let response = app.oneshot(request(Method::GET, "/api/ping", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"pong");
}

#[tokio::test]
async fn test_unknown_route() {
    let app = test_app().await;
    let (status, body) = send(&app, request(Method::GET, "/api/nope", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "error": "Route not found" }));
}

#[tokio::test]
async fn test_new_term_waits_for_review() {
    let app = test_app().await;
    let (status, body) = send(&app, request(Method::POST, "/api/terms", Some(new_term()))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Term submitted successfully and is under review");
    assert_eq!(body["data"]["status"], "review");
    assert_eq!(body["data"]["likeCount"], 0);
    assert_eq!(body["data"]["definition"], "Flip backwards and cancel to turn around fast, see @1@.");
    assert_eq!(body["data"]["tags"][0]["tagTitle"], "Wave Dash");
    assert_eq!(body["data"]["tags"][0]["page"], "/dictionary/wave-dash");
    let id = body["data"]["_id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, request(Method::GET, "/api/terms", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    let (status, body) = send(&app, request(Method::GET, &format!("/api/terms/{}", id), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Term not found");
}

#[tokio::test]
async fn test_term_validation_errors() {
    let app = test_app().await;
    let (status, body) = send(&app, request(Method::POST, "/api/terms", Some(json!({ "title": "Half Flip" })))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Missing required fields");

    let mut term = new_term();
    term["category"] = json!("memes");
    let (status, body) = send(&app, request(Method::POST, "/api/terms", Some(term))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid category");
}

#[tokio::test]
async fn test_bad_json_bodies_get_the_error_envelope() {
    let app = test_app().await;
    let mut term = new_term();
    term["title"] = json!(5);
    let (status, body) = send(&app, request(Method::POST, "/api/terms", Some(term))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("title"));

    for uri in ["/api/terms", "/api/records", "/api/car-designs"] {
        let (status, body) = send(&app, raw_request(Method::POST, uri, "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }

    let mut req = raw_request(Method::PUT, "/api/admin/submissions/status", "{\"status\":");
    req.headers_mut().insert("x-admin-key", ADMIN_KEY.parse().unwrap());
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_single_items_hide_who_liked_them() {
    let app = test_app().await;
    let id = create_and_publish_term(&app).await;
    send(&app, request(Method::POST, &format!("/api/terms/{}/like", id), None)).await;

    for uri in [format!("/api/terms/{}", id), "/api/terms/slug/half-flip".to_string()] {
        let (status, body) = send(&app, request(Method::GET, &uri, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["likeCount"], 1);
        assert_eq!(body["data"]["isLiked"], true);
        assert!(body["data"].get("likedBy").is_none());
    }

    let (_, body) = send(&app, request(Method::GET, "/api/terms/trending/limit", None)).await;
    assert_eq!(body["data"][0]["isLiked"], true);
    assert!(body["data"][0].get("likedBy").is_none());

    let mut other_client = request(Method::GET, &format!("/api/terms/{}", id), None);
    other_client.headers_mut().insert("x-client-id", "client_2".parse().unwrap());
    let (_, body) = send(&app, other_client).await;
    assert_eq!(body["data"]["isLiked"], false);
}

#[tokio::test]
async fn test_internal_error_cause_depends_on_app_env() {
    let production = app_with(config(None, 1000), Box::new(BrokenDiskStorage)).await;
    let mut development_config = config(None, 1000);
    development_config.server.app_env = AppEnv::Development;
    let development = app_with(development_config, Box::new(BrokenDiskStorage)).await;

    let (status, body) = send(&production, request(Method::POST, "/api/terms", Some(new_term()))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({
        "success": false,
        "error": "Something went wrong!",
        "message": "Internal server error",
    }));

    let (status, body) = send(&development, request(Method::POST, "/api/terms", Some(new_term()))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Something went wrong!");
    assert_eq!(body["message"], "Failed to read/write DB file: disk full");

    let (_, body) = send(&development, request(Method::GET, "/api/terms", None)).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_published_term_can_be_liked_once() {
    let app = test_app().await;
    let id = create_and_publish_term(&app).await;

    let (status, body) = send(&app, request(Method::GET, "/api/terms", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["page"], 1);
    assert_eq!(body["totalPages"], 1);

    let like_uri = format!("/api/terms/{}/like", id);
    let (status, body) = send(&app, request(Method::POST, &like_uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["likeCount"], 1);
    assert_eq!(body["message"], "Term liked successfully");

    let (status, body) = send(&app, request(Method::POST, &like_uri, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "You have already liked this term");

    let (_, body) = send(&app, request(Method::GET, "/api/terms", None)).await;
    let listed = &body["data"][0];
    assert_eq!(listed["isLiked"], true);
    assert!(listed.get("likedBy").is_none());

    let (status, body) = send(&app, request(Method::DELETE, &like_uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["likeCount"], 0);

    let (status, body) = send(&app, request(Method::DELETE, &like_uri, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "You have not liked this term");
}

#[tokio::test]
async fn test_term_by_slug_and_rendered() {
    let app = test_app().await;
    let id = create_and_publish_term(&app).await;

    let (status, body) = send(&app, request(Method::GET, "/api/terms/slug/half-flip", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["_id"], id.as_str());

    let (status, body) = send(&app, request(Method::GET, &format!("/api/terms/{}/rendered", id), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Half Flip");
    assert_eq!(body["data"]["definition"][1], json!({
        "type": "link",
        "label": "Wave Dash",
        "page": "/dictionary/wave-dash",
    }));
}

#[tokio::test]
async fn test_admin_guard() {
    let app = test_app().await;
    let (status, body) = send(&app, request(Method::GET, "/api/admin/dashboard", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid admin key");

    let uri = format!("/api/admin/dashboard?adminKey={}", ADMIN_KEY);
    let (status, body) = send(&app, request(Method::GET, &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["terms"]["total"], 0);

    let unconfigured = app_with(config(None, 1000), Box::new(InMemoryStorage::default())).await;
    let (status, body) = send(&unconfigured, admin_request(Method::GET, "/api/admin/dashboard", None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Admin key not configured");
}

#[tokio::test]
async fn test_admin_lists_and_deletes_submissions() {
    let app = test_app().await;
    let id = create_and_publish_term(&app).await;

    let (status, body) = send(&app, admin_request(Method::GET, "/api/admin/submissions/published?type=terms", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "published");
    assert_eq!(body["data"]["terms"].as_array().unwrap().len(), 1);
    assert!(body["data"].get("records").is_none());

    let (status, body) = send(&app, admin_request(Method::GET, "/api/admin/submissions/archived", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid status"));

    let uri = format!("/api/admin/submissions/terms/{}", id);
    let (status, body) = send(&app, admin_request(Method::DELETE, &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Submission deleted successfully");

    let (status, _) = send(&app, admin_request(Method::DELETE, &uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_car_design_image() {
    let app = test_app().await;
    let (status, body) = send(&app, request(Method::POST, "/api/car-designs", Some(json!({
        "title": "Octane Zebra",
        "description": "Black and white stripes",
        "image": "https://example.com/octane.png",
    })))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_plugins() {
    let app = test_app().await;
    let (status, body) = send(&app, request(Method::GET, "/api/plugins", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert!(body.get("lastFetched").is_some());

    let (_, body) = send(&app, request(Method::GET, "/api/plugins/trending?limit=1", None)).await;
    assert_eq!(body["data"][0]["name"], "Workshop Map Loader");

    let (_, body) = send(&app, request(Method::GET, "/api/plugins/search?q=RANK", None)).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["searchTerm"], "RANK");
}

#[tokio::test]
async fn test_rate_limit() {
    let app = app_with(config(None, 2), Box::new(InMemoryStorage::default())).await;
    for remaining in ["1", "0"] {
        let response = app.clone().oneshot(request(Method::GET, "/api/terms", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ratelimit-remaining"], remaining);
    }
    let (status, body) = send(&app, request(Method::GET, "/api/terms", None)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_submissions_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tirl.db.json");

    let app = app_with(config(Some(ADMIN_KEY), 1000), Box::new(FileStorage::new(&db_path).unwrap())).await;
    let id = create_and_publish_term(&app).await;
    send(&app, request(Method::POST, &format!("/api/terms/{}/like", id), None)).await;
    drop(app);

    let app = app_with(config(Some(ADMIN_KEY), 1000), Box::new(FileStorage::new(&db_path).unwrap())).await;
    let (status, body) = send(&app, request(Method::GET, &format!("/api/terms/{}", id), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["likeCount"], 1);
    assert_eq!(body["data"]["status"], "published");
}
