//! HTTP route tests driven through the router with `tower::ServiceExt`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use club_video_library::config::Config;
use club_video_library::db::{upsert_videos, Database, VideoRecord};
use club_video_library::sync::{Clock, SyncCoordinator, SystemClock};
use club_video_library::web::{create_app, AppState};
use club_video_library::youtube::PlaylistFetcher;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

fn video(id: &str, title: &str, published_at: &str, collections: &[&str], tags: &[&str]) -> VideoRecord {
    VideoRecord {
        id: id.to_string(),
        title: title.to_string(),
        original_title: title.to_string(),
        thumbnail: format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg"),
        published_at: published_at.to_string(),
        link: VideoRecord::watch_url(id),
        collections: collections.iter().map(ToString::to_string).collect(),
        tags: tags.iter().map(ToString::to_string).collect(),
    }
}

/// App over a freshly synced library with no live credentials, so no read
/// ever reaches upstream.
async fn setup_app(config: Config) -> (Router, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db = Database::new(&temp_dir.path().join("videos.sqlite"))
        .await
        .expect("Failed to create database");

    let library = vec![
        video("mon1", "Armbar från guard", "2024-03-04T18:00:00Z", &["Måndagspass"], &["Armbar"]),
        video("nogi1", "Heel hook", "2024-03-06T18:00:00Z", &["No-Gi"], &["Leglock"]),
        video("gi1", "Kragchoke", "2024-02-20T18:00:00Z", &["Gi (Dräkt)", "Måndagspass"], &[]),
    ];
    upsert_videos(db.pool(), &library, SystemClock.now_millis())
        .await
        .expect("Failed to seed videos");

    let fetcher = PlaylistFetcher::new(config.youtube.clone()).expect("Failed to build fetcher");
    let sync = SyncCoordinator::new(
        Arc::new(db),
        Arc::new(fetcher),
        Arc::new(SystemClock),
        config.sync_cooldown,
    );

    let app = create_app(AppState {
        sync,
        config: Arc::new(config),
    });
    (app, temp_dir)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn ids(body: &Value) -> Vec<&str> {
    body.as_array()
        .expect("expected a JSON array")
        .iter()
        .map(|v| v["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let (app, _temp_dir) = setup_app(Config::for_testing()).await;

    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_list_videos_newest_first() {
    let (app, _temp_dir) = setup_app(Config::for_testing()).await;

    let (status, body) = get(app, "/api/videos").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["nogi1", "mon1", "gi1"]);
    assert_eq!(body[1]["originalTitle"], "Armbar från guard");
    assert_eq!(body[1]["publishedAt"], "2024-03-04T18:00:00Z");
}

#[tokio::test]
async fn test_list_videos_search_and_date() {
    let (app, _temp_dir) = setup_app(Config::for_testing()).await;

    let (_, body) = get(app.clone(), "/api/videos?q=leglock").await;
    assert_eq!(ids(&body), vec!["nogi1"]);

    let (_, body) = get(app.clone(), "/api/videos?q=m%C3%A5ndag").await;
    assert_eq!(ids(&body), vec!["mon1", "gi1"]);

    let (_, body) = get(app.clone(), "/api/videos?date=2024-02-20").await;
    assert_eq!(ids(&body), vec!["gi1"]);

    let (_, body) = get(app, "/api/videos?q=armbar&date=2024-02-20").await;
    assert!(ids(&body).is_empty());
}

#[tokio::test]
async fn test_video_detail() {
    let (app, _temp_dir) = setup_app(Config::for_testing()).await;

    let (status, body) = get(app.clone(), "/api/videos/mon1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Armbar från guard");
    assert_eq!(body["link"], "https://youtube.com/watch?v=mon1");

    let (status, body) = get(app, "/api/videos/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Video not found");
}

#[tokio::test]
async fn test_collections() {
    let (app, _temp_dir) = setup_app(Config::for_testing()).await;

    let (status, body) = get(app.clone(), "/api/collections").await;
    assert_eq!(status, StatusCode::OK);
    let monday = body
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["title"] == "Måndagspass")
        .expect("Måndagspass listed");
    assert_eq!(monday["count"], 2);

    let (status, body) = get(app.clone(), "/api/collections/no-gi").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "No-Gi");
    assert_eq!(ids(&body["videos"]), vec!["nogi1"]);

    let (_, body) = get(app.clone(), "/api/collections/leglock").await;
    assert_eq!(body["description"], "Videos taggade med \"Leglock\"");

    let (_, body) = get(app.clone(), "/api/collections/all").await;
    assert_eq!(body["title"], "Alla Pass");
    assert_eq!(body["videos"].as_array().unwrap().len(), 3);

    let (status, _) = get(app, "/api/collections/finns-inte").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_requires_token() {
    let (app, _temp_dir) = setup_app(Config::for_testing()).await;

    let (status, body) = send(
        app.clone(),
        Request::builder()
            .method("POST")
            .uri("/api/admin/sync")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Admin token required");

    let (status, _) = send(
        app,
        Request::builder()
            .uri("/api/admin/status")
            .header(header::AUTHORIZATION, "Bearer wrong")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_disabled_without_configured_token() {
    let config = Config {
        admin_token: None,
        ..Config::for_testing()
    };
    let (app, _temp_dir) = setup_app(config).await;

    let (status, body) = send(
        app,
        Request::builder()
            .method("POST")
            .uri("/api/admin/sync")
            .header(header::AUTHORIZATION, "Bearer test-admin-token")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access is disabled");
}

#[tokio::test]
async fn test_admin_sync_failure_is_bad_gateway() {
    let (app, _temp_dir) = setup_app(Config::for_testing()).await;

    let (status, body) = send(
        app,
        Request::builder()
            .method("POST")
            .uri("/api/admin/sync")
            .header(header::AUTHORIZATION, "Bearer test-admin-token")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Sync failed:"));
}

#[tokio::test]
async fn test_admin_status() {
    let (app, _temp_dir) = setup_app(Config::for_testing()).await;

    let (status, body) = send(
        app,
        Request::builder()
            .uri("/api/admin/status")
            .header(header::AUTHORIZATION, "Bearer test-admin-token")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["videoCount"], 3);
    assert_eq!(body["cooldownSecs"], 3600);
    assert!(body["lastSynced"].is_i64());
    assert!(body["nextAutoSyncAt"].is_string());
}
