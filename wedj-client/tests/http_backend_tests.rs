//! HTTP render backend tests against an in-process axum mock server

use axum::extract::Query;
use axum::http::{header, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use wedj_client::backend::{FolderId, HttpRenderBackend, RenderBackend, SearchReply, ThumbnailSlot};
use wedj_client::coordinator::{PollPolicy, TransitionCoordinator};
use wedj_client::BackendError;
use wedj_common::events::{AssetKind, EventBus, SettleOutcome};

type Params = Query<HashMap<String, String>>;

async fn search_song(Query(params): Params) -> Response {
    match params.get("query").map(String::as_str) {
        Some("Strobe Deadmau5 official audio") => Json(json!({
            "folder": "f1",
            "current-song": "Strobe%20-%20Deadmau5.mp3",
            "transition-song": "Ghosts%20'n'%20Stuff%20-%20Deadmau5.mp3",
        }))
        .into_response(),
        Some("legacy official audio") => (
            [
                (header::CONTENT_TYPE, "audio/mpeg"),
                (HeaderName::from_static("x-song-title"), "Opus%20-%20Eric%20Prydz.mp3"),
                (HeaderName::from_static("x-thumbnail-url"), "https://img.example/opus.jpg"),
            ],
            b"legacy-mix".to_vec(),
        )
            .into_response(),
        Some("page official audio") => {
            ([(header::CONTENT_TYPE, "text/html")], "<html></html>").into_response()
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn get_song(Query(params): Params) -> Response {
    match params.get("folder_uuid").map(String::as_str) {
        Some("f1") => ([(header::CONTENT_TYPE, "audio/mpeg")], b"mix-f1".to_vec()).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn get_thumbnail(Query(params): Params) -> Response {
    let folder = params.get("folder_uuid").cloned().unwrap_or_default();
    let which = params.get("which").cloned().unwrap_or_default();
    if folder != "f1" {
        return StatusCode::NOT_FOUND.into_response();
    }
    ([(header::CONTENT_TYPE, "image/jpeg")], format!("{}-{}", folder, which)).into_response()
}

async fn create_playlist(Json(body): Json<Value>) -> Response {
    let songs = body["songs"].as_array().map(Vec::len).unwrap_or(0);
    Json(json!(format!("pl-{}", songs))).into_response()
}

async fn get_playlist(Query(params): Params) -> Response {
    match params.get("playlist_uuid").map(String::as_str) {
        Some("pl-3") => ([(header::CONTENT_TYPE, "audio/mpeg")], b"playlist-mix".to_vec()).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Start the mock backend, returning its base URL
async fn spawn_mock_backend() -> String {
    let app = Router::new()
        .route("/api/search_song", get(search_song))
        .route("/api/get_song", get(get_song))
        .route("/api/get_thumbnail", get(get_thumbnail))
        .route("/api/create_playlist", post(create_playlist))
        .route("/api/get_playlist", get(get_playlist));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn backend() -> HttpRenderBackend {
    let base_url = spawn_mock_backend().await;
    HttpRenderBackend::new(&base_url, "official audio").unwrap()
}

#[tokio::test]
async fn test_search_returns_job_descriptor() {
    let backend = backend().await;

    let reply = backend.search("Strobe Deadmau5").await.unwrap();
    let SearchReply::Job(job) = reply else {
        panic!("expected a job descriptor");
    };
    assert_eq!(job.folder, FolderId::new("f1"));
    assert_eq!(job.current_song, "Strobe%20-%20Deadmau5.mp3");
}

#[tokio::test]
async fn test_search_accepts_legacy_audio_reply() {
    let backend = backend().await;

    let reply = backend.search("legacy").await.unwrap();
    let SearchReply::Direct(direct) = reply else {
        panic!("expected a direct audio reply");
    };
    assert_eq!(direct.audio.bytes, b"legacy-mix");
    assert_eq!(direct.audio.content_type.as_deref(), Some("audio/mpeg"));
    assert_eq!(direct.song_title.as_deref(), Some("Opus%20-%20Eric%20Prydz.mp3"));
    assert_eq!(direct.thumbnail_url.as_deref(), Some("https://img.example/opus.jpg"));
}

#[tokio::test]
async fn test_search_rejects_unexpected_content_type() {
    let backend = backend().await;
    assert!(matches!(
        backend.search("page").await,
        Err(BackendError::Malformed(_))
    ));
}

#[tokio::test]
async fn test_search_status_error() {
    let backend = backend().await;
    assert_eq!(
        backend.search("unknown").await.unwrap_err(),
        BackendError::Status(500)
    );
}

#[tokio::test]
async fn test_asset_endpoints() {
    let backend = backend().await;
    let folder = FolderId::new("f1");

    let song = backend.get_song(&folder).await.unwrap();
    assert_eq!(song.bytes, b"mix-f1");

    let thumbnail = backend.get_thumbnail(&folder, ThumbnailSlot::Transition).await.unwrap();
    assert_eq!(thumbnail.bytes, b"f1-transition");
    let thumbnail = backend.fetch_asset(&folder, AssetKind::CurrentThumbnail).await.unwrap();
    assert_eq!(thumbnail.bytes, b"f1-current");
    assert_eq!(thumbnail.content_type.as_deref(), Some("image/jpeg"));
}

#[tokio::test]
async fn test_missing_asset_is_status_error() {
    let backend = backend().await;
    assert_eq!(
        backend.get_song(&FolderId::new("nope")).await.unwrap_err(),
        BackendError::Status(404)
    );
}

#[tokio::test]
async fn test_playlist_round_trip() {
    let backend = backend().await;
    let songs = vec!["A".to_string(), "B".to_string(), "C".to_string()];

    let id = backend.create_playlist(&songs).await.unwrap();
    assert_eq!(id, FolderId::new("pl-3"));
    let mix = backend.get_playlist(&id).await.unwrap();
    assert_eq!(mix.bytes, b"playlist-mix");
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let backend = HttpRenderBackend::new("http://127.0.0.1:1", "").unwrap();
    assert!(matches!(
        backend.search("anything").await,
        Err(BackendError::Network(_))
    ));
}

#[tokio::test]
async fn test_coordinator_over_http() {
    let backend = Arc::new(backend().await);
    let policy = PollPolicy {
        interval: Duration::from_millis(10),
        max_attempts: 20,
    };
    let coordinator = TransitionCoordinator::new(backend, policy, EventBus::new(16));

    let ticket = coordinator.search("Strobe Deadmau5").await.unwrap();
    assert_eq!(ticket.settled().await, SettleOutcome::Success);

    let view = coordinator.snapshot();
    let job = view.job.as_ref().unwrap();
    assert_eq!(job.transition_song_label, "Ghosts 'n' Stuff - Deadmau5");
    let audio = coordinator.media().get(view.transition_audio().unwrap()).unwrap();
    assert_eq!(audio.bytes, b"mix-f1");
}
