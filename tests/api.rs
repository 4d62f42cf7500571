//! Integration tests for the HTTP API

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use pomodorify::{
    api::responses::{ApiResponse, HealthResponse, StatusResponse},
    config::TimerSettings,
    create_router,
    services::SpotifyCredentials,
    state::{AppState, SessionPhase},
};

fn test_app() -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        8888,
        "127.0.0.1".to_string(),
        TimerSettings::default(),
        SpotifyCredentials::default(),
        None,
    ));
    (create_router(Arc::clone(&state)), state)
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn put_json(uri: &str, json: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, _) = test_app();
    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse = body_json(response).await;
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_timer_start_and_status() {
    let (app, _) = test_app();

    let response = app.clone().oneshot(post("/timer/start")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: ApiResponse = body_json(response).await;
    assert!(body.timer.is_running);
    assert_eq!(body.timer.phase, SessionPhase::Work);
    assert_eq!(body.timer.remaining_seconds, 25 * 60);

    let response = app.oneshot(get("/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let status: StatusResponse = body_json(response).await;
    assert!(status.timer.is_running);
    assert_eq!(status.last_action, Some("start".to_string()));
}

#[tokio::test]
async fn test_skip_enters_short_break() {
    let (app, _) = test_app();

    app.clone().oneshot(post("/timer/start")).await.unwrap();
    let response = app.oneshot(post("/timer/skip")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ApiResponse = body_json(response).await;
    assert_eq!(body.timer.phase, SessionPhase::ShortBreak);
    assert_eq!(body.timer.remaining_seconds, 5 * 60);
    assert_eq!(body.timer.completed_work_sessions, 1);
    assert_eq!(body.timer.break_session_count, 1);
}

#[tokio::test]
async fn test_reset_preserves_counters() {
    let (app, state) = test_app();

    app.clone().oneshot(post("/timer/skip")).await.unwrap();
    let before = state.get_snapshot().unwrap();

    let response = app.oneshot(post("/timer/reset")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: ApiResponse = body_json(response).await;

    assert!(!body.timer.is_running);
    assert_eq!(body.timer.completed_work_sessions, before.completed_work_sessions);
    assert_eq!(body.timer.work_session_count, before.work_session_count);
    assert_eq!(body.timer.break_session_count, before.break_session_count);
}

#[tokio::test]
async fn test_settings_validation() {
    let (app, _) = test_app();

    let invalid = r#"{
        "workMinutes": 0,
        "breakMinutes": 5,
        "longBreakMinutes": 15,
        "intervalsBeforeLongBreak": 4,
        "autoResumePlayback": true,
        "chimeEnabled": true
    }"#;
    let response = app.clone().oneshot(put_json("/settings", invalid)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let valid = r#"{
        "workMinutes": 50,
        "breakMinutes": 10,
        "longBreakMinutes": 20,
        "intervalsBeforeLongBreak": 2,
        "autoResumePlayback": false,
        "chimeEnabled": false
    }"#;
    let response = app.clone().oneshot(put_json("/settings", valid)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/settings")).await.unwrap();
    let settings: TimerSettings = body_json(response).await;
    assert_eq!(settings.work_minutes, 50);
    assert_eq!(settings.intervals_before_long_break, 2);
    assert!(!settings.auto_resume_playback);
}

#[tokio::test]
async fn test_settings_update_rescales_running_phase() {
    let (app, state) = test_app();

    app.clone().oneshot(post("/timer/start")).await.unwrap();
    state.advance_tick().unwrap();

    let valid = r#"{
        "workMinutes": 30,
        "breakMinutes": 5,
        "longBreakMinutes": 15,
        "intervalsBeforeLongBreak": 4,
        "autoResumePlayback": true,
        "chimeEnabled": true
    }"#;
    app.oneshot(put_json("/settings", valid)).await.unwrap();

    let snapshot = state.get_snapshot().unwrap();
    assert_eq!(snapshot.remaining_seconds, 30 * 60);
    assert!(snapshot.is_running);
}

#[tokio::test]
async fn test_external_playback_change_is_not_a_transition() {
    let (app, state) = test_app();

    app.clone().oneshot(post("/timer/start")).await.unwrap();
    let before = state.get_snapshot().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/playback/state")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"isPlaying": true}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(state.get_snapshot().unwrap(), before);

    let response = app.oneshot(get("/status")).await.unwrap();
    let status: StatusResponse = body_json(response).await;
    assert!(status.player.is_playing);
}

#[tokio::test]
async fn test_logout_resets_session() {
    let (app, state) = test_app();

    state.login("token-abc".to_string()).unwrap();
    app.clone().oneshot(post("/timer/start")).await.unwrap();
    app.clone().oneshot(post("/timer/skip")).await.unwrap();

    let response = app.clone().oneshot(post("/logout")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/status")).await.unwrap();
    let status: StatusResponse = body_json(response).await;
    assert_eq!(status.timer.phase, SessionPhase::Work);
    assert_eq!(status.timer.completed_work_sessions, 0);
    assert!(!status.timer.is_running);
    assert!(!status.player.authenticated);
}

#[tokio::test]
async fn test_callback_without_code_is_rejected() {
    let (app, _) = test_app();

    let response = app.oneshot(get("/callback")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("SPOTIFY_ERROR"));
    assert!(page.contains("window.opener.postMessage"));
}

#[tokio::test]
async fn test_login_redirects_to_spotify() {
    let (app, _) = test_app();

    let response = app.oneshot(get("/login")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with("https://accounts.spotify.com/authorize?"));
    assert!(location.contains("response_type=code"));
}
