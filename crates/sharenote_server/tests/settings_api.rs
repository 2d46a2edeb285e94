mod common;

use axum::http::StatusCode;
use common::{TestApp, ADMIN, U1};
use serde_json::json;
use sharenote_core::AppSettings;

const PERMISSIONS: &str = "/api/v1/config/permissions";

#[tokio::test]
async fn non_admin_cannot_read_or_change_settings() {
    let app = TestApp::new().await;

    let (status, _) = app.get(PERMISSIONS, Some(U1)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post(PERMISSIONS, Some(U1), json!({"enable_notes": false}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.state.settings().snapshot(), AppSettings::default());
}

#[tokio::test]
async fn admin_update_applies_to_the_next_request() {
    let app = TestApp::new().await;

    let (status, body) = app.get(PERMISSIONS, Some(ADMIN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_permissions"]["features"]["notes"], true);

    let (status, _) = app
        .post(
            PERMISSIONS,
            Some(ADMIN),
            json!({"enable_notes": true, "user_permissions": {"features": {"notes": false}}}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/api/v1/notes/", Some(U1)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.get("/api/v1/notes/", Some(ADMIN)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn disabling_notes_closes_them_for_admins_too() {
    let app = TestApp::new().await;
    app.set_settings(AppSettings {
        enable_notes: false,
        ..AppSettings::default()
    });

    let (status, _) = app
        .post("/api/v1/notes/create", Some(ADMIN), json!({"title": "x"}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.count_notes().await, 0);
}
