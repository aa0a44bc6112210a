// SPDX-License-Identifier: MIT

//! Profile API authentication and validation tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_profile_api_without_session_is_unauthorized() {
    for (method, path) in [
        ("GET", "/api/profile"),
        ("DELETE", "/api/profile"),
        ("POST", "/api/profile/notifications"),
        ("DELETE", "/api/profile/avatar"),
    ] {
        let (app, _) = common::create_test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(path)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {path}");
        // API callers get a 401 body, never the page-route redirect.
        assert!(response.headers().get(header::LOCATION).is_none());
    }
}

#[tokio::test]
async fn test_short_password_is_rejected_before_reaching_the_collaborator() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/profile/password")
                .header(header::COOKIE, common::session_cookie_header("u-1"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"new_password": "short"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_avatar_upload_rejects_invalid_base64() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/profile/avatar")
                .header(header::COOKIE, common::session_cookie_header("u-1"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"filename": "a.png", "content_type": "image/png", "data": "%%%not-base64%%%"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_avatar_upload_rejects_non_image_content_type() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/profile/avatar")
                .header(header::COOKIE, common::session_cookie_header("u-1"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"filename": "a.pdf", "content_type": "application/pdf", "data": "aGVsbG8="}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_rejects_malformed_email() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"email": "not-an-email", "password": "longenough"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_always_clears_session_cookies() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let cookies: Vec<String> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();

    assert!(cookies.iter().any(|c| c.starts_with("pf_access_token=")));
    assert!(cookies.iter().any(|c| c.starts_with("pf_refresh_token=")));
    for cookie in &cookies {
        assert!(cookie.contains("Max-Age=0"), "cookie not cleared: {cookie}");
    }
}
