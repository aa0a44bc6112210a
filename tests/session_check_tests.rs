// SPDX-License-Identifier: MIT

//! Client re-check endpoint tests.
//!
//! The endpoint shares the guard's pure classify/resolve functions, so its
//! verdicts must line up with the redirects the guard itself issues.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

async fn check(path_param: &str, cookie: Option<String>) -> serde_json::Value {
    let (app, _) = common::create_test_app();

    let mut builder = Request::builder().uri(format!(
        "/api/session?path={}",
        urlencoding::encode(path_param)
    ));
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let response = app
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_anonymous_client_on_protected_path_is_told_to_leave() {
    let payload = check("/home", None).await;

    assert_eq!(payload["authenticated"], serde_json::json!(false));
    assert_eq!(
        payload["redirect"],
        serde_json::json!("/login?redirectTo=%2Fhome")
    );
}

#[tokio::test]
async fn test_authenticated_client_on_login_is_sent_home() {
    let payload = check("/login", Some(common::session_cookie_header("u-1"))).await;

    assert_eq!(payload["authenticated"], serde_json::json!(true));
    assert_eq!(payload["redirect"], serde_json::json!("/home"));
}

#[tokio::test]
async fn test_authenticated_client_on_protected_path_stays_put() {
    let payload = check("/home", Some(common::session_cookie_header("u-7"))).await;

    assert_eq!(payload["authenticated"], serde_json::json!(true));
    assert_eq!(payload["user"]["id"], serde_json::json!("u-7"));
    assert!(payload.get("redirect").is_none());
}

#[tokio::test]
async fn test_anonymous_client_on_public_path_stays_put() {
    let payload = check("/gallery", None).await;

    assert_eq!(payload["authenticated"], serde_json::json!(false));
    assert!(payload.get("redirect").is_none());
}

#[tokio::test]
async fn test_re_check_reuses_the_guard_session_after_a_refresh() {
    // Only a refresh cookie: the guard's evaluation refreshes once and
    // injects the session. The handler must reuse that session (a second
    // evaluation could spend a rotated refresh token and read the visitor
    // as anonymous) and must not attach a second cookie pair.
    let (app, _) = common::create_refreshing_test_app("u-9");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/session?path=%2Fhome")
                .header(header::COOKIE, "pf_refresh_token=rt-old")
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
    assert_eq!(cookies.len(), 2, "one refreshed pair, attached once");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(payload["authenticated"], serde_json::json!(true));
    assert_eq!(payload["user"]["id"], serde_json::json!("u-9"));
    assert!(payload.get("redirect").is_none());
}

#[tokio::test]
async fn test_re_check_converges_in_one_redirect() {
    // Follow the redirect the endpoint issues and re-check at the target:
    // the second verdict must be "stay put".
    let first = check("/home", None).await;
    let target = first["redirect"].as_str().unwrap().to_string();
    let bare_target = target.split('?').next().unwrap().to_string();

    let second = check(&bare_target, None).await;
    assert!(second.get("redirect").is_none());
}
