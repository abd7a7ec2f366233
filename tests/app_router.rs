use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt; // for oneshot
use user_admin::config::RoleCatalog;
use user_admin::create_app;
use user_admin::store::UserStore;

const BOUNDARY: &str = "user-admin-test-boundary";

fn app() -> axum::Router {
    create_app(Arc::new(UserStore::new(RoleCatalog::default(), "http://test")))
}

/// Hand-built multipart body; `image` adds a `profile_image` file part.
fn multipart_body(fields: &[(&str, &str)], image: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"profile_image\"; filename=\"a.png\"\r\n\
                 Content-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn post_users(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/users")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

const VALID: [(&str, &str); 5] = [
    ("name", "Grace Hopper"),
    ("email", "grace@example.com"),
    ("phone", "5550100123"),
    ("description", "Rear admiral and compiler pioneer"),
    ("role_id", "1"),
];

#[tokio::test]
async fn empty_listing() {
    let req = Request::builder().uri("/api/users").body(Body::empty()).unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["success"], Value::Bool(true));
    assert_eq!(body["data"], serde_json::json!([]));
}

#[tokio::test]
async fn valid_create_returns_the_record() {
    let resp = app()
        .oneshot(post_users(multipart_body(&VALID, Some(b"\x89PNG"))))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = json_body(resp).await;
    assert_eq!(body["data"]["id"], 1);
    assert_eq!(body["data"]["role_name"], "Admin");
    assert_eq!(body["data"]["profile_image"], "http://test/api/users/1/profile_image");
}

#[tokio::test]
async fn invalid_create_lists_errors_at_top_level() {
    let fields = [
        ("name", "Al"),
        ("email", "grace@example.com"),
        ("phone", "123"),
        ("role_id", "1"),
    ];
    let resp = app()
        .oneshot(post_users(multipart_body(&fields, None)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json_body(resp).await;
    assert_eq!(body["success"], Value::Bool(false));
    let errors = body["errors"].as_object().expect("errors object");
    for key in ["name", "phone", "description", "profile_image"] {
        assert!(errors.contains_key(key), "missing {key}");
    }
    assert!(!errors.contains_key("email"));
    assert!(errors["name"].as_array().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn unknown_role_is_rejected() {
    let mut fields = VALID;
    fields[4] = ("role_id", "42");
    let resp = app()
        .oneshot(post_users(multipart_body(&fields, Some(b"\x89PNG"))))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(resp).await;
    assert!(body["errors"]["role_id"].is_array());
}

#[tokio::test]
async fn missing_profile_image_is_not_found() {
    let req = Request::builder()
        .uri("/api/users/7/profile_image")
        .body(Body::empty())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cors_preflight_wildcard_allows_origin() {
    let prev = std::env::var("ENABLE_CORS").ok();
    unsafe {
        std::env::set_var("ENABLE_CORS", "true");
    }

    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/users")
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "Content-Type")
        .body(Body::empty())
        .unwrap();
    let resp = app().oneshot(req).await.expect("request failed");

    if let Some(v) = prev {
        unsafe {
            std::env::set_var("ENABLE_CORS", v);
        }
    } else {
        unsafe {
            std::env::remove_var("ENABLE_CORS");
        }
    }

    assert!(resp.status().is_success());
    let allowed = resp
        .headers()
        .get("access-control-allow-origin")
        .and_then(|v| v.to_str().ok());
    assert!(matches!(allowed, Some("*") | Some("http://localhost:3000")));
    let methods = resp
        .headers()
        .get("access-control-allow-methods")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(methods.to_uppercase().contains("POST"));
}
