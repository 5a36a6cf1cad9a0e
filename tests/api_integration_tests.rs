//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use shield_cache::{
    api::create_router,
    upstream::{PublicUser, RateLimit, UserDirectory},
    AppState, Cache, CacheError, Config,
};
use tower::ServiceExt;

// == Helper Functions ==

/// In-memory stand-in for the upstream API.
#[derive(Default)]
struct FakeDirectory {
    calls: AtomicUsize,
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn get_user(&self, login: &str) -> shield_cache::Result<PublicUser> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match login {
            "missing" => Err(CacheError::Upstream("lookup returned 404".into())),
            _ => Ok(PublicUser {
                id: 42,
                login: login.to_string(),
                followers: 7,
                ..PublicUser::default()
            }),
        }
    }

    fn rate_limit(&self) -> Option<RateLimit> {
        Some(RateLimit {
            limit: 60,
            remaining: 60 - self.calls.load(Ordering::SeqCst) as i64,
            reset: 0,
        })
    }
}

fn create_test_app() -> (Router, Arc<FakeDirectory>) {
    let directory = Arc::new(FakeDirectory::default());
    let config = Config {
        max_limit: 3,
        ..Config::default()
    };
    let state = AppState::new(Arc::new(Cache::new()), directory.clone(), config);
    (create_router(state), directory)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn put_json(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// == SET / GET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(put_json("/set", r#"{"key":"test_key","value":"test_value"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("test_key"));
}

#[tokio::test]
async fn test_set_endpoint_empty_key() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(put_json("/set", r#"{"key":"","value":"v"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_get_endpoint_success() {
    let (app, _) = create_test_app();

    let set_response = app
        .clone()
        .oneshot(put_json("/set", r#"{"key":"get_key","value":"get_value","ttl":60}"#))
        .await
        .unwrap();
    assert_eq!(set_response.status(), StatusCode::OK);

    let get_response = app.oneshot(request("GET", "/get/get_key")).await.unwrap();

    assert_eq!(get_response.status(), StatusCode::OK);
    let json = body_to_json(get_response.into_body()).await;
    assert_eq!(json["key"], "get_key");
    assert_eq!(json["value"], "get_value");
    assert!(json["expire_at"].is_string());
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(request("GET", "/get/nonexistent_key"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("nonexistent_key"));
}

// == DELETE / CLEAR Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint() {
    let (app, _) = create_test_app();

    app.clone()
        .oneshot(put_json("/set", r#"{"key":"delete_key","value":"v"}"#))
        .await
        .unwrap();

    let first = app
        .clone()
        .oneshot(request("DELETE", "/del/delete_key"))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .clone()
        .oneshot(request("DELETE", "/del/delete_key"))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::NOT_FOUND);

    let get_response = app.oneshot(request("GET", "/get/delete_key")).await.unwrap();
    assert_eq!(get_response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clear_endpoint() {
    let (app, _) = create_test_app();

    for body in [
        r#"{"key":"a","value":"1"}"#,
        r#"{"key":"b","value":"2"}"#,
    ] {
        app.clone().oneshot(put_json("/set", body)).await.unwrap();
    }

    let response = app.clone().oneshot(request("DELETE", "/clear")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    for uri in ["/get/a", "/get/b"] {
        let response = app.clone().oneshot(request("GET", uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

// == STATS / HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let (app, _) = create_test_app();

    app.clone()
        .oneshot(put_json("/set", r#"{"key":"stats_key","value":"v"}"#))
        .await
        .unwrap();
    app.clone()
        .oneshot(request("GET", "/get/stats_key"))
        .await
        .unwrap();
    app.clone()
        .oneshot(request("GET", "/get/missing_key"))
        .await
        .unwrap();

    let response = app.oneshot(request("GET", "/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["total_entries"], 1);
    assert_eq!(json["hit_rate"], 0.5);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = create_test_app();

    let response = app.oneshot(request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
}

// == USERS Endpoint Tests ==

#[tokio::test]
async fn test_users_endpoint_sorts_and_caches() {
    let (app, directory) = create_test_app();

    let response = app
        .clone()
        .oneshot(request("GET", "/users?name=zoe&name=adam"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    let logins: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["login"].as_str().unwrap())
        .collect();
    assert_eq!(logins, vec!["adam", "zoe"]);

    let again = app
        .clone()
        .oneshot(request("GET", "/users?name=adam"))
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::OK);
    assert_eq!(directory.calls.load(Ordering::SeqCst), 2);

    let cached = app.oneshot(request("GET", "/get/user:adam")).await.unwrap();
    assert_eq!(cached.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_users_endpoint_unaffected_by_plain_key_with_same_name() {
    let (app, directory) = create_test_app();

    let set_response = app
        .clone()
        .oneshot(put_json("/set", r#"{"key":"octocat","value":"hello"}"#))
        .await
        .unwrap();
    assert_eq!(set_response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request("GET", "/users?name=octocat"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json[0]["login"], "octocat");
    assert_eq!(directory.calls.load(Ordering::SeqCst), 1);

    let plain = app.oneshot(request("GET", "/get/octocat")).await.unwrap();
    let json = body_to_json(plain.into_body()).await;
    assert_eq!(json["value"], "hello");
}

#[tokio::test]
async fn test_users_endpoint_recovers_from_overwritten_user_entry() {
    let (app, directory) = create_test_app();

    app.clone()
        .oneshot(put_json("/set", r#"{"key":"user:octocat","value":"hello"}"#))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request("GET", "/users?name=octocat"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(directory.calls.load(Ordering::SeqCst), 1);

    let again = app
        .oneshot(request("GET", "/users?name=octocat"))
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::OK);
    assert_eq!(directory.calls.load(Ordering::SeqCst), 1, "refetched entry is cached");
}

#[tokio::test]
async fn test_users_endpoint_requires_name() {
    let (app, _) = create_test_app();

    let response = app.oneshot(request("GET", "/users")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("name required"));
}

#[tokio::test]
async fn test_users_endpoint_rejects_empty_name() {
    let (app, directory) = create_test_app();

    for uri in ["/users?name=", "/users?name=adam&name=", "/users?name=.."] {
        let response = app.clone().oneshot(request("GET", uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_to_json(response.into_body()).await;
        assert!(json["error"].as_str().unwrap().contains("empty"));
    }
    assert_eq!(directory.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_users_endpoint_enforces_limit() {
    let (app, directory) = create_test_app();

    let response = app
        .oneshot(request("GET", "/users?name=a&name=b&name=c&name=d"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(directory.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_users_endpoint_upstream_failure() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(request("GET", "/users?name=missing"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_rate_limit_endpoint() {
    let (app, _) = create_test_app();

    app.clone()
        .oneshot(request("GET", "/users?name=octocat"))
        .await
        .unwrap();
    let response = app.oneshot(request("GET", "/rate_limit")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["limit"], 60);
    assert_eq!(json["remaining"], 59);
}
