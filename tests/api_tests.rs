use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use ride_journal::config::EnvironmentConfig;
use ride_journal::repositories::{JournalStore, MemoryJournalStore};
use ride_journal::utils::jwt::{generate_token, JwtConfig, READ_SCOPE, WRITE_SCOPE};
use ride_journal::{create_router, AppState};

fn create_test_app() -> (Router, JwtConfig) {
    let config = EnvironmentConfig {
        jwt_secret: "api-test-secret".to_string(),
        ..EnvironmentConfig::default()
    };
    let store: Arc<dyn JournalStore> = Arc::new(MemoryJournalStore::new());
    let state = AppState::new(store, config);
    let jwt = state.jwt.clone();
    (create_router(state), jwt)
}

fn token(jwt: &JwtConfig, driver: &str, scopes: &[&str]) -> String {
    generate_token(driver, scopes, jwt).unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Crea a "alice" con una ubicación "home" y devuelve (token, id de home)
async fn provision(app: &Router, jwt: &JwtConfig) -> (String, i64) {
    let alice = token(jwt, "alice", &[READ_SCOPE, WRITE_SCOPE]);
    let (status, _) = send(
        app,
        "POST",
        "/api/drivers",
        Some(&alice),
        Some(json!({"identifier": "alice", "objective": 100})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        "POST",
        "/api/drivers/alice/locations",
        Some(&alice),
        Some(json!({"name": "home", "latitude": 48.85, "longitude": 2.35})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let home = body["data"]["id"].as_i64().unwrap();
    (alice, home)
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = create_test_app();
    let (status, body) = send(&app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "ride-journal");
}

#[tokio::test]
async fn test_missing_or_invalid_token_is_unauthorized() {
    let (app, _) = create_test_app();

    let (status, body) = send(&app, "GET", "/api/drivers", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = send(&app, "GET", "/api/drivers", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_write_requires_write_scope() {
    let (app, jwt) = create_test_app();
    let read_only = token(&jwt, "alice", &[READ_SCOPE]);

    let (status, body) = send(
        &app,
        "POST",
        "/api/drivers",
        Some(&read_only),
        Some(json!({"identifier": "alice", "objective": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_ride_flow_over_http() {
    let (app, jwt) = create_test_app();
    let (alice, home) = provision(&app, &jwt).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/drivers/alice/rides",
        Some(&alice),
        Some(json!({
            "departure": {
                "moment": "2020-01-01T08:00:00",
                "location_id": home,
                "odometer_value": 1000
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["done"], false);
    let ride_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/drivers/alice/rides",
        Some(&alice),
        Some(json!({
            "departure": {
                "moment": "2020-01-01T08:10:00",
                "location_id": home,
                "odometer_value": 1010
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_STATE");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/drivers/alice/rides/{}/complete", ride_id),
        Some(&alice),
        Some(json!({
            "arrival": {
                "moment": "2020-01-01T08:30:00",
                "location_id": home,
                "odometer_value": 1020
            },
            "traffic_condition": "CALM",
            "comment": "smooth"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["done"], true);
    assert_eq!(body["data"]["distance"], 20);
    assert_eq!(body["data"]["traffic_condition"], "CALM");

    let (status, body) =
        send(&app, "GET", "/api/drivers/alice/rides?last=true", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], ride_id);

    let (status, body) =
        send(&app, "GET", "/api/drivers/alice/statistics", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rides"], 1);
    assert_eq!(body["total_distance"], 20);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/drivers/alice/rides/{}", ride_id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/drivers/alice/rides/{}", ride_id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_duplicate_location_is_conflict() {
    let (app, jwt) = create_test_app();
    let (alice, _) = provision(&app, &jwt).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/drivers/alice/locations",
        Some(&alice),
        Some(json!({"name": "home", "latitude": 0.0, "longitude": 0.0})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_other_driver_is_forbidden() {
    let (app, jwt) = create_test_app();
    provision(&app, &jwt).await;
    let mallory = token(&jwt, "mallory", &[READ_SCOPE, WRITE_SCOPE]);

    let (status, _) = send(&app, "GET", "/api/drivers/alice/rides", Some(&mallory), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "POST",
        "/api/drivers",
        Some(&mallory),
        Some(json!({"identifier": "alice2", "objective": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_payload_is_bad_request() {
    let (app, jwt) = create_test_app();
    let (alice, home) = provision(&app, &jwt).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/drivers/alice/stops",
        Some(&alice),
        Some(json!({"moment": "2020-01-01T08:00:00", "location_id": home, "odometer_value": -1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["details"]["odometer_value"].is_array());

    let (status, _) = send(
        &app,
        "POST",
        "/api/drivers/alice/locations",
        Some(&alice),
        Some(json!({"name": "pole", "latitude": 95.0, "longitude": 0.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
