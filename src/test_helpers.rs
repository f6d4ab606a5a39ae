/// Shared test helpers: an in-memory database with the schema applied, an app
/// router on top of it, and builders for operators and stations.
use crate::common::auth::{CredentialVerifier, PlaintextVerifier, Principal, resolve_principal};
use crate::common::state::AppState;
use crate::config::Config;
use crate::operators::services::{RegisterOperatorOutcome, register_operator};
use crate::routes::build_router;
use crate::stations::models::{Station, StationCreate};
use crate::stations::services::{AddStationOutcome, add_station};
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

/// Fresh SQLite database living as long as the returned connection.
///
/// The pool is capped at one connection: every new in-memory connection would
/// otherwise see its own empty database.
pub async fn setup_test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to connect to test database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run database migrations");
    db
}

pub fn test_state(db: DatabaseConnection) -> AppState {
    AppState::new(db, Config::for_tests(), Arc::new(PlaintextVerifier))
}

pub async fn setup_test_app() -> (axum::Router, DatabaseConnection) {
    let db = setup_test_db().await;
    let router = build_router(&test_state(db.clone()));
    (router, db)
}

/// Register an operator (password `<username>-pw`) and return it as a principal.
pub async fn create_operator(db: &DatabaseConnection, username: &str) -> Principal {
    let outcome = register_operator(db, &PlaintextVerifier, username, &format!("{username}-pw"))
        .await
        .expect("Failed to register operator");
    let RegisterOperatorOutcome::Registered(_) = outcome else {
        panic!("Operator {username} already exists");
    };
    principal_for(db, username).await
}

pub async fn create_station(
    db: &DatabaseConnection,
    owner: &Principal,
    longitude: f64,
    latitude: f64,
    api_key: &str,
) -> Station {
    let data = StationCreate {
        longitude,
        latitude,
        api_key: api_key.to_string(),
    };
    match add_station(db, &PlaintextVerifier, owner, data)
        .await
        .expect("Failed to add station")
    {
        AddStationOutcome::Created(station) => station,
        other => panic!("Expected station to be created, got {other:?}"),
    }
}

/// Principal a request carrying `Authorization: Bearer <token>` resolves to.
pub async fn principal_for(db: &DatabaseConnection, token: &str) -> Principal {
    principal_with(db, &PlaintextVerifier, token).await
}

pub async fn principal_with(
    db: &DatabaseConnection,
    verifier: &dyn CredentialVerifier,
    token: &str,
) -> Principal {
    resolve_principal(db, verifier, Some(&format!("Bearer {token}")))
        .await
        .expect("Failed to resolve principal")
}

/// Extract response body as JSON for testing
pub async fn extract_response_body(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    if bytes.is_empty() {
        return (status, Value::Null);
    }
    let body: Value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| json!({"error": "Invalid JSON response"}));
    (status, body)
}

/// Send a JSON request, optionally with a bearer token, and return status and body.
pub async fn send_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    extract_response_body(response).await
}
