#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use kree_api::auth::jwt::{generate_access_token, JwtConfig};
use kree_api::config::{ServerConfig, StoreBackend};
use kree_api::router::build_app_router;
use kree_api::state::AppState;
use kree_core::negotiation::ExpiryPolicy;
use kree_core::roles::Role;
use kree_core::types::DbId;
use kree_db::models::car::{Car, CreateCar};
use kree_db::models::user::{CreateUser, User};
use kree_db::store::{MarketStore, MemoryStore};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults and the in-memory store.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:8081".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_token_expiry_mins: 60,
        },
        expiry: ExpiryPolicy::default(),
        store_backend: StoreBackend::Memory,
        database_url: None,
    }
}

/// The router plus the state behind it, so tests can seed the store and
/// inspect the socket registry.
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn store(&self) -> &dyn MarketStore {
        self.state.store.as_ref()
    }

    pub fn router(&self) -> Router {
        self.app.clone()
    }
}

/// Build the full application router over a fresh `MemoryStore`.
pub fn build_test_app() -> TestApp {
    build_test_app_with(test_config())
}

pub fn build_test_app_with(config: ServerConfig) -> TestApp {
    build_test_app_over(Arc::new(MemoryStore::new()), config)
}

/// Build the router over a caller-supplied store.
pub fn build_test_app_over(store: Arc<dyn MarketStore>, config: ServerConfig) -> TestApp {
    let state = AppState::new(store, config.clone());
    let app = build_app_router(state.clone(), &config);
    TestApp { app, state }
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

pub async fn seed_user(store: &dyn MarketStore, name: &str, role: Role) -> User {
    store
        .create_user(&CreateUser {
            name: name.to_string(),
            email: format!("{}@kree.test", name.to_lowercase().replace(' ', ".")),
            role,
            phone_number: None,
            city: Some("Rabat".to_string()),
        })
        .await
        .unwrap()
}

pub async fn seed_car(store: &dyn MarketStore, agency_id: DbId, model: &str, brand: &str) -> Car {
    store
        .create_car(&CreateCar {
            agency_id,
            model: model.to_string(),
            brand: brand.to_string(),
            color: "white".to_string(),
            fuel_type: "diesel".to_string(),
            gearbox: "manuelle".to_string(),
            seats: 5,
            km: 30_000,
            image_url: None,
        })
        .await
        .unwrap()
}

pub fn token_for(user: &User) -> String {
    token(user.id, user.role.as_str())
}

pub fn token(user_id: DbId, role: &str) -> String {
    let config = JwtConfig {
        secret: TEST_SECRET.to_string(),
        access_token_expiry_mins: 60,
    };
    generate_access_token(user_id, role, &config).unwrap()
}

/// A valid proposal body for 300..500 MAD, 1-5 July, Rabat to Casablanca.
pub fn proposal_body(car_id: Option<DbId>) -> Value {
    json!({
        "carId": car_id,
        "model": "Clio",
        "gearbox": "manuelle",
        "fuelType": "diesel",
        "seats": 5,
        "features": ["gps"],
        "priceMin": 300.0,
        "priceMax": 500.0,
        "startDate": NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        "endDate": NaiveDate::from_ymd_opt(2025, 7, 5).unwrap(),
        "pickupLocation": "Rabat",
        "returnLocation": "Casablanca",
    })
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&value).unwrap())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn put_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), None).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}
