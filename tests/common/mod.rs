#![allow(dead_code)]

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::{header, StatusCode},
    test, web, App,
};
use serde_json::{json, Value};
use std::sync::Arc;

use postboard::auth::{AccessPolicy, PasswordHasher, Permission, TokenAuthentication};
use postboard::routes::{self, health};
use postboard::serializers::RegisterResponse;
use postboard::store::{MemoryStore, Store};

/// Lowest bcrypt cost, keeps the suite fast.
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn memory_store() -> web::Data<dyn Store> {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    web::Data::from(store)
}

/// The full application over a fresh in-memory store.
pub async fn init_app(
    content_permission: Permission,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    init_app_with(memory_store(), content_permission).await
}

pub async fn init_app_with(
    store: web::Data<dyn Store>,
    content_permission: Permission,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(store)
            .app_data(web::Data::new(PasswordHasher::new(TEST_BCRYPT_COST)))
            .app_data(web::Data::new(AccessPolicy::new(content_permission)))
            .wrap(TokenAuthentication)
            .service(health::health)
            .configure(routes::config),
    )
    .await
}

/// Sends a JSON request and returns the status with the parsed body
/// (`Value::Null` for an empty body).
pub async fn send(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    req: test::TestRequest,
) -> (StatusCode, Value) {
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| {
            panic!("non-JSON body: {}", String::from_utf8_lossy(&body))
        })
    };
    (status, json)
}

pub fn with_token(req: test::TestRequest, token: &str) -> test::TestRequest {
    req.insert_header((header::AUTHORIZATION, format!("Token {}", token)))
}

pub async fn register(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    username: &str,
    password: &str,
) -> RegisterResponse {
    let req = test::TestRequest::post()
        .uri("/users/register/")
        .set_json(json!({ "username": username, "password": password }));
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);
    serde_json::from_value(body).expect("Failed to parse registration response JSON")
}
