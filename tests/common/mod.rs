#![allow(dead_code)]

use std::sync::{Arc, Once};

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::test;
use serde_json::Value;

use boardforge::auth::generate_token;
use boardforge::models::NewUser;
use boardforge::{InMemoryStore, Store};

pub const TEST_JWT_SECRET: &str = "integration-test-secret";
pub const TEST_PASSWORD: &str = "password123";

static JWT_INIT: Once = Once::new();

pub fn init_jwt_secret() {
    JWT_INIT.call_once(|| std::env::set_var("JWT_SECRET", TEST_JWT_SECRET));
}

/// Builds the application exactly as `main` does, on top of the given store.
#[macro_export]
macro_rules! test_app {
    ($store:expr) => {{
        let store: boardforge::SharedStore = $store;
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::from(store))
                .wrap(actix_web::middleware::NormalizePath::trim())
                .service(boardforge::routes::health::health)
                .service(
                    actix_web::web::scope("/api")
                        .wrap(boardforge::auth::AuthMiddleware)
                        .configure(boardforge::routes::config),
                ),
        )
        .await
    }};
}

pub struct TestUser {
    pub id: i32,
    pub token: String,
    pub email: String,
}

impl TestUser {
    pub fn bearer(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

pub fn new_store() -> Arc<InMemoryStore> {
    init_jwt_secret();
    Arc::new(InMemoryStore::new())
}

/// Inserts a user straight into the store and issues a token for them.
pub async fn seed_user(store: &InMemoryStore, first_name: &str) -> TestUser {
    init_jwt_secret();
    let email = format!("{}@example.com", first_name.to_lowercase());
    let user = store
        .insert_user(NewUser {
            email: email.clone(),
            first_name: first_name.to_string(),
            last_name: "Tester".to_string(),
            password_hash: bcrypt::hash(TEST_PASSWORD, 4).unwrap(),
        })
        .await
        .unwrap();
    TestUser {
        id: user.id,
        token: generate_token(user.id).unwrap(),
        email,
    }
}

/// Calls the service and returns status plus JSON body (`Null` when empty).
/// Errors raised by middleware are rendered the way the server would render them.
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = match app.call(req).await {
        Ok(resp) => {
            let status = resp.status();
            (status, test::read_body(resp).await)
        }
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            let body = actix_web::body::to_bytes(resp.into_body())
                .await
                .unwrap_or_default();
            (status, body)
        }
    };
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

pub fn ids(value: &Value) -> Vec<i64> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(|item| item["id"].as_i64()).collect())
        .unwrap_or_default()
}
