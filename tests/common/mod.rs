#![allow(dead_code)]

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{http::header, test, web};
use serde_json::{json, Value};
use taskguard::auth::TokenService;
use taskguard::store::MemoryStore;
use taskguard::AppState;

pub const PASSWORD: &str = "Passw0rd";

/// Fresh state over an empty in-memory store, with a cheap bcrypt cost.
pub fn test_state() -> web::Data<AppState> {
    let tokens = TokenService::new(
        "integration-secret",
        chrono::Duration::hours(1),
        "taskguard-api",
        "taskguard-client",
    );
    web::Data::new(AppState::new(Arc::new(MemoryStore::new()), tokens, 4))
}

/// Builds the application the way `main.rs` does, minus the database.
macro_rules! spawn_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .wrap(
                    actix_cors::Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(actix_web::middleware::Logger::default())
                .service(taskguard::routes::health::health)
                .service(actix_web::web::scope("/api/v1").configure(taskguard::routes::config))
                .default_service(actix_web::web::route().to(taskguard::routes::not_found)),
        )
        .await
    };
}

pub struct TestUser {
    pub id: i64,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

/// Sends a request and returns the status together with the parsed JSON body.
pub async fn send<S, B>(app: &S, req: actix_http::Request) -> (u16, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let body = test::read_body(resp).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|e| {
            panic!(
                "response was not JSON ({}): {}",
                e,
                String::from_utf8_lossy(&body)
            )
        })
    };
    (status, json)
}

pub async fn register<S, B>(app: &S, username: &str, role: Option<&str>) -> TestUser
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let mut payload = json!({
        "username": username,
        "email": format!("{}@example.com", username),
        "password": PASSWORD,
    });
    if let Some(role) = role {
        payload["role"] = json!(role);
    }
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(&payload)
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, 201, "registration of {} failed: {}", username, body);

    TestUser {
        id: body["data"]["user"]["id"].as_i64().expect("user id in response"),
        token: body["data"]["token"]
            .as_str()
            .expect("token in response")
            .to_string(),
    }
}

pub async fn create_task<S, B>(app: &S, user: &TestUser, payload: Value) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/tasks")
        .insert_header(user.bearer())
        .set_json(&payload)
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, 201, "task creation failed: {}", body);
    body["data"]["task"].clone()
}
