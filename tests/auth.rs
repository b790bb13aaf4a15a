#[macro_use]
mod common;

use actix_web::{http::header, test};
use common::{register, send, test_state, PASSWORD};
use pretty_assertions::assert_eq;
use serde_json::json;

#[actix_rt::test]
async fn test_register_and_login_flow() {
    let state = test_state();
    let app = spawn_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(&json!({
            "username": "integration_user",
            "email": "Integration@Example.com",
            "password": PASSWORD
        }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 201, "Body: {}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["data"]["user"]["role"], "user");
    assert_eq!(body["data"]["user"]["email"], "integration@example.com");
    assert!(body["data"]["user"].get("password_hash").is_none());

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(&json!({ "email": "integration@example.com", "password": PASSWORD }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200, "Body: {}", body);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let claims = state.tokens.verify(&token).unwrap();
    assert_eq!(claims.username, "integration_user");

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/profile")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["user"]["username"], "integration_user");
}

#[actix_rt::test]
async fn test_duplicate_registration_messages() {
    let state = test_state();
    let app = spawn_app!(state);
    register(&app, "alice", None).await;

    let cases = vec![
        (
            json!({ "username": "other", "email": "alice@example.com", "password": PASSWORD }),
            "email",
            "User with this email already exists",
        ),
        (
            json!({ "username": "alice", "email": "fresh@example.com", "password": PASSWORD }),
            "username",
            "Username already taken",
        ),
    ];
    for (payload, field, expected) in cases {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(&payload)
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, 400);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], expected);
        assert_eq!(body["errors"][0]["field"], field);
        assert_eq!(body["errors"][0]["message"], expected);
    }
}

#[actix_rt::test]
async fn test_login_input_validation() {
    let state = test_state();
    let app = spawn_app!(state);
    register(&app, "valid_user", None).await;

    let test_cases = vec![
        (json!({ "password": PASSWORD }), 400, "missing email"),
        (json!({ "email": "valid_user@example.com" }), 400, "missing password"),
        (
            json!({ "email": "invalid-email", "password": PASSWORD }),
            400,
            "invalid email format",
        ),
        (
            json!({ "email": "valid_user@example.com", "password": "WrongPass1" }),
            401,
            "incorrect password",
        ),
        (
            json!({ "email": "nonexistent@example.com", "password": PASSWORD }),
            401,
            "non-existent user",
        ),
    ];

    for (payload, expected_status, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(&payload)
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(
            status, expected_status,
            "Test case failed: {}. Body: {}",
            description, body
        );
        if expected_status == 401 {
            assert_eq!(body["message"], "Invalid email or password");
        }
    }
}

#[actix_rt::test]
async fn test_register_validation_reports_fields() {
    let state = test_state();
    let app = spawn_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(&json!({ "username": "a b", "email": "nope", "password": "weak" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "Validation failed");

    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"username"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
}

#[actix_rt::test]
async fn test_register_rejects_overlong_email() {
    let state = test_state();
    let app = spawn_app!(state);

    let email = format!("{}@{}.com", "a".repeat(60), "b".repeat(50));
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(&json!({ "username": "long_mail", "email": email, "password": PASSWORD }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 400);
    assert_eq!(body["errors"][0]["field"], "email");
    assert_eq!(body["errors"][0]["message"], "Email must not exceed 100 characters");
}

#[actix_rt::test]
async fn test_profile_requires_token() {
    let state = test_state();
    let app = spawn_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/auth/profile").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 401);
    assert_eq!(body["message"], "Access denied. No token provided.");

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/profile")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-jwt"))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 401);
}

#[actix_rt::test]
async fn test_update_profile() {
    let state = test_state();
    let app = spawn_app!(state);
    let alice = register(&app, "alice", None).await;
    register(&app, "bob", None).await;

    let req = test::TestRequest::put()
        .uri("/api/v1/auth/profile")
        .insert_header(alice.bearer())
        .set_json(&json!({ "username": "bob" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "Username already taken by another user");

    let req = test::TestRequest::put()
        .uri("/api/v1/auth/profile")
        .insert_header(alice.bearer())
        .set_json(&json!({ "username": "alice_renamed", "role": "admin" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200, "Body: {}", body);
    assert_eq!(body["data"]["user"]["username"], "alice_renamed");
    assert_eq!(body["data"]["user"]["role"], "user");
}

#[actix_rt::test]
async fn test_token_of_deleted_user_is_rejected() {
    let state = test_state();
    let app = spawn_app!(state);
    let admin = register(&app, "root", Some("admin")).await;
    let alice = register(&app, "alice", None).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/users/{}", alice.id))
        .insert_header(admin.bearer())
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 200);

    let req = test::TestRequest::get()
        .uri("/api/v1/tasks")
        .insert_header(alice.bearer())
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 401);
    assert_eq!(body["message"], "Invalid token. User not found.");
}

#[actix_rt::test]
async fn test_health_and_unknown_routes() {
    let state = test_state();
    let app = spawn_app!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");

    let req = test::TestRequest::get().uri("/api/v1/nowhere").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "API endpoint not found");
    assert_eq!(body["path"], "/api/v1/nowhere");
}
