pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::{error, web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Registers the `/api/v1` routes.
///
/// Registration and login are public; the profile resource and the task and
/// user scopes sit behind `AuthMiddleware`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::login)
                .service(
                    web::resource("/profile")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(auth::get_profile))
                        .route(web::put().to(auth::update_profile)),
                ),
        )
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware)
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        )
        .service(
            web::scope("/users")
                .wrap(AuthMiddleware)
                .service(users::get_users)
                .service(users::get_user)
                .service(users::update_user)
                .service(users::delete_user),
        );
}

/// Malformed or mistyped JSON bodies answer 400 in the usual envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("rejected JSON body: {}", err);
        let message = match &err {
            error::JsonPayloadError::ContentType => "Content type must be application/json".to_string(),
            other => format!("Invalid JSON body: {}", other),
        };
        AppError::BadRequest(message).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid query parameters: {}", err)).into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid path parameter: {}", err)).into()
    })
}

/// Fallback for unmatched routes.
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "success": false,
        "message": "API endpoint not found",
        "path": req.path(),
    }))
}
