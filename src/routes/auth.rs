use crate::{
    auth::{CurrentUser, LoginRequest, RegisterRequest, UpdateProfileRequest},
    error::AppError,
    models::ApiResponse,
    services::accounts,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;

/// Register a new user
///
/// Creates an account with the requested role (default `user`) and returns
/// it together with an authentication token.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let response = accounts::register(&state, register_data.into_inner()).await?;
    Ok(HttpResponse::Created()
        .json(ApiResponse::ok(response).with_message("User registered successfully")))
}

/// Login user
///
/// Authenticates by email and password. Unknown emails and wrong passwords
/// both answer 401 with the same message.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let response = accounts::login(&state, login_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(response).with_message("Login successful")))
}

/// Returns the caller's stored profile. Mounted behind `AuthMiddleware`.
pub async fn get_profile(
    state: web::Data<AppState>,
    CurrentUser(caller): CurrentUser,
) -> Result<impl Responder, AppError> {
    let user = accounts::profile(&state, &caller).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(json!({ "user": user }))))
}

/// Updates the caller's own username and/or email. Mounted behind `AuthMiddleware`.
pub async fn update_profile(
    state: web::Data<AppState>,
    CurrentUser(caller): CurrentUser,
    profile_data: web::Json<UpdateProfileRequest>,
) -> Result<impl Responder, AppError> {
    let user = accounts::update_profile(&state, &caller, profile_data.into_inner()).await?;
    Ok(HttpResponse::Ok()
        .json(ApiResponse::ok(json!({ "user": user })).with_message("Profile updated successfully")))
}
