use crate::{
    auth::AdminUser,
    error::AppError,
    models::{ApiResponse, UpdateUserRequest},
    services::users,
    state::AppState,
};
use actix_web::{delete, get, put, web, HttpResponse, Responder};
use serde_json::json;

/// Lists every account. Admin only.
#[get("")]
pub async fn get_users(
    state: web::Data<AppState>,
    AdminUser(caller): AdminUser,
) -> Result<impl Responder, AppError> {
    let users = users::list(state.store.as_ref(), &caller).await?;
    Ok(HttpResponse::Ok().json(
        ApiResponse::ok(json!({ "count": users.len(), "users": users }))
            .with_message("Users retrieved successfully"),
    ))
}

#[get("/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    AdminUser(caller): AdminUser,
    user_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let user = users::get(state.store.as_ref(), &caller, user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(json!({ "user": user }))))
}

/// Changes another account's username, email or role. Admin only.
#[put("/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    AdminUser(caller): AdminUser,
    user_id: web::Path<i32>,
    user_data: web::Json<UpdateUserRequest>,
) -> Result<impl Responder, AppError> {
    let user = users::update(
        state.store.as_ref(),
        &caller,
        user_id.into_inner(),
        user_data.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok()
        .json(ApiResponse::ok(json!({ "user": user })).with_message("User updated successfully")))
}

/// Deletes an account and all of its tasks. Admins cannot delete themselves.
#[delete("/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    AdminUser(caller): AdminUser,
    user_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    users::delete(state.store.as_ref(), &caller, user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("User deleted successfully")))
}
