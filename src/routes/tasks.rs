use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{ApiResponse, CreateTaskRequest, TaskQuery, UpdateTaskRequest},
    services::tasks,
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;

/// Lists the tasks visible to the caller.
///
/// Regular users see only their own tasks; admins see every task. The
/// optional `status`, `priority` and `search` query parameters narrow the
/// result further. Tasks are ordered newest first.
///
/// ## Responses:
/// - `200 OK`: `{ tasks, count }`.
/// - `400 Bad Request`: unknown status or priority value.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    CurrentUser(caller): CurrentUser,
    query_params: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let tasks = tasks::list(state.store.as_ref(), &caller, &query_params).await?;
    Ok(HttpResponse::Ok().json(
        ApiResponse::ok(json!({ "count": tasks.len(), "tasks": tasks }))
            .with_message("Tasks retrieved successfully"),
    ))
}

/// Creates a task owned by the caller.
///
/// ## Responses:
/// - `201 Created`: `{ task }`, with status `pending` and priority `medium`
///   unless given.
/// - `400 Bad Request`: validation failure.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    CurrentUser(caller): CurrentUser,
    task_data: web::Json<CreateTaskRequest>,
) -> Result<impl Responder, AppError> {
    let task = tasks::create(state.store.as_ref(), &caller, task_data.into_inner()).await?;
    Ok(HttpResponse::Created()
        .json(ApiResponse::ok(json!({ "task": task })).with_message("Task created successfully")))
}

/// Retrieves a single task.
///
/// ## Responses:
/// - `200 OK`: `{ task }`.
/// - `403 Forbidden`: the task belongs to someone else and the caller is not an admin.
/// - `404 Not Found`: no task with that id.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    CurrentUser(caller): CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = tasks::get(state.store.as_ref(), &caller, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(json!({ "task": task }))))
}

/// Partially updates a task; omitted fields keep their current value.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    CurrentUser(caller): CurrentUser,
    task_id: web::Path<Uuid>,
    task_data: web::Json<UpdateTaskRequest>,
) -> Result<impl Responder, AppError> {
    let task = tasks::update(
        state.store.as_ref(),
        &caller,
        task_id.into_inner(),
        task_data.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok()
        .json(ApiResponse::ok(json!({ "task": task })).with_message("Task updated successfully")))
}

#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    CurrentUser(caller): CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    tasks::delete(state.store.as_ref(), &caller, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Task deleted successfully")))
}
