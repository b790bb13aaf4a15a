use uuid::Uuid;
use validator::Validate;

use crate::auth::policy;
use crate::error::AppError;
use crate::models::{CreateTaskRequest, Identity, Task, TaskChanges, TaskQuery, UpdateTaskRequest};
use crate::store::Store;

fn not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

/// What a caller is trying to do with an existing task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskAction {
    View,
    Update,
    Delete,
}

impl TaskAction {
    fn verb(self) -> &'static str {
        match self {
            TaskAction::View => "view",
            TaskAction::Update => "update",
            TaskAction::Delete => "delete",
        }
    }

    fn permitted(self, caller: &Identity, task: &Task) -> bool {
        match self {
            TaskAction::View => policy::can_view_task(caller, task),
            TaskAction::Update | TaskAction::Delete => policy::can_mutate_task(caller, task),
        }
    }
}

fn denied(action: TaskAction) -> AppError {
    AppError::Forbidden(format!(
        "Access denied. You can only {} your own tasks.",
        action.verb()
    ))
}

/// Loads a task, distinguishing "missing" from "not yours".
async fn load_for(
    store: &dyn Store,
    caller: &Identity,
    id: Uuid,
    action: TaskAction,
) -> Result<Task, AppError> {
    let task = store.find_task(id).await?.ok_or_else(not_found)?;
    if !action.permitted(caller, &task) {
        log::warn!("user {} denied {} on task {}", caller.id, action.verb(), id);
        return Err(denied(action));
    }
    Ok(task)
}

/// Tasks visible to `caller` that pass the optional filters, newest first.
pub async fn list(store: &dyn Store, caller: &Identity, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
    store.list_tasks(policy::visible_tasks(caller), query).await
}

pub async fn get(store: &dyn Store, caller: &Identity, id: Uuid) -> Result<Task, AppError> {
    load_for(store, caller, id, TaskAction::View).await
}

/// Creates a task owned by `caller`, whatever their role.
pub async fn create(store: &dyn Store, caller: &Identity, request: CreateTaskRequest) -> Result<Task, AppError> {
    let request = request.normalized();
    request.validate()?;
    let task = store.create_task(request.into_new_task(caller.id)).await?;
    log::info!("user {} created task {}", caller.id, task.id);
    Ok(task)
}

pub async fn update(
    store: &dyn Store,
    caller: &Identity,
    id: Uuid,
    request: UpdateTaskRequest,
) -> Result<Task, AppError> {
    let request = request.normalized();
    request.validate()?;
    load_for(store, caller, id, TaskAction::Update).await?;
    store
        .update_task(id, TaskChanges::from(request))
        .await?
        .ok_or_else(not_found)
}

pub async fn delete(store: &dyn Store, caller: &Identity, id: Uuid) -> Result<(), AppError> {
    load_for(store, caller, id, TaskAction::Delete).await?;
    if !store.delete_task(id).await? {
        return Err(not_found());
    }
    log::info!("user {} deleted task {}", caller.id, id);
    Ok(())
}
