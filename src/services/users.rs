use validator::Validate;

use super::ensure_available;
use crate::auth::policy;
use crate::error::AppError;
use crate::models::{Identity, UpdateUserRequest, User, UserChanges};
use crate::store::Store;

fn not_found() -> AppError {
    AppError::NotFound("User not found".into())
}

pub async fn list(store: &dyn Store, caller: &Identity) -> Result<Vec<User>, AppError> {
    policy::require_admin(caller)?;
    store.list_users().await
}

pub async fn get(store: &dyn Store, caller: &Identity, id: i32) -> Result<User, AppError> {
    policy::require_admin(caller)?;
    store.find_user(id).await?.ok_or_else(not_found)
}

/// Changes another account's username, email or role.
pub async fn update(
    store: &dyn Store,
    caller: &Identity,
    id: i32,
    request: UpdateUserRequest,
) -> Result<User, AppError> {
    policy::require_admin(caller)?;
    let request = request.normalized();
    request.validate()?;

    if store.find_user(id).await?.is_none() {
        return Err(not_found());
    }
    ensure_available(
        store,
        Some(id),
        request.username.as_deref(),
        request.email.as_deref(),
    )
    .await?;

    let user = store
        .update_user(id, UserChanges::from(request))
        .await?
        .ok_or_else(not_found)?;
    log::info!("admin {} updated user {}", caller.id, id);
    Ok(user)
}

/// Removes an account and, with it, every task it owns.
///
/// A missing target is reported before the self-deletion guard.
pub async fn delete(store: &dyn Store, caller: &Identity, id: i32) -> Result<(), AppError> {
    policy::require_admin(caller)?;
    if store.find_user(id).await?.is_none() {
        return Err(not_found());
    }
    if !policy::can_delete_user(caller, id) {
        log::warn!("admin {} attempted to delete their own account", caller.id);
        return Err(AppError::SelfDeletion);
    }
    if !store.delete_user(id).await? {
        return Err(not_found());
    }
    log::info!("admin {} deleted user {}", caller.id, id);
    Ok(())
}
