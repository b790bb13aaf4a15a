//! Authorization rules.
//!
//! Every decision is a pure function of the caller's identity and the
//! current state of the target, evaluated fresh on each request. Roles are
//! matched exhaustively.

use crate::error::AppError;
use crate::models::{Identity, Role, Task, TaskScope};

/// A caller may view a task if they are an admin or own it.
pub fn can_view_task(caller: &Identity, task: &Task) -> bool {
    match caller.role {
        Role::Admin => true,
        Role::User => task.user_id == caller.id,
    }
}

/// A caller may update or delete a task under the same rule as viewing it.
pub fn can_mutate_task(caller: &Identity, task: &Task) -> bool {
    can_view_task(caller, task)
}

/// The set of tasks a listing is allowed to return, applied by the store.
pub fn visible_tasks(caller: &Identity) -> TaskScope {
    match caller.role {
        Role::Admin => TaskScope::All,
        Role::User => TaskScope::OwnedBy(caller.id),
    }
}

/// Only admins delete accounts, and never their own.
pub fn can_delete_user(caller: &Identity, target_id: i32) -> bool {
    match caller.role {
        Role::Admin => target_id != caller.id,
        Role::User => false,
    }
}

pub fn require_admin(caller: &Identity) -> Result<(), AppError> {
    match caller.role {
        Role::Admin => Ok(()),
        Role::User => {
            log::warn!("user {} denied admin-only operation", caller.id);
            Err(AppError::Forbidden(
                "Access denied. Insufficient permissions.".into(),
            ))
        }
    }
}
