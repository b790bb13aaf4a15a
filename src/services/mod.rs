//! Request-independent operations.
//!
//! Each function takes the store (or the whole `AppState`) and the caller's
//! `Identity` explicitly, applies the authorization rules from
//! `auth::policy`, and returns domain values. HTTP concerns stay in `routes`.

pub mod accounts;
pub mod tasks;
pub mod users;

use crate::error::AppError;
use crate::store::Store;

/// Rejects a username or email that already belongs to a user other than `owner`.
///
/// Passing `None` as `owner` treats every existing match as a collision.
pub(crate) async fn ensure_available(
    store: &dyn Store,
    owner: Option<i32>,
    username: Option<&str>,
    email: Option<&str>,
) -> Result<(), AppError> {
    if let Some(email) = email {
        if let Some(existing) = store.find_credentials(email).await? {
            if Some(existing.id) != owner {
                return Err(AppError::conflict(
                    "email",
                    match owner {
                        Some(_) => "Email already taken by another user",
                        None => "User with this email already exists",
                    },
                ));
            }
        }
    }
    if let Some(username) = username {
        if let Some(existing) = store.find_user_by_username(username).await? {
            if Some(existing.id) != owner {
                return Err(AppError::conflict(
                    "username",
                    match owner {
                        Some(_) => "Username already taken by another user",
                        None => "Username already taken",
                    },
                ));
            }
        }
    }
    Ok(())
}
