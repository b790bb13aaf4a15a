//! Persistence for users and tasks.
//!
//! Operations take the store as an explicit `Arc<dyn Store>` handle instead
//! of reaching for a global connection. `PgStore` is the production backend;
//! `MemoryStore` backs the test suite and runs the server without a database.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    NewTask, NewUser, Task, TaskChanges, TaskQuery, TaskScope, User, UserChanges, UserCredentials,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Access contract for the credential and task tables.
///
/// Implementations must keep usernames and emails unique (reporting
/// violations as `AppError::Conflict`) and remove a user's tasks when the
/// user is deleted.
#[async_trait]
pub trait Store: Send + Sync {
    /// Round-trips to the backend; used by the health check.
    async fn ping(&self) -> Result<(), AppError>;

    async fn find_user(&self, id: i32) -> Result<Option<User>, AppError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    /// Looks a user up by email, including the password hash.
    async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>, AppError>;
    async fn list_users(&self) -> Result<Vec<User>, AppError>;
    async fn count_admins(&self) -> Result<i64, AppError>;
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;
    /// Applies `changes` and returns the updated row, or `None` if absent.
    async fn update_user(&self, id: i32, changes: UserChanges) -> Result<Option<User>, AppError>;
    /// Deletes the user and every task they own. Returns whether a row was removed.
    async fn delete_user(&self, id: i32) -> Result<bool, AppError>;

    /// Tasks within `scope` that match `query`, newest first.
    async fn list_tasks(&self, scope: TaskScope, query: &TaskQuery) -> Result<Vec<Task>, AppError>;
    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError>;
    async fn create_task(&self, task: NewTask) -> Result<Task, AppError>;
    async fn update_task(&self, id: Uuid, changes: TaskChanges) -> Result<Option<Task>, AppError>;
    async fn delete_task(&self, id: Uuid) -> Result<bool, AppError>;
}
