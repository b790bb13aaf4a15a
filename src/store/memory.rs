use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Store;
use crate::error::AppError;
use crate::models::{
    NewTask, NewUser, Task, TaskChanges, TaskQuery, TaskScope, User, UserChanges, UserCredentials,
};

#[derive(Debug, Clone)]
struct StoredTask {
    seq: u64,
    task: Task,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i32, UserCredentials>,
    tasks: BTreeMap<Uuid, StoredTask>,
    next_user_id: i32,
    next_task_seq: u64,
}

impl Tables {
    fn username_taken(&self, username: &str, except: Option<i32>) -> bool {
        self.users
            .values()
            .any(|u| u.username == username && Some(u.id) != except)
    }

    fn email_taken(&self, email: &str, except: Option<i32>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn owner_name(&self, user_id: i32) -> Option<String> {
        self.users.get(&user_id).map(|u| u.username.clone())
    }
}

/// In-memory store with the same constraints as the relational schema.
///
/// Intended for tests and local development. Data lives as long as the
/// process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate(field: &str) -> AppError {
    AppError::conflict(field, "Duplicate entry. This record already exists.")
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn find_user(&self, id: i32) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned().map(User::from))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .map(User::from))
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().cloned().map(User::from).collect())
    }

    async fn count_admins(&self) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().filter(|u| u.role.is_admin()).count() as i64)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&user.email, None) {
            return Err(duplicate("email"));
        }
        if tables.username_taken(&user.username, None) {
            return Err(duplicate("username"));
        }

        tables.next_user_id += 1;
        let now = Utc::now();
        let row = UserCredentials {
            id: tables.next_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(row.id, row.clone());
        Ok(row.into())
    }

    async fn update_user(&self, id: i32, changes: UserChanges) -> Result<Option<User>, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&id) {
            return Ok(None);
        }
        if let Some(username) = &changes.username {
            if tables.username_taken(username, Some(id)) {
                return Err(duplicate("username"));
            }
        }
        if let Some(email) = &changes.email {
            if tables.email_taken(email, Some(id)) {
                return Err(duplicate("email"));
            }
        }

        let updated = match tables.users.get_mut(&id) {
            Some(row) => {
                if let Some(username) = changes.username {
                    row.username = username;
                }
                if let Some(email) = changes.email {
                    row.email = email;
                }
                if let Some(role) = changes.role {
                    row.role = role;
                }
                row.updated_at = Utc::now();
                row.clone()
            }
            None => return Ok(None),
        };

        // Keep the joined owner name in sync, as the SQL join would.
        for stored in tables.tasks.values_mut() {
            if stored.task.user_id == id {
                stored.task.user_name = updated.username.clone();
            }
        }

        Ok(Some(updated.into()))
    }

    async fn delete_user(&self, id: i32) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        tables.tasks.retain(|_, stored| stored.task.user_id != id);
        Ok(true)
    }

    async fn list_tasks(&self, scope: TaskScope, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        let tables = self.tables.read().await;
        let mut visible: Vec<&StoredTask> = tables
            .tasks
            .values()
            .filter(|stored| match scope.owner() {
                Some(owner) => stored.task.user_id == owner,
                None => true,
            })
            .filter(|stored| query.matches(&stored.task))
            .collect();
        visible.sort_by(|a, b| b.seq.cmp(&a.seq));
        Ok(visible.into_iter().map(|stored| stored.task.clone()).collect())
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.get(&id).map(|stored| stored.task.clone()))
    }

    async fn create_task(&self, task: NewTask) -> Result<Task, AppError> {
        let mut tables = self.tables.write().await;
        let user_name = tables
            .owner_name(task.user_id)
            .ok_or_else(|| AppError::BadRequest("Foreign key constraint failed".into()))?;

        tables.next_task_seq += 1;
        let now = Utc::now();
        let created = Task {
            id: Uuid::new_v4(),
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            user_id: task.user_id,
            user_name,
            created_at: now,
            updated_at: now,
        };
        let seq = tables.next_task_seq;
        tables.tasks.insert(
            created.id,
            StoredTask {
                seq,
                task: created.clone(),
            },
        );
        Ok(created)
    }

    async fn update_task(&self, id: Uuid, changes: TaskChanges) -> Result<Option<Task>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.tasks.get_mut(&id) else {
            return Ok(None);
        };

        let task = &mut stored.task;
        if let Some(title) = changes.title {
            task.title = title;
        }
        if let Some(description) = changes.description {
            task.description = description;
        }
        if let Some(status) = changes.status {
            task.status = status;
        }
        if let Some(priority) = changes.priority {
            task.priority = priority;
        }
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.tasks.remove(&id).is_some())
    }
}
