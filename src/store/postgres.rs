use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Executor;
use uuid::Uuid;

use super::Store;
use crate::error::AppError;
use crate::models::{
    NewTask, NewUser, Task, TaskChanges, TaskQuery, TaskScope, User, UserChanges, UserCredentials,
};

const USER_COLUMNS: &str = "id, username, email, role, created_at, updated_at";

const TASK_SELECT: &str = "SELECT t.id, t.title, t.description, t.status, t.priority, t.user_id, \
     u.username AS user_name, t.created_at, t.updated_at \
     FROM tasks t JOIN users u ON t.user_id = u.id";

/// Statements run at startup. Each one is idempotent.
const SCHEMA: &[&str] = &[
    "DO $$ BEGIN
        CREATE TYPE user_role AS ENUM ('user', 'admin');
     EXCEPTION WHEN duplicate_object THEN NULL; END $$",
    "DO $$ BEGIN
        CREATE TYPE task_status AS ENUM ('pending', 'in-progress', 'completed');
     EXCEPTION WHEN duplicate_object THEN NULL; END $$",
    "DO $$ BEGIN
        CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
     EXCEPTION WHEN duplicate_object THEN NULL; END $$",
    "CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username VARCHAR(50) UNIQUE NOT NULL,
        email VARCHAR(100) UNIQUE NOT NULL,
        password_hash VARCHAR(255) NOT NULL,
        role user_role NOT NULL DEFAULT 'user',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS tasks (
        id UUID PRIMARY KEY,
        title VARCHAR(200) NOT NULL,
        description VARCHAR(1000),
        status task_status NOT NULL DEFAULT 'pending',
        priority task_priority NOT NULL DEFAULT 'medium',
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE INDEX IF NOT EXISTS idx_tasks_user_id ON tasks(user_id)",
];

/// An `ILIKE` pattern matching `term` literally anywhere in the column.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Creates the enum types, tables and indexes if they do not exist yet.
    pub async fn migrate(&self) -> Result<(), AppError> {
        for statement in SCHEMA {
            // Simple-query protocol: `DO` blocks cannot be prepared.
            self.pool.execute(*statement).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_user(&self, id: i32) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>, AppError> {
        let user = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, username, email, password_hash, role, created_at, updated_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn count_admins(&self) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = 'admin'")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, role) VALUES ($1, $2, $3, $4) \
             RETURNING {}",
            USER_COLUMNS
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(user.username)
            .bind(user.email)
            .bind(user.password_hash)
            .bind(user.role)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update_user(&self, id: i32, changes: UserChanges) -> Result<Option<User>, AppError> {
        let sql = format!(
            "UPDATE users SET \
                username = COALESCE($1, username), \
                email = COALESCE($2, email), \
                role = COALESCE($3, role), \
                updated_at = NOW() \
             WHERE id = $4 RETURNING {}",
            USER_COLUMNS
        );
        let updated = sqlx::query_as::<_, User>(&sql)
            .bind(changes.username)
            .bind(changes.email)
            .bind(changes.role)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete_user(&self, id: i32) -> Result<bool, AppError> {
        // Tasks go with the user through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_tasks(&self, scope: TaskScope, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        // Conditions are appended in the same order their values are bound below.
        let mut conditions: Vec<String> = Vec::new();
        let mut param_count = 1;

        if scope.owner().is_some() {
            conditions.push(format!("t.user_id = ${}", param_count));
            param_count += 1;
        }
        if query.status.is_some() {
            conditions.push(format!("t.status = ${}", param_count));
            param_count += 1;
        }
        if query.priority.is_some() {
            conditions.push(format!("t.priority = ${}", param_count));
            param_count += 1;
        }
        if query.search_term().is_some() {
            conditions.push(format!(
                "(t.title ILIKE ${0} ESCAPE '\\' OR t.description ILIKE ${0} ESCAPE '\\')",
                param_count
            ));
        }

        let mut sql = String::from(TASK_SELECT);
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY t.created_at DESC");

        let mut query_builder = sqlx::query_as::<_, Task>(&sql);
        if let Some(owner) = scope.owner() {
            query_builder = query_builder.bind(owner);
        }
        if let Some(status) = query.status {
            query_builder = query_builder.bind(status);
        }
        if let Some(priority) = query.priority {
            query_builder = query_builder.bind(priority);
        }
        if let Some(search) = query.search_term() {
            query_builder = query_builder.bind(contains_pattern(search));
        }

        let tasks = query_builder.fetch_all(&self.pool).await?;
        Ok(tasks)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!("{} WHERE t.id = $1", TASK_SELECT);
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn create_task(&self, task: NewTask) -> Result<Task, AppError> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO tasks (id, title, description, status, priority, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(task.title)
        .bind(task.description)
        .bind(task.status)
        .bind(task.priority)
        .bind(task.user_id)
        .execute(&self.pool)
        .await?;

        self.find_task(id)
            .await?
            .ok_or_else(|| AppError::InternalServerError("Created task disappeared".into()))
    }

    async fn update_task(&self, id: Uuid, changes: TaskChanges) -> Result<Option<Task>, AppError> {
        let result = sqlx::query(
            "UPDATE tasks SET \
                title = COALESCE($1, title), \
                description = CASE WHEN $2 THEN $3 ELSE description END, \
                status = COALESCE($4, status), \
                priority = COALESCE($5, priority), \
                updated_at = NOW() \
             WHERE id = $6",
        )
        .bind(changes.title)
        .bind(changes.description.is_some())
        .bind(changes.description.flatten())
        .bind(changes.status)
        .bind(changes.priority)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_task(id).await
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
