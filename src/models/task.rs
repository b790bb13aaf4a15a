use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[default]
    Pending,
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed.
    Completed,
}

/// Represents a task as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// Identifier of the owning user. Fixed at creation.
    pub user_id: i32,
    /// Username of the owner, joined from `users`.
    pub user_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to insert a task. Defaults have already been applied.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub user_id: i32,
}

/// Partial update of a task; `None` fields are left untouched.
/// The owner is deliberately absent: ownership never changes.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

/// Payload for creating a task. The owner always comes from the caller.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[validate(length(max = 1000, message = "Description must not exceed 1000 characters"))]
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl CreateTaskRequest {
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.map(|d| d.trim().to_string()),
            ..self
        }
    }

    /// Applies the default status and priority for `owner`.
    pub fn into_new_task(self, owner: i32) -> NewTask {
        NewTask {
            title: self.title,
            description: self.description,
            status: self.status.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
            user_id: owner,
        }
    }
}

/// Payload for a partial task update; omitted fields keep their value.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,
    /// Absent keeps the description, `null` clears it.
    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 1000, message = "Description must not exceed 1000 characters"))]
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

/// Wraps any present value, including `null`, in `Some` so that a missing
/// field (`None` through `#[serde(default)]`) can be told apart from `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateTaskRequest {
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.map(|t| t.trim().to_string()),
            description: self
                .description
                .map(|d| d.map(|d| d.trim().to_string())),
            ..self
        }
    }
}

impl From<UpdateTaskRequest> for TaskChanges {
    fn from(req: UpdateTaskRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
        }
    }
}

/// Query parameters accepted when listing tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    /// Case-insensitive match against title and description.
    pub search: Option<String>,
}

/// Which tasks a listing may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    All,
    OwnedBy(i32),
}

impl TaskQuery {
    /// Whether `task` passes the optional filters (visibility is handled
    /// separately by `TaskScope`).
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if task.priority != priority {
                return false;
            }
        }
        if let Some(search) = self.search_term() {
            let needle = search.to_lowercase();
            let in_title = task.title.to_lowercase().contains(&needle);
            let in_description = task
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_title && !in_description {
                return false;
            }
        }
        true
    }

    /// The trimmed search term, if one was given and is not blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl TaskScope {
    pub fn owner(&self) -> Option<i32> {
        match self {
            TaskScope::All => None,
            TaskScope::OwnedBy(id) => Some(*id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            title: "Write report".into(),
            description: Some("Quarterly numbers".into()),
            status: TaskStatus::InProgress,
            priority: TaskPriority::High,
            user_id: 1,
            user_name: "alice".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_value(TaskStatus::InProgress).unwrap(), "in-progress");
        assert_eq!(serde_json::to_value(TaskStatus::Pending).unwrap(), "pending");
        assert_eq!(serde_json::to_value(TaskPriority::High).unwrap(), "high");
        assert!(serde_json::from_str::<TaskStatus>("\"done\"").is_err());
        assert!(serde_json::from_str::<TaskPriority>("\"urgent\"").is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn test_create_request_defaults_and_validation() {
        let req: CreateTaskRequest =
            serde_json::from_value(serde_json::json!({ "title": "  T1  " })).unwrap();
        let req = req.normalized();
        assert!(req.validate().is_ok());

        let task = req.into_new_task(42);
        assert_eq!(task.title, "T1");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.user_id, 42);

        let blank = CreateTaskRequest {
            title: "   ".into(),
            description: None,
            status: None,
            priority: None,
        }
        .normalized();
        assert!(blank.validate().is_err());

        let long = CreateTaskRequest {
            title: "a".repeat(201),
            description: Some("b".repeat(1001)),
            status: None,
            priority: None,
        };
        let errors = long.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
        assert!(errors.field_errors().contains_key("description"));
    }

    #[test]
    fn test_update_request_is_partial() {
        let req: UpdateTaskRequest =
            serde_json::from_value(serde_json::json!({ "status": "completed" })).unwrap();
        assert!(req.validate().is_ok());
        let changes = TaskChanges::from(req.normalized());
        assert_eq!(changes.status, Some(TaskStatus::Completed));
        assert!(changes.title.is_none());

        let cleared: UpdateTaskRequest =
            serde_json::from_value(serde_json::json!({ "description": null })).unwrap();
        assert_eq!(cleared.description, Some(None));
        let set: UpdateTaskRequest =
            serde_json::from_value(serde_json::json!({ "description": " notes " })).unwrap();
        assert_eq!(set.normalized().description, Some(Some("notes".to_string())));
        let absent: UpdateTaskRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(absent.description, None);

        let too_long = UpdateTaskRequest {
            description: Some(Some("d".repeat(1001))),
            ..Default::default()
        };
        assert!(too_long.validate().is_err());

        let empty_title = UpdateTaskRequest {
            title: Some(" ".into()),
            ..Default::default()
        }
        .normalized();
        assert!(empty_title.validate().is_err());
    }

    #[test]
    fn test_query_matching() {
        let task = sample_task();

        assert!(TaskQuery::default().matches(&task));
        assert!(TaskQuery {
            search: Some("QUARTERLY".into()),
            ..Default::default()
        }
        .matches(&task));
        assert!(!TaskQuery {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        }
        .matches(&task));
        assert!(!TaskQuery {
            priority: Some(TaskPriority::Low),
            search: Some("report".into()),
            ..Default::default()
        }
        .matches(&task));
        assert_eq!(
            TaskQuery {
                search: Some("   ".into()),
                ..Default::default()
            }
            .search_term(),
            None
        );
    }
}
