pub mod response;
pub mod task;
pub mod user;

pub use response::ApiResponse;
pub use task::{
    CreateTaskRequest, NewTask, Task, TaskChanges, TaskPriority, TaskQuery, TaskScope, TaskStatus,
    UpdateTaskRequest,
};
pub use user::{
    Identity, NewUser, Role, UpdateUserRequest, User, UserChanges, UserCredentials,
};
