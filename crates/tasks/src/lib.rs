//! Maintenance tasks.
//!
//! Tasks are owner-scoped: the assignee is the owner, and READ_WRITE holders
//! may only edit tasks assigned to them.

pub mod task;

pub use task::{NewTask, Task, TaskFilter, TaskId, TaskPatch, TaskPriority, TaskStatus, sort_tasks};
