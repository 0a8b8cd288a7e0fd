//! Task Model (job queue rows)

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::task::QueueName;
use surrealdb::RecordId;

pub type TaskId = RecordId;

/// Queue row state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    #[default]
    Pending,
    Active,
}

/// A job waiting in (or claimed from) the queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<TaskId>,
    pub task_type: String,
    pub payload: serde_json::Value,
    pub queue: QueueName,
    pub max_retry: u32,
    #[serde(default)]
    pub retried: u32,
    #[serde(default)]
    pub state: TaskState,
    /// Earliest execution time, Unix millis
    pub process_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// New job
#[derive(Debug, Clone, Serialize)]
pub struct TaskCreate {
    pub task_type: String,
    pub payload: serde_json::Value,
    pub queue: QueueName,
    pub max_retry: u32,
    pub process_at: i64,
    /// Instant `process_at` was computed from, Unix millis
    pub created_at: i64,
}
