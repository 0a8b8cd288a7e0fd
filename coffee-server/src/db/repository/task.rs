//! Task Repository
//!
//! The `task` table is the job queue. A row is `pending` until a worker
//! claims it (`active`); it is deleted on success or once retries run out.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{TaskCreate, TaskRecord, TaskState};
use serde::Deserialize;
use shared::task::QueueName;
use shared::util::now_millis;
use surrealdb::engine::any::Any;
use surrealdb::{RecordId, Surreal};

pub const TASK_TABLE: &str = "task";

/// Inserts every [`TaskCreate`] bound as `$tasks` as a pending job
///
/// Runs as one statement of another repository's transaction, which binds
/// `$tasks`, `$pending` and `$now`.
pub(crate) const INSERT_TASKS: &str = r#"FOR $task IN $tasks {
                    CREATE task SET
                        task_type = $task.task_type,
                        payload = $task.payload,
                        queue = $task.queue,
                        max_retry = $task.max_retry,
                        retried = 0,
                        state = $pending,
                        process_at = $task.process_at,
                        created_at = $task.created_at,
                        updated_at = $now;
                };"#;

#[derive(Clone)]
pub struct TaskRepository {
    base: BaseRepository,
}

impl TaskRepository {
    pub fn new(db: Surreal<Any>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Insert a pending job
    pub async fn enqueue(&self, data: TaskCreate) -> RepoResult<TaskRecord> {
        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE task SET
                    task_type = $task_type,
                    payload = $payload,
                    queue = $queue,
                    max_retry = $max_retry,
                    retried = 0,
                    state = $state,
                    process_at = $process_at,
                    created_at = $created_at,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("task_type", data.task_type))
            .bind(("payload", data.payload))
            .bind(("queue", data.queue))
            .bind(("max_retry", data.max_retry))
            .bind(("state", TaskState::Pending))
            .bind(("process_at", data.process_at))
            .bind(("created_at", data.created_at))
            .bind(("now", now))
            .await?;

        let created: Option<TaskRecord> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to enqueue task".to_string()))
    }

    /// Claim up to `limit` due jobs of one queue
    ///
    /// Candidates are flipped `pending -> active` with a conditional update;
    /// only rows this call actually flipped are returned, so two workers
    /// never run the same job.
    pub async fn claim_due(&self, queue: QueueName, limit: usize) -> RepoResult<Vec<TaskRecord>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let now = now_millis();

        let candidates: Vec<TaskRecord> = self
            .base
            .db()
            .query(
                "SELECT * FROM task WHERE state = $pending AND queue = $queue AND process_at <= $now ORDER BY process_at LIMIT $limit",
            )
            .bind(("pending", TaskState::Pending))
            .bind(("queue", queue))
            .bind(("now", now))
            .bind(("limit", limit as i64))
            .await?
            .take(0)?;

        let ids: Vec<RecordId> = candidates.into_iter().filter_map(|t| t.id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let claimed: Vec<TaskRecord> = self
            .base
            .db()
            .query("UPDATE $ids SET state = $active, updated_at = $now WHERE state = $pending RETURN AFTER")
            .bind(("ids", ids))
            .bind(("active", TaskState::Active))
            .bind(("pending", TaskState::Pending))
            .bind(("now", now))
            .await?
            .take(0)?;
        Ok(claimed)
    }

    /// Remove a job (finished or exhausted)
    pub async fn remove(&self, id: RecordId) -> RepoResult<()> {
        let _: Option<TaskRecord> = self.base.db().delete(id).await?;
        Ok(())
    }

    /// Put a failed job back into the queue
    pub async fn reschedule(
        &self,
        id: RecordId,
        retried: u32,
        process_at: i64,
        last_error: String,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query(
                r#"UPDATE $id SET
                    state = $pending,
                    retried = $retried,
                    process_at = $process_at,
                    last_error = $last_error,
                    updated_at = $now
                WHERE id = $id"#,
            )
            .bind(("id", id))
            .bind(("pending", TaskState::Pending))
            .bind(("retried", retried))
            .bind(("process_at", process_at))
            .bind(("last_error", last_error))
            .bind(("now", now_millis()))
            .await?
            .check()?;
        Ok(())
    }

    /// Return jobs left `active` by a stopped worker to the queue
    pub async fn recover_active(&self) -> RepoResult<usize> {
        let recovered: Vec<TaskRecord> = self
            .base
            .db()
            .query("UPDATE task SET state = $pending, updated_at = $now WHERE state = $active RETURN AFTER")
            .bind(("pending", TaskState::Pending))
            .bind(("active", TaskState::Active))
            .bind(("now", now_millis()))
            .await?
            .take(0)?;
        Ok(recovered.len())
    }

    /// Number of jobs in `state`
    pub async fn count(&self, state: TaskState) -> RepoResult<usize> {
        #[derive(Deserialize)]
        struct Count {
            total: usize,
        }

        let rows: Vec<Count> = self
            .base
            .db()
            .query("SELECT count() AS total FROM task WHERE state = $state GROUP ALL")
            .bind(("state", state))
            .await?
            .take(0)?;
        Ok(rows.first().map(|c| c.total).unwrap_or(0))
    }
}
