//! Enqueue side of the job queue

use std::time::Duration;

use shared::task::{
    DeleteObjectsPayload, PasswordResetMail, QueueName, SendMailPayload, TaskPayload,
    UploadImagePayload, UploadImagesPayload, VerificationMail,
};
use shared::util::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

use super::TaskError;
use crate::db::models::{TaskCreate, TaskRecord};
use crate::db::repository::TaskRepository;

/// Retry budget when none is given
pub const DEFAULT_MAX_RETRY: u32 = 25;

/// Per-job submission options
///
/// ```ignore
/// let opts = TaskOptions::new()
///     .max_retry(3)
///     .process_in(Duration::from_secs(3))
///     .queue(QueueName::Critical);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOptions {
    pub max_retry: u32,
    /// Delay before the first attempt
    pub process_in: Duration,
    pub queue: QueueName,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            max_retry: DEFAULT_MAX_RETRY,
            process_in: Duration::ZERO,
            queue: QueueName::Default,
        }
    }
}

impl TaskOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_retry(mut self, max_retry: u32) -> Self {
        self.max_retry = max_retry;
        self
    }

    pub fn process_in(mut self, delay: Duration) -> Self {
        self.process_in = delay;
        self
    }

    pub fn queue(mut self, queue: QueueName) -> Self {
        self.queue = queue;
        self
    }
}

/// Hands jobs to the queue
#[derive(Clone)]
pub struct TaskDistributor {
    repo: TaskRepository,
}

impl TaskDistributor {
    pub fn new(db: Surreal<Any>) -> Self {
        Self {
            repo: TaskRepository::new(db),
        }
    }

    /// Build the row for `payload` without inserting it, for repositories
    /// that write jobs in their own transaction
    pub fn job<P: TaskPayload>(
        &self,
        payload: &P,
        opts: &TaskOptions,
    ) -> Result<TaskCreate, TaskError> {
        let value = serde_json::to_value(payload).map_err(|e| TaskError::Payload {
            task_type: P::TASK_TYPE.to_string(),
            message: e.to_string(),
        })?;

        let process_in_ms = i64::try_from(opts.process_in.as_millis()).unwrap_or(i64::MAX);
        let now = now_millis();
        Ok(TaskCreate {
            task_type: P::TASK_TYPE.to_string(),
            payload: value,
            queue: opts.queue,
            max_retry: opts.max_retry,
            process_at: now.saturating_add(process_in_ms),
            created_at: now,
        })
    }

    /// Serialize `payload` and insert it as a pending job tagged `P::TASK_TYPE`
    pub async fn enqueue<P: TaskPayload>(
        &self,
        payload: &P,
        opts: TaskOptions,
    ) -> Result<TaskRecord, TaskError> {
        let job = self.job(payload, &opts)?;
        let process_at = job.process_at;
        let record = self
            .repo
            .enqueue(job)
            .await
            .map_err(|e| TaskError::Broker(e.to_string()))?;

        tracing::info!(
            task_type = P::TASK_TYPE,
            queue = %opts.queue,
            max_retry = opts.max_retry,
            process_at,
            "Enqueued task"
        );
        Ok(record)
    }

    pub async fn send_verification_mail(
        &self,
        email: &str,
        opts: TaskOptions,
    ) -> Result<TaskRecord, TaskError> {
        let payload = VerificationMail(SendMailPayload {
            email: email.to_string(),
        });
        self.enqueue(&payload, opts).await
    }

    pub async fn send_password_reset_mail(
        &self,
        email: &str,
        opts: TaskOptions,
    ) -> Result<TaskRecord, TaskError> {
        let payload = PasswordResetMail(SendMailPayload {
            email: email.to_string(),
        });
        self.enqueue(&payload, opts).await
    }

    pub async fn upload_object(
        &self,
        payload: UploadImagePayload,
        opts: TaskOptions,
    ) -> Result<TaskRecord, TaskError> {
        self.enqueue(&payload, opts).await
    }

    pub async fn upload_objects(
        &self,
        payloads: Vec<UploadImagePayload>,
        opts: TaskOptions,
    ) -> Result<TaskRecord, TaskError> {
        self.enqueue(&UploadImagesPayload(payloads), opts).await
    }

    pub async fn delete_objects(
        &self,
        keys: Vec<String>,
        opts: TaskOptions,
    ) -> Result<TaskRecord, TaskError> {
        self.enqueue(&DeleteObjectsPayload(keys), opts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = TaskOptions::default();
        assert_eq!(opts.max_retry, 25);
        assert_eq!(opts.process_in, Duration::ZERO);
        assert_eq!(opts.queue, QueueName::Default);
    }

    #[tokio::test]
    async fn test_job_row() {
        let db = surrealdb::engine::any::connect("mem://").await.unwrap();
        let distributor = TaskDistributor::new(db);
        let before = now_millis();
        let job = distributor
            .job(
                &DeleteObjectsPayload(vec!["images/avatars/a.png".into()]),
                &TaskOptions::new()
                    .queue(QueueName::Critical)
                    .max_retry(3)
                    .process_in(Duration::from_secs(60)),
            )
            .unwrap();
        assert_eq!(job.task_type, DeleteObjectsPayload::TASK_TYPE);
        assert_eq!(job.payload, serde_json::json!(["images/avatars/a.png"]));
        assert_eq!(job.queue, QueueName::Critical);
        assert_eq!(job.max_retry, 3);
        assert!(job.created_at >= before);
        assert_eq!(job.process_at, job.created_at + 60_000);
    }

    #[test]
    fn test_builder() {
        let opts = TaskOptions::new()
            .max_retry(3)
            .process_in(Duration::from_secs(2))
            .queue(QueueName::Critical);
        assert_eq!(opts.max_retry, 3);
        assert_eq!(opts.process_in, Duration::from_secs(2));
        assert_eq!(opts.queue, QueueName::Critical);
    }
}
