//! Worker side of the job queue
//!
//! Each tick claims due jobs (critical lane first, both lanes weighted), runs
//! them concurrently under a semaphore and records the outcome:
//!
//! - success: the job is deleted
//! - failure: `retried += 1`; rescheduled with exponential backoff while
//!   `retried <= max_retry`, dropped and logged afterwards
//!
//! A job with `max_retry = N` therefore runs at most `N + 1` times.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use shared::task::QueueName;
use shared::util::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::TaskError;
use crate::db::models::TaskRecord;
use crate::db::repository::TaskRepository;

const RETRY_BASE_DELAY_SECS: u64 = 5;
const RETRY_MAX_DELAY_SECS: u64 = 60;
const CRITICAL_WEIGHT: usize = 6;
const DEFAULT_WEIGHT: usize = 3;

/// Executes one job type
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn handle(&self, payload: serde_json::Value) -> Result<(), TaskError>;
}

/// Processor tuning
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    pub poll_interval: Duration,
    /// Max jobs running at once
    pub concurrency: usize,
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
    /// Jobs claimed from the critical lane per tick
    pub critical_weight: usize,
    /// Jobs claimed from the default lane per tick
    pub default_weight: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            concurrency: 10,
            retry_base_delay: Duration::from_secs(RETRY_BASE_DELAY_SECS),
            retry_max_delay: Duration::from_secs(RETRY_MAX_DELAY_SECS),
            critical_weight: CRITICAL_WEIGHT,
            default_weight: DEFAULT_WEIGHT,
        }
    }
}

/// `min(base * 2^(retried - 1), max)`; `retried` counts failures so far
pub fn backoff_delay(retried: u32, base: Duration, max: Duration) -> Duration {
    let factor = 2u32.saturating_pow(retried.saturating_sub(1));
    base.saturating_mul(factor).min(max)
}

/// Long running job processor
pub struct TaskProcessor {
    repo: TaskRepository,
    handlers: HashMap<String, Arc<dyn TaskHandler>>,
    config: ProcessorConfig,
    semaphore: Arc<Semaphore>,
}

impl TaskProcessor {
    pub fn new(db: Surreal<Any>, config: ProcessorConfig) -> Self {
        Self {
            repo: TaskRepository::new(db),
            handlers: HashMap::new(),
            semaphore: Arc::new(Semaphore::new(config.concurrency.max(1))),
            config,
        }
    }

    /// Route jobs tagged `task_type` to `handler`
    pub fn register(&mut self, task_type: &str, handler: Arc<dyn TaskHandler>) -> &mut Self {
        if self.handlers.insert(task_type.to_string(), handler).is_some() {
            tracing::warn!(task_type = %task_type, "Task handler replaced");
        }
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Run until `shutdown` is cancelled
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(
            concurrency = self.config.concurrency,
            handlers = self.handlers.len(),
            "TaskProcessor started"
        );

        match self.repo.recover_active().await {
            Ok(0) => {}
            Ok(n) => tracing::info!(count = n, "Recovered interrupted tasks to pending"),
            Err(e) => tracing::error!(error = %e, "Failed to recover interrupted tasks"),
        }

        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("TaskProcessor received shutdown signal");
                    break;
                }
                _ = interval.tick() => {
                    self.run_once().await;
                }
            }
        }
    }

    /// Claim one batch of due jobs and wait until all of them finished
    ///
    /// Returns the number of jobs executed.
    pub async fn run_once(&self) -> usize {
        let mut batch = Vec::new();
        for (queue, weight) in [
            (QueueName::Critical, self.config.critical_weight),
            (QueueName::Default, self.config.default_weight),
        ] {
            match self.repo.claim_due(queue, weight).await {
                Ok(tasks) => batch.extend(tasks),
                Err(e) => tracing::error!(queue = %queue, error = %e, "Failed to claim tasks"),
            }
        }

        let count = batch.len();
        if count == 0 {
            return 0;
        }
        tracing::debug!(count, "Claimed tasks");

        let mut running = JoinSet::new();
        for task in batch {
            let permit = match self.semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::error!("Task semaphore closed");
                    break;
                }
            };
            let repo = self.repo.clone();
            let handler = self.handlers.get(&task.task_type).cloned();
            let config = self.config.clone();
            running.spawn(async move {
                let _permit = permit;
                execute(repo, handler, task, &config).await;
            });
        }

        while let Some(result) = running.join_next().await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Task execution aborted");
            }
        }
        count
    }
}

async fn execute(
    repo: TaskRepository,
    handler: Option<Arc<dyn TaskHandler>>,
    task: TaskRecord,
    config: &ProcessorConfig,
) {
    let Some(id) = task.id.clone() else {
        tracing::error!(task_type = %task.task_type, "Claimed task without id");
        return;
    };

    let result = match handler {
        Some(handler) => AssertUnwindSafe(handler.handle(task.payload.clone()))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(TaskError::Failed("handler panicked".to_string()))),
        None => Err(TaskError::UnknownTask(task.task_type.clone())),
    };

    match result {
        Ok(()) => {
            tracing::info!(task_id = %id, task_type = %task.task_type, "Task completed");
            if let Err(e) = repo.remove(id).await {
                tracing::error!(task_type = %task.task_type, error = %e, "Failed to remove completed task");
            }
        }
        Err(err) => {
            let retried = task.retried.saturating_add(1);
            if retried > task.max_retry {
                tracing::error!(
                    task_id = %id,
                    task_type = %task.task_type,
                    retried,
                    max_retry = task.max_retry,
                    error = %err,
                    "Task exhausted its retries, dropping"
                );
                if let Err(e) = repo.remove(id).await {
                    tracing::error!(task_type = %task.task_type, error = %e, "Failed to remove exhausted task");
                }
                return;
            }

            let delay = backoff_delay(retried, config.retry_base_delay, config.retry_max_delay);
            let delay_ms = i64::try_from(delay.as_millis()).unwrap_or(i64::MAX);
            tracing::warn!(
                task_id = %id,
                task_type = %task.task_type,
                retried,
                max_retry = task.max_retry,
                retry_in_ms = delay_ms,
                error = %err,
                "Task failed, rescheduling"
            );
            if let Err(e) = repo
                .reschedule(id, retried, now_millis().saturating_add(delay_ms), err.to_string())
                .await
            {
                tracing::error!(task_type = %task.task_type, error = %e, "Failed to reschedule task");
            }
        }
    }
}
