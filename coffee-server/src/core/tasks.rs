//! Background task registry
//!
//! The HTTP listener, the job processor and the queue monitor run as
//! supervised tokio tasks sharing one cancellation token. A panic is caught
//! and logged with the task's name.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// HTTP listener
    Listener,
    /// Job processor loop
    Worker,
    /// Timer driven
    Periodic,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Listener => "listener",
            TaskKind::Worker => "worker",
            TaskKind::Periodic => "periodic",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Supervised {
    name: &'static str,
    kind: TaskKind,
    handle: JoinHandle<()>,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Runs `future`, logging a panic or an exit that happened before shutdown
async fn supervise<F>(name: &'static str, kind: TaskKind, cancel: CancellationToken, future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(()) if cancel.is_cancelled() => {}
        Ok(()) => tracing::warn!(task = name, %kind, "Background task returned before shutdown"),
        Err(payload) => tracing::error!(
            task = name,
            %kind,
            panic = %panic_message(payload.as_ref()),
            "Background task panicked"
        ),
    }
}

/// Owns the spawned background tasks
///
/// ```ignore
/// let mut tasks = BackgroundTasks::new();
/// let token = tasks.shutdown_token();
/// tasks.spawn("task_processor", TaskKind::Worker, async move {
///     processor.run(token).await;
/// });
/// tasks.shutdown().await;
/// ```
#[derive(Default)]
pub struct BackgroundTasks {
    tasks: Vec<Supervised>,
    cancel: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancelled when [`BackgroundTasks::shutdown`] starts
    pub fn shutdown_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn spawn<F>(&mut self, name: &'static str, kind: TaskKind, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(supervise(name, kind, self.cancel.clone(), future));
        tracing::debug!(task = name, %kind, "Spawned background task");
        self.tasks.push(Supervised { name, kind, handle });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn count(&self, kind: TaskKind) -> usize {
        self.tasks.iter().filter(|t| t.kind == kind).count()
    }

    pub fn log_summary(&self) {
        tracing::info!(
            total = self.len(),
            listeners = self.count(TaskKind::Listener),
            workers = self.count(TaskKind::Worker),
            periodic = self.count(TaskKind::Periodic),
            "Background tasks running"
        );
    }

    /// Names of tasks that are no longer running
    pub fn exited(&self) -> Vec<&'static str> {
        self.tasks
            .iter()
            .filter(|t| t.handle.is_finished())
            .map(|t| t.name)
            .collect()
    }

    /// Cancel the shared token and wait for every task
    pub async fn shutdown(self) {
        tracing::info!(count = self.len(), "Stopping background tasks");
        self.cancel.cancel();

        for task in self.tasks {
            if let Err(e) = task.handle.await
                && !e.is_cancelled()
            {
                tracing::error!(task = task.name, error = ?e, "Background task failed to join");
            }
        }
        tracing::info!("Background tasks stopped");
    }
}
