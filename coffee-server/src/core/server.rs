//! Server Implementation
//!
//! Starts the HTTP listener and/or the job processor depending on
//! [`RunMode`](crate::core::RunMode), then waits for Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::api::build_app;
use crate::core::{BackgroundTasks, Config, Result, ServerError, ServerState, TaskKind};
use crate::db::models::TaskState;
use crate::db::repository::TaskRepository;
use crate::mail::{Mailer, SmtpMailer};
use crate::storage::{ObjectStore, S3ObjectStore};
use crate::tasks::{ProcessorConfig, TaskProcessor, register_handlers};

/// How often the main loop checks that no background task died
const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// How often the queue depth is logged
const QUEUE_MONITOR_INTERVAL: Duration = Duration::from_secs(300);

/// HTTP server and worker host
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        let mut tasks = BackgroundTasks::new();

        if self.config.run_mode.runs_worker() {
            self.start_worker(&state, &mut tasks).await?;
        }

        if self.config.run_mode.runs_api() {
            self.start_listener(&state, &mut tasks).await?;
        }

        tasks.log_summary();

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        let mut health = tokio::time::interval(HEALTH_CHECK_INTERVAL);
        health.tick().await;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutting down...");
                    break;
                }
                _ = health.tick() => {
                    let exited = tasks.exited();
                    if !exited.is_empty() {
                        tracing::warn!(tasks = ?exited, "Background tasks exited early");
                    }
                }
            }
        }

        tasks.shutdown().await;
        Ok(())
    }

    async fn start_listener(&self, state: &ServerState, tasks: &mut BackgroundTasks) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.config.http_port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;

        tracing::info!("Coffee server listening on {}", addr);

        let app = build_app(state.clone());
        let token = tasks.shutdown_token();
        tasks.spawn("http_listener", TaskKind::Listener, async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await
                .map_err(ServerError::Serve);
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server stopped");
            }
        });

        Ok(())
    }

    async fn start_worker(&self, state: &ServerState, tasks: &mut BackgroundTasks) -> Result<()> {
        let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(&self.config.smtp)?);
        let store: Arc<dyn ObjectStore> =
            Arc::new(S3ObjectStore::from_env(&self.config.s3_bucket).await?);

        let mut processor = TaskProcessor::new(
            state.get_db(),
            ProcessorConfig {
                poll_interval: self.config.worker.poll_interval,
                concurrency: self.config.worker.concurrency,
                ..ProcessorConfig::default()
            },
        );
        register_handlers(
            &mut processor,
            state.get_db(),
            mailer,
            store,
            &self.config.app_url,
        );

        let token = tasks.shutdown_token();
        tasks.spawn("task_processor", TaskKind::Worker, async move {
            processor.run(token).await;
        });

        let repo = TaskRepository::new(state.get_db());
        let token = tasks.shutdown_token();
        tasks.spawn("queue_monitor", TaskKind::Periodic, async move {
            monitor_queue(repo, token).await;
        });

        Ok(())
    }
}

async fn monitor_queue(repo: TaskRepository, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval(QUEUE_MONITOR_INTERVAL);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                match (repo.count(TaskState::Pending).await, repo.count(TaskState::Active).await) {
                    (Ok(pending), Ok(active)) => {
                        tracing::info!(pending, active, "Task queue depth");
                    }
                    (Err(e), _) | (_, Err(e)) => {
                        tracing::warn!(error = %e, "Failed to read task queue depth");
                    }
                }
            }
        }
    }
}
