//! Repository Module
//!
//! CRUD over the SurrealDB tables. Ids cross this boundary as strings in the
//! `table:key` form (a bare key is accepted too) and are parsed into
//! [`RecordId`] here.

pub mod link_code;
pub mod order;
pub mod product;
pub mod task;
pub mod user;

pub use link_code::LinkCodeRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use task::TaskRepository;
pub use user::UserRepository;

use shared::error::{AppError, ErrorCode};
use surrealdb::engine::any::Any;
use surrealdb::{RecordId, Response, Surreal};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Jobs written in the same transaction were rejected
    #[error("Queue error: {0}")]
    Queue(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        // Unique index violation
        if msg.contains("already contains") {
            RepoError::Duplicate(msg)
        } else {
            RepoError::Database(msg)
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::conflict(ErrorCode::AlreadyExists, msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::invalid_request(msg),
            RepoError::Queue(msg) => AppError::broker(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Error of a `BEGIN ... COMMIT` query, if any
///
/// The statement that failed reports its own error, the others report the
/// failed transaction. A failure of statement `jobs_index` becomes
/// [`RepoError::Queue`].
pub(crate) fn transaction_error(response: &mut Response, jobs_index: usize) -> Option<RepoError> {
    let mut errors: Vec<(usize, surrealdb::Error)> = response.take_errors().into_iter().collect();
    if errors.is_empty() {
        return None;
    }
    errors.sort_by_key(|(index, _)| *index);

    let cause = errors.into_iter().find(|(_, err)| {
        let msg = err.to_string();
        !msg.contains("failed transaction") && !msg.contains("cancelled transaction")
    });
    Some(match cause {
        Some((index, err)) if index == jobs_index => RepoError::Queue(err.to_string()),
        Some((_, err)) => err.into(),
        None => RepoError::Database("Transaction failed".to_string()),
    })
}

/// Parse `table:key` (or a bare key) into a RecordId of `table`
pub fn parse_record_id(table: &str, id: &str) -> RepoResult<RecordId> {
    let id = id.trim();
    if id.is_empty() {
        return Err(RepoError::Validation(format!("Empty {} id", table)));
    }

    if !id.contains(':') {
        return Ok(RecordId::from_table_key(table, id));
    }

    let thing: RecordId = id
        .parse()
        .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
    if thing.table() != table {
        return Err(RepoError::Validation(format!(
            "Invalid ID: {} is not a {} id",
            id, table
        )));
    }
    Ok(thing)
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Any>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Any>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Any> {
        &self.db
    }
}
