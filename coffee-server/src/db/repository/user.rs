//! User Repository

use super::task::INSERT_TASKS;
use super::{BaseRepository, RepoError, RepoResult, parse_record_id, transaction_error};
use crate::db::models::{DEFAULT_AVATAR, TaskCreate, TaskState, User, UserCreate, UserUpdate};
use shared::util::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

pub const USER_TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Any>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all users
    pub async fn find_all(&self) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user ORDER BY created_at")
            .await?
            .take(0)?;
        Ok(users)
    }

    /// Find user by id (`user:<key>` or bare key)
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let thing = parse_record_id(USER_TABLE, id)?;
        let user: Option<User> = self.base.db().select(thing).await?;
        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Find user by username
    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE username = $username LIMIT 1")
            .bind(("username", username.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user
    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        self.create_with_tasks(data, Vec::new()).await
    }

    /// Create a new user and queue `tasks` in the same transaction
    ///
    /// The unique indexes on `email` and `username` are the source of truth;
    /// the lookups here only produce a friendlier message. Either the user
    /// and every job are written, or nothing is.
    pub async fn create_with_tasks(
        &self,
        data: UserCreate,
        tasks: Vec<TaskCreate>,
    ) -> RepoResult<User> {
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already exists",
                data.email
            )));
        }
        if self.find_by_username(&data.username).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Username '{}' already exists",
                data.username
            )));
        }

        let query = format!(
            r#"BEGIN TRANSACTION;
                CREATE user SET
                    username = $username,
                    email = $email,
                    phone_number = $phone_number,
                    password = $password,
                    role = $role,
                    avatar = $avatar,
                    verified = false,
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER;
                {INSERT_TASKS}
                COMMIT TRANSACTION;"#
        );
        let mut result = self
            .base
            .db()
            .query(query)
            .bind(("username", data.username))
            .bind(("email", data.email))
            .bind(("phone_number", data.phone_number))
            .bind(("password", data.password))
            .bind(("role", data.role))
            .bind(("avatar", DEFAULT_AVATAR))
            .bind(("tasks", tasks))
            .bind(("pending", TaskState::Pending))
            .bind(("now", now_millis()))
            .await?;

        if let Some(err) = transaction_error(&mut result, 1) {
            return Err(err);
        }
        let created: Option<User> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Update profile fields
    pub async fn update(&self, id: &str, data: UserUpdate) -> RepoResult<User> {
        let thing = parse_record_id(USER_TABLE, id)?;

        if data.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)));
        }

        if let Some(ref new_username) = data.username
            && let Some(existing) = self.find_by_username(new_username).await?
            && existing.id.as_ref() != Some(&thing)
        {
            return Err(RepoError::Duplicate(format!(
                "Username '{}' already exists",
                new_username
            )));
        }

        let mut set_parts: Vec<&str> = vec!["updated_at = $now"];
        if data.username.is_some() { set_parts.push("username = $username"); }
        if data.phone_number.is_some() { set_parts.push("phone_number = $phone_number"); }
        if data.avatar.is_some() { set_parts.push("avatar = $avatar"); }

        let query_str = format!(
            "UPDATE $thing SET {} WHERE id = $thing RETURN AFTER",
            set_parts.join(", ")
        );
        let mut query = self
            .base
            .db()
            .query(&query_str)
            .bind(("thing", thing))
            .bind(("now", now_millis()));

        if let Some(v) = data.username { query = query.bind(("username", v)); }
        if let Some(v) = data.phone_number { query = query.bind(("phone_number", v)); }
        if let Some(v) = data.avatar { query = query.bind(("avatar", v)); }

        let updated: Option<User> = query.await?.take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Mark the account as verified
    pub async fn mark_verified(&self, id: &str) -> RepoResult<User> {
        let thing = parse_record_id(USER_TABLE, id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET verified = true, updated_at = $now WHERE id = $thing RETURN AFTER")
            .bind(("thing", thing))
            .bind(("now", now_millis()))
            .await?;
        let updated: Option<User> = result.take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Replace the password hash and stamp `password_changed_at`
    pub async fn update_password(&self, id: &str, password_hash: String) -> RepoResult<User> {
        let thing = parse_record_id(USER_TABLE, id)?;
        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    password = $password,
                    password_changed_at = $now,
                    updated_at = $now
                WHERE id = $thing RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("password", password_hash))
            .bind(("now", now))
            .await?;
        let updated: Option<User> = result.take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Delete a user, returning the removed record
    pub async fn delete(&self, id: &str) -> RepoResult<User> {
        let thing = parse_record_id(USER_TABLE, id)?;
        let deleted: Option<User> = self.base.db().delete(thing).await?;
        deleted.ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }
}
