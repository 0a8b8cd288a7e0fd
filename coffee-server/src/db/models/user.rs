//! User Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::models::Role;
use surrealdb::RecordId;

pub type UserId = RecordId;

/// Avatar assigned at signup; never deleted from storage
pub const DEFAULT_AVATAR: &str = "default.jpeg";

/// Account record
///
/// The password hash is read from the database but never serialized, so a
/// `User` can be returned from handlers as is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<UserId>,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_changed_at: Option<i64>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl User {
    /// `user:<key>` as a string, empty when the record has no id yet
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }

    pub fn has_custom_avatar(&self) -> bool {
        !self.avatar.is_empty() && self.avatar != DEFAULT_AVATAR
    }
}

/// Create user payload; `password` is already hashed
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    pub role: Role,
}

/// Profile update payload
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub phone_number: Option<String>,
    pub avatar: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.phone_number.is_none() && self.avatar.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: Some(RecordId::from_table_key("user", "abc")),
            username: "barista".into(),
            email: "barista@coffee.shop".into(),
            phone_number: String::new(),
            password: "$argon2id$hash".into(),
            role: Role::User,
            avatar: DEFAULT_AVATAR.into(),
            verified: false,
            password_changed_at: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_password_is_not_serialized() {
        let json = serde_json::to_value(user()).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["id"], "user:abc");
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn test_id_string() {
        assert_eq!(user().id_string(), "user:abc");
        let mut u = user();
        u.id = None;
        assert_eq!(u.id_string(), "");
    }

    #[test]
    fn test_default_avatar() {
        let mut u = user();
        assert!(!u.has_custom_avatar());
        u.avatar = "images/avatars/1f2e.png".into();
        assert!(u.has_custom_avatar());
    }
}
