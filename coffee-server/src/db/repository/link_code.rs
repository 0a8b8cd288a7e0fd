//! Link Code Repository

use super::{BaseRepository, RepoResult};
use crate::auth::LinkPurpose;
use crate::db::models::LinkCode;
use shared::util::now_millis;
use surrealdb::engine::any::Any;
use surrealdb::{RecordId, Surreal};

pub const LINK_CODE_TABLE: &str = "link_code";

#[derive(Clone)]
pub struct LinkCodeRepository {
    base: BaseRepository,
}

impl LinkCodeRepository {
    pub fn new(db: Surreal<Any>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Store a code hash, replacing any earlier code of the same purpose
    pub async fn store(
        &self,
        user: &RecordId,
        purpose: LinkPurpose,
        code_hash: String,
        expires_at: i64,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                DELETE link_code WHERE user = $user AND purpose = $purpose;
                CREATE link_code SET
                    user = $user,
                    purpose = $purpose,
                    code_hash = $code_hash,
                    expires_at = $expires_at,
                    created_at = $now;
                COMMIT TRANSACTION;"#,
            )
            .bind(("user", user.to_string()))
            .bind(("purpose", purpose))
            .bind(("code_hash", code_hash))
            .bind(("expires_at", expires_at))
            .bind(("now", now_millis()))
            .await?
            .check()?;
        Ok(())
    }

    /// Delete and return the code with this hash and purpose
    ///
    /// A single DELETE, so a code is redeemed at most once even under
    /// concurrent requests. Expiry is left to the caller.
    pub async fn consume(
        &self,
        code_hash: &str,
        purpose: LinkPurpose,
    ) -> RepoResult<Option<LinkCode>> {
        let removed: Vec<LinkCode> = self
            .base
            .db()
            .query("DELETE link_code WHERE code_hash = $code_hash AND purpose = $purpose RETURN BEFORE")
            .bind(("code_hash", code_hash.to_string()))
            .bind(("purpose", purpose))
            .await?
            .take(0)?;
        Ok(removed.into_iter().next())
    }

    /// Outstanding codes of a user
    pub async fn find_by_user(&self, user: &RecordId) -> RepoResult<Vec<LinkCode>> {
        let codes: Vec<LinkCode> = self
            .base
            .db()
            .query("SELECT * FROM link_code WHERE user = $user ORDER BY created_at")
            .bind(("user", user.to_string()))
            .await?
            .take(0)?;
        Ok(codes)
    }
}
