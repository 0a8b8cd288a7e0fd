//! Job handlers

use std::sync::Arc;

use async_trait::async_trait;
use shared::task::{
    DeleteObjectsPayload, PasswordResetMail, TaskPayload, UploadImagePayload,
    UploadImagesPayload, VerificationMail,
};
use shared::util::expiry_millis;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

use super::{TaskError, TaskHandler, TaskProcessor};
use crate::auth::{LinkPurpose, generate_code, hash_code};
use crate::db::repository::{LinkCodeRepository, UserRepository};
use crate::mail::{Mailer, templates};
use crate::media::content_type;
use crate::storage::ObjectStore;

fn decode<P: TaskPayload>(payload: serde_json::Value) -> Result<P, TaskError> {
    serde_json::from_value(payload).map_err(|e| TaskError::Payload {
        task_type: P::TASK_TYPE.to_string(),
        message: e.to_string(),
    })
}

/// Issues a one-time code for the user behind the payload's email and mails
/// it as a link; the code replaces any earlier one of the same purpose
pub struct LinkMailHandler {
    purpose: LinkPurpose,
    users: UserRepository,
    codes: LinkCodeRepository,
    mailer: Arc<dyn Mailer>,
    app_url: String,
}

impl LinkMailHandler {
    pub fn new(
        purpose: LinkPurpose,
        db: Surreal<Any>,
        mailer: Arc<dyn Mailer>,
        app_url: impl Into<String>,
    ) -> Self {
        Self {
            purpose,
            users: UserRepository::new(db.clone()),
            codes: LinkCodeRepository::new(db),
            mailer,
            app_url: app_url.into(),
        }
    }
}

#[async_trait]
impl TaskHandler for LinkMailHandler {
    async fn handle(&self, payload: serde_json::Value) -> Result<(), TaskError> {
        let email = match self.purpose {
            LinkPurpose::Verify => decode::<VerificationMail>(payload)?.0.email,
            LinkPurpose::ResetPassword => decode::<PasswordResetMail>(payload)?.0.email,
        };

        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(|e| TaskError::Failed(e.to_string()))?
            .ok_or_else(|| TaskError::Failed(format!("No user with email {email}")))?;
        let user_id = user
            .id
            .clone()
            .ok_or_else(|| TaskError::Failed(format!("User {email} has no id")))?;

        let code = generate_code().map_err(|e| TaskError::Failed(e.message))?;
        let expires_at = expiry_millis(templates::LINK_TTL_MINUTES);
        self.codes
            .store(&user_id, self.purpose, hash_code(&code), expires_at)
            .await
            .map_err(|e| TaskError::Failed(e.to_string()))?;

        let link = templates::link(&self.app_url, self.purpose.path(), &code, expires_at);
        let content = match self.purpose {
            LinkPurpose::Verify => templates::verification(&user.username, &link),
            LinkPurpose::ResetPassword => templates::password_reset(&user.username, &link),
        };

        self.mailer
            .send(&user.email, &content.subject, &content.body)
            .await?;
        tracing::info!(purpose = ?self.purpose, email = %user.email, "Link mail sent");
        Ok(())
    }
}

/// Puts one object
pub struct UploadObjectHandler {
    store: Arc<dyn ObjectStore>,
}

impl UploadObjectHandler {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

async fn put(store: &dyn ObjectStore, object: UploadImagePayload) -> Result<(), TaskError> {
    let mime = content_type(&object.extension);
    store.put_object(&object.object_key, object.image, &mime).await?;
    Ok(())
}

#[async_trait]
impl TaskHandler for UploadObjectHandler {
    async fn handle(&self, payload: serde_json::Value) -> Result<(), TaskError> {
        let object: UploadImagePayload = decode(payload)?;
        put(self.store.as_ref(), object).await
    }
}

/// Puts every object, stopping at the first failure
pub struct UploadObjectsHandler {
    store: Arc<dyn ObjectStore>,
}

impl UploadObjectsHandler {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TaskHandler for UploadObjectsHandler {
    async fn handle(&self, payload: serde_json::Value) -> Result<(), TaskError> {
        let UploadImagesPayload(objects) = decode(payload)?;
        for object in objects {
            put(self.store.as_ref(), object).await?;
        }
        Ok(())
    }
}

/// Deletes every key
pub struct DeleteObjectsHandler {
    store: Arc<dyn ObjectStore>,
}

impl DeleteObjectsHandler {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TaskHandler for DeleteObjectsHandler {
    async fn handle(&self, payload: serde_json::Value) -> Result<(), TaskError> {
        let DeleteObjectsPayload(keys) = decode(payload)?;
        for key in &keys {
            self.store.delete_object(key).await?;
        }
        Ok(())
    }
}

/// Register the five job handlers
pub fn register_handlers(
    processor: &mut TaskProcessor,
    db: Surreal<Any>,
    mailer: Arc<dyn Mailer>,
    store: Arc<dyn ObjectStore>,
    app_url: &str,
) {
    processor
        .register(
            VerificationMail::TASK_TYPE,
            Arc::new(LinkMailHandler::new(
                LinkPurpose::Verify,
                db.clone(),
                mailer.clone(),
                app_url,
            )),
        )
        .register(
            PasswordResetMail::TASK_TYPE,
            Arc::new(LinkMailHandler::new(
                LinkPurpose::ResetPassword,
                db,
                mailer,
                app_url,
            )),
        )
        .register(
            UploadImagePayload::TASK_TYPE,
            Arc::new(UploadObjectHandler::new(store.clone())),
        )
        .register(
            UploadImagesPayload::TASK_TYPE,
            Arc::new(UploadObjectsHandler::new(store.clone())),
        )
        .register(
            DeleteObjectsPayload::TASK_TYPE,
            Arc::new(DeleteObjectsHandler::new(store)),
        );
}
