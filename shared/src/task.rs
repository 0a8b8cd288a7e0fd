//! Background job payloads
//!
//! Each payload type carries its job-type tag through [`TaskPayload`], so the
//! enqueue side and the worker's dispatch table agree on the wire name.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const SEND_VERIFICATION_EMAIL: &str = "task:send_verification_email";
pub const SEND_PASSWORD_RESET_EMAIL: &str = "task:send_password_reset_email";
pub const UPLOAD_S3_OBJECT: &str = "task:upload_s3_object";
pub const UPLOAD_MULTIPLE_S3_OBJECTS: &str = "task:upload_multiple_s3_objects";
pub const DELETE_S3_OBJECT: &str = "task:delete_s3_object";

/// Queue lane a job is submitted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueName {
    Critical,
    #[default]
    Default,
}

impl QueueName {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueName::Critical => "critical",
            QueueName::Default => "default",
        }
    }
}

impl fmt::Display for QueueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueueName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(QueueName::Critical),
            "default" => Ok(QueueName::Default),
            other => Err(format!("unknown queue: {other}")),
        }
    }
}

/// A serializable job payload bound to one job-type tag
pub trait TaskPayload: Serialize + DeserializeOwned + Send + Sync {
    const TASK_TYPE: &'static str;
}

/// Mail jobs address the user by email; the worker resolves the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMailPayload {
    pub email: String,
}

/// Verification mail job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationMail(pub SendMailPayload);

impl TaskPayload for VerificationMail {
    const TASK_TYPE: &'static str = SEND_VERIFICATION_EMAIL;
}

/// Password reset mail job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordResetMail(pub SendMailPayload);

impl TaskPayload for PasswordResetMail {
    const TASK_TYPE: &'static str = SEND_PASSWORD_RESET_EMAIL;
}

/// One object to put into storage
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImagePayload {
    #[serde(with = "base64_bytes")]
    pub image: Vec<u8>,
    pub object_key: String,
    /// File extension without the dot, used to derive the content type
    pub extension: String,
}

impl fmt::Debug for UploadImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadImagePayload")
            .field("image_len", &self.image.len())
            .field("object_key", &self.object_key)
            .field("extension", &self.extension)
            .finish()
    }
}

impl TaskPayload for UploadImagePayload {
    const TASK_TYPE: &'static str = UPLOAD_S3_OBJECT;
}

/// Batch upload job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadImagesPayload(pub Vec<UploadImagePayload>);

impl TaskPayload for UploadImagesPayload {
    const TASK_TYPE: &'static str = UPLOAD_MULTIPLE_S3_OBJECTS;
}

/// Object keys to delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeleteObjectsPayload(pub Vec<String>);

impl TaskPayload for DeleteObjectsPayload {
    const TASK_TYPE: &'static str = DELETE_S3_OBJECT;
}

/// Raw bytes as a base64 string
mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(d)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_type_tags() {
        assert_eq!(VerificationMail::TASK_TYPE, "task:send_verification_email");
        assert_eq!(PasswordResetMail::TASK_TYPE, "task:send_password_reset_email");
        assert_eq!(UploadImagePayload::TASK_TYPE, "task:upload_s3_object");
        assert_eq!(UploadImagesPayload::TASK_TYPE, "task:upload_multiple_s3_objects");
        assert_eq!(DeleteObjectsPayload::TASK_TYPE, "task:delete_s3_object");
    }

    #[test]
    fn test_mail_payload_shape() {
        let payload = VerificationMail(SendMailPayload {
            email: "a@b.c".into(),
        });
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"email": "a@b.c"})
        );
    }

    #[test]
    fn test_upload_payload_encodes_bytes_as_base64() {
        let payload = UploadImagePayload {
            image: vec![0xff, 0xd8, 0xff],
            object_key: "images/avatars/abc.jpg".into(),
            extension: "jpg".into(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["image"], "/9j/");
        assert_eq!(json["objectKey"], "images/avatars/abc.jpg");

        let back: UploadImagePayload = serde_json::from_value(json).unwrap();
        assert_eq!(back.image, vec![0xff, 0xd8, 0xff]);
    }

    #[test]
    fn test_queue_name() {
        assert_eq!(QueueName::default(), QueueName::Default);
        assert_eq!("critical".parse::<QueueName>().unwrap(), QueueName::Critical);
        assert_eq!(serde_json::to_string(&QueueName::Critical).unwrap(), "\"critical\"");
    }
}
