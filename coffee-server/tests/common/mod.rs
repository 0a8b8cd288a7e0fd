//! Shared helpers for integration tests
//!
//! Every test gets its own `mem://` database, the real router and in-memory
//! stand-ins for SMTP and S3.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use coffee_server::auth::{LinkPurpose, generate_code, hash_code, hash_password};
use coffee_server::build_app;
use coffee_server::core::{Config, ServerState};
use coffee_server::db::DbService;
use coffee_server::db::models::{Product, ProductCreate, TaskRecord, User, UserCreate};
use coffee_server::mail::{MailError, Mailer};
use coffee_server::storage::{ObjectStore, StorageError};
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use image::{ImageFormat, RgbImage};
use serde_json::Value;
use shared::models::{ProductCategory, Role};
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const PASSWORD: &str = "espresso-42";

pub struct TestApp {
    pub state: ServerState,
    pub app: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        let config = Config::with_overrides("mem://", JWT_SECRET);
        let db = DbService::in_memory().await.expect("in-memory database");
        let state = ServerState::new(config, db.db);
        let app = build_app(state.clone());
        Self { state, app }
    }

    /// Send a request through the router, returning status and JSON body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn create_user(&self, username: &str, role: Role) -> User {
        self.state
            .users()
            .create(UserCreate {
                username: username.to_string(),
                email: format!("{username}@coffee.shop"),
                phone_number: String::new(),
                password: hash_password(PASSWORD).unwrap(),
                role,
            })
            .await
            .unwrap()
    }

    pub fn token_for(&self, user: &User) -> String {
        self.state
            .get_jwt_service()
            .generate_token(&user.id_string(), &user.username, user.role)
            .unwrap()
    }

    pub async fn create_product(
        &self,
        name: &str,
        price: f64,
        discount: f64,
        category: ProductCategory,
    ) -> Product {
        self.state
            .products()
            .create(ProductCreate {
                name: name.to_string(),
                price,
                discount,
                category,
                summary: format!("{name} summary"),
                description: format!("{name} description"),
                ingredients: vec!["water".to_string()],
                thumbnail: format!("images/products/thumbnails/{name}.png"),
                images: vec![format!("images/products/{category}/{name}.png")],
                author: "user:admin".to_string(),
            })
            .await
            .unwrap()
    }

    /// Store a link code for `user` the way the mail job does, returning the plain code
    pub async fn issue_link(&self, user: &User, purpose: LinkPurpose, expires_at: i64) -> String {
        let code = generate_code().unwrap();
        self.state
            .link_codes()
            .store(user.id.as_ref().unwrap(), purpose, hash_code(&code), expires_at)
            .await
            .unwrap();
        code
    }

    /// Make every insert into the `task` table fail
    pub async fn reject_tasks(&self) {
        self.state
            .get_db()
            .query("DEFINE FIELD task_type ON TABLE task ASSERT false")
            .await
            .unwrap()
            .check()
            .unwrap();
    }

    /// Jobs currently in the queue
    pub async fn queued_tasks(&self) -> Vec<TaskRecord> {
        self.state
            .get_db()
            .query("SELECT * FROM task ORDER BY created_at")
            .await
            .unwrap()
            .take(0)
            .unwrap()
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// One part of a multipart body
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, Vec<u8>),
}

const BOUNDARY: &str = "coffee-test-boundary";

pub fn multipart_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    parts: Vec<Part<'_>>,
) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(&bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder().method(method).uri(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

pub fn png_bytes() -> Vec<u8> {
    let img = RgbImage::new(4, 4);
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

/// A delivered mail
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Records mails instead of sending them
#[derive(Default)]
pub struct FakeMailer {
    pub sent: Mutex<Vec<SentMail>>,
    pub fail: AtomicBool,
}

impl FakeMailer {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailError::Transport("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Records puts and deletes instead of calling S3
#[derive(Default)]
pub struct FakeObjectStore {
    /// (key, content type, size)
    pub puts: Mutex<Vec<(String, String, usize)>>,
    pub deletes: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

impl FakeObjectStore {
    pub fn puts(&self) -> Vec<(String, String, usize)> {
        self.puts.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Put {
                key: key.to_string(),
                message: "bucket unavailable".to_string(),
            });
        }
        self.puts
            .lock()
            .unwrap()
            .push((key.to_string(), content_type.to_string(), bytes.len()));
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Delete {
                key: key.to_string(),
                message: "bucket unavailable".to_string(),
            });
        }
        self.deletes.lock().unwrap().push(key.to_string());
        Ok(())
    }
}
