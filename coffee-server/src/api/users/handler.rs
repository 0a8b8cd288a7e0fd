//! User API Handlers

use std::time::Duration;

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use http::StatusCode;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    ForgotPasswordRequest, LinkQuery, LoginRequest, ResetPasswordRequest, Role, SignupRequest,
};
use shared::response::{ApiResponse, ListResponse};
use shared::task::{QueueName, SendMailPayload, VerificationMail};
use shared::util::is_expired;
use validator::Validate;

use crate::api::form::MultipartForm;
use crate::auth::{CurrentUser, LinkPurpose, hash_code, hash_password, verify_password};
use crate::core::ServerState;
use crate::db::models::{LinkCode, User, UserCreate, UserUpdate};
use crate::db::repository::RepoError;
use crate::media::{AVATAR_PREFIX, validate_image};
use crate::security_log;
use crate::tasks::TaskOptions;

fn critical(max_retry: u32, delay: Duration) -> TaskOptions {
    TaskOptions::new()
        .queue(QueueName::Critical)
        .max_retry(max_retry)
        .process_in(delay)
}

fn user_error(id: &str, err: RepoError) -> AppError {
    match err {
        RepoError::NotFound(_) | RepoError::Validation(_) => {
            AppError::new(ErrorCode::UserNotFound).with_detail("id", id)
        }
        RepoError::Duplicate(msg) if msg.starts_with("Email") => {
            AppError::with_message(ErrorCode::EmailExists, msg)
        }
        RepoError::Duplicate(msg) if msg.starts_with("Username") => {
            AppError::with_message(ErrorCode::UsernameExists, msg)
        }
        other => other.into(),
    }
}

fn issue_token(state: &ServerState, user: &User) -> AppResult<String> {
    state
        .get_jwt_service()
        .generate_token(&user.id_string(), &user.username, user.role)
        .map_err(|e| AppError::internal(format!("Failed to issue token: {e}")))
}

/// Only the account owner may change or delete it
fn ensure_self(current_user: &CurrentUser, id: &str) -> AppResult<()> {
    if current_user.is_self(id) {
        return Ok(());
    }
    security_log!(
        "WARN",
        "foreign_account",
        user_id = current_user.id.clone(),
        target = id.to_string()
    );
    Err(AppError::forbidden("You can only modify your own account"))
}

/// POST /signup
pub async fn signup(
    State(state): State<ServerState>,
    Json(req): Json<SignupRequest>,
) -> AppResult<(StatusCode, ApiResponse<User>)> {
    req.validate()?;

    let email = req.email.trim().to_lowercase();
    let password = hash_password(&req.password)?;
    let verification = state.tasks().job(
        &VerificationMail(SendMailPayload {
            email: email.clone(),
        }),
        &critical(3, Duration::from_secs(3)),
    )?;
    let user = state
        .users()
        .create_with_tasks(
            UserCreate {
                username: req.username.trim().to_string(),
                email: email.clone(),
                phone_number: req.phone_number.trim().to_string(),
                password,
                role: Role::User,
            },
            vec![verification],
        )
        .await
        .map_err(|e| user_error(&email, e))?;

    let token = issue_token(&state, &user)?;

    tracing::info!(user_id = %user.id_string(), username = %user.username, "User signed up");

    Ok((
        StatusCode::CREATED,
        ApiResponse::success(user).with_token(token),
    ))
}

/// POST /login
///
/// Unknown email and wrong password answer the same 401.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<()>> {
    req.validate()?;

    let email = req.email.trim().to_lowercase();
    let user = state
        .users()
        .find_by_email(&email)
        .await?
        .filter(|user| verify_password(&req.password, &user.password));

    let Some(user) = user else {
        security_log!("WARN", "login_failed", email = email);
        return Err(AppError::invalid_credentials());
    };

    let token = issue_token(&state, &user)?;
    tracing::info!(user_id = %user.id_string(), "User logged in");

    Ok(ApiResponse::ok().with_token(token))
}

/// POST /forgotpassword
pub async fn forgot_password(
    State(state): State<ServerState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    req.validate()?;

    let email = req.email.trim().to_lowercase();
    let user = state
        .users()
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound).with_detail("email", email.as_str()))?;

    state
        .tasks()
        .send_password_reset_mail(&user.email, critical(10, Duration::from_secs(60)))
        .await?;

    Ok(ApiResponse::ok())
}

/// Redeem a link code
///
/// Unknown codes, codes already used and codes issued for the other purpose
/// all answer the same 400.
async fn redeem(
    state: &ServerState,
    link: &LinkQuery,
    purpose: LinkPurpose,
) -> AppResult<LinkCode> {
    let code = state
        .link_codes()
        .consume(&hash_code(link.token.trim()), purpose)
        .await?;

    let Some(code) = code else {
        security_log!("WARN", "invalid_link", purpose = purpose.path());
        return Err(AppError::new(ErrorCode::LinkInvalid));
    };
    if is_expired(code.expires_at) {
        return Err(AppError::new(ErrorCode::LinkExpired));
    }
    Ok(code)
}

/// PUT /resetpassword?token=<code>&timestamp=<expiry ms>
pub async fn reset_password(
    State(state): State<ServerState>,
    Query(link): Query<LinkQuery>,
    Json(req): Json<ResetPasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    req.validate()?;
    if req.password != req.confirm_password {
        return Err(AppError::new(ErrorCode::PasswordMismatch));
    }
    let hash = hash_password(&req.password)?;

    let code = redeem(&state, &link, LinkPurpose::ResetPassword).await?;
    let user_id = code.user.to_string();
    let user = state
        .users()
        .update_password(&user_id, hash)
        .await
        .map_err(|e| user_error(&user_id, e))?;

    security_log!("INFO", "password_reset", user_id = user.id_string());
    Ok(ApiResponse::ok())
}

/// GET /verify?token=<code>&timestamp=<expiry ms>
pub async fn verify(
    State(state): State<ServerState>,
    Query(link): Query<LinkQuery>,
) -> AppResult<ApiResponse<User>> {
    let code = redeem(&state, &link, LinkPurpose::Verify).await?;
    let user_id = code.user.to_string();
    let user = state
        .users()
        .mark_verified(&user_id)
        .await
        .map_err(|e| user_error(&user_id, e))?;

    tracing::info!(user_id = %user.id_string(), "Email verified");
    Ok(ApiResponse::success(user))
}

/// GET /users
pub async fn list(State(state): State<ServerState>) -> AppResult<ListResponse<User>> {
    let users = state.users().find_all().await?;
    Ok(ListResponse::new(users))
}

/// GET /users/{id} - the caller's own account, or any account for admins
pub async fn get_by_id(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<User>> {
    if !current_user.is_self(&id) && !current_user.is_admin() {
        security_log!(
            "WARN",
            "foreign_account",
            user_id = current_user.id.clone(),
            target = id.clone()
        );
        return Err(AppError::forbidden("You can only view your own account"));
    }

    let user = state
        .users()
        .find_by_id(&id)
        .await
        .map_err(|e| user_error(&id, e))?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound).with_detail("id", id.as_str()))?;

    Ok(ApiResponse::success(user))
}

/// PUT /users/{id} (multipart: username, phoneNumber, avatar)
pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<User>> {
    ensure_self(&current_user, &id)?;

    let form = MultipartForm::read(multipart).await?;
    let avatar = form
        .file("avatar")
        .map(|file| {
            validate_image(file.file_name.as_deref(), file.bytes.clone())
                .map(|upload| upload.into_payload(AVATAR_PREFIX))
        })
        .transpose()?;

    let update = UserUpdate {
        username: form.text("username"),
        phone_number: form.text("phoneNumber"),
        avatar: avatar.as_ref().map(|a| a.object_key.clone()),
    };
    if update.is_empty() {
        return Err(AppError::invalid_request("No fields to update"));
    }

    let users = state.users();
    let previous = users
        .find_by_id(&id)
        .await
        .map_err(|e| user_error(&id, e))?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound).with_detail("id", id.as_str()))?;

    let user = users.update(&id, update).await.map_err(|e| user_error(&id, e))?;

    if let Some(avatar) = avatar {
        let tasks = state.tasks();
        tasks
            .upload_object(avatar, critical(3, Duration::from_secs(1)))
            .await?;
        if previous.has_custom_avatar() {
            tasks
                .delete_objects(
                    vec![previous.avatar.clone()],
                    critical(3, Duration::from_secs(3 * 60)),
                )
                .await?;
        }
    }

    Ok(ApiResponse::success(user))
}

/// DELETE /users/{id}
pub async fn delete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    ensure_self(&current_user, &id)?;

    let user = state
        .users()
        .delete(&id)
        .await
        .map_err(|e| user_error(&id, e))?;

    if user.has_custom_avatar() {
        state
            .tasks()
            .delete_objects(vec![user.avatar.clone()], critical(3, Duration::from_secs(60)))
            .await?;
    }

    tracing::info!(user_id = %user.id_string(), "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
