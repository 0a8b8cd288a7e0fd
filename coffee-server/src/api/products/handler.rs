//! Product API Handlers

use std::time::Duration;

use axum::extract::{Multipart, Path, State};
use http::StatusCode;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::ProductCategory;
use shared::response::{ApiResponse, ListResponse};
use shared::task::{QueueName, UploadImagePayload, UploadImagesPayload};

use crate::api::form::{MultipartForm, split_list};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::db::repository::RepoError;
use crate::media::{PRODUCT_IMAGE_PREFIX, PRODUCT_THUMBNAIL_PREFIX, validate_image};
use crate::tasks::TaskOptions;

/// Upload jobs for a product's images
fn upload_options() -> TaskOptions {
    TaskOptions::new()
        .queue(QueueName::Critical)
        .max_retry(3)
        .process_in(Duration::from_secs(2))
}

/// Delete job for images a product no longer references
fn replaced_options() -> TaskOptions {
    TaskOptions::new()
        .queue(QueueName::Critical)
        .max_retry(3)
        .process_in(Duration::from_secs(3 * 60))
}

/// Delete job for the images of a deleted product
fn removed_options() -> TaskOptions {
    TaskOptions::new()
        .queue(QueueName::Critical)
        .max_retry(3)
        .process_in(Duration::from_secs(60))
}

fn product_error(id: &str, err: RepoError) -> AppError {
    match err {
        RepoError::NotFound(_) | RepoError::Validation(_) => {
            AppError::new(ErrorCode::ProductNotFound).with_detail("id", id)
        }
        other => other.into(),
    }
}

fn check_price(price: f64) -> AppResult<f64> {
    if !price.is_finite() || price <= 0.0 {
        return Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            format!("Price must be greater than 0, got {price}"),
        ));
    }
    Ok(price)
}

fn check_discount(discount: f64) -> AppResult<f64> {
    if !(0.0..=100.0).contains(&discount) {
        return Err(AppError::with_message(
            ErrorCode::ProductInvalidDiscount,
            format!("Discount must be between 0 and 100, got {discount}"),
        ));
    }
    Ok(discount)
}

/// `ingridients` is the field name older clients send
fn ingredients(form: &MultipartForm) -> Option<Vec<String>> {
    form.text("ingredients")
        .or_else(|| form.text("ingridients"))
        .map(|v| split_list(&v))
}

/// Validate the `thumbnail` file, if any
fn thumbnail_upload(form: &MultipartForm) -> AppResult<Option<UploadImagePayload>> {
    form.file("thumbnail")
        .map(|file| {
            validate_image(file.file_name.as_deref(), file.bytes.clone())
                .map(|upload| upload.into_payload(PRODUCT_THUMBNAIL_PREFIX))
        })
        .transpose()
}

/// Validate every `images` file
fn gallery_uploads(
    form: &MultipartForm,
    category: ProductCategory,
) -> AppResult<Vec<UploadImagePayload>> {
    let prefix = format!("{}/{}", PRODUCT_IMAGE_PREFIX, category);
    form.files("images")
        .iter()
        .map(|file| {
            validate_image(file.file_name.as_deref(), file.bytes.clone())
                .map(|upload| upload.into_payload(&prefix))
        })
        .collect()
}

/// GET /products
pub async fn list(State(state): State<ServerState>) -> AppResult<ListResponse<Product>> {
    let products = state.products().find_all().await?;
    Ok(ListResponse::new(products))
}

/// GET /products/{category}/{id}
///
/// A product filed under another category is reported as missing.
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path((category, id)): Path<(String, String)>,
) -> AppResult<ApiResponse<Product>> {
    let product = state
        .products()
        .find_by_id(&id)
        .await
        .map_err(|e| product_error(&id, e))?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound).with_detail("id", id.as_str()))?;

    match category.parse::<ProductCategory>() {
        Ok(c) if c == product.category => Ok(ApiResponse::success(product)),
        _ => Err(AppError::new(ErrorCode::ProductNotFound).with_detail("id", id)),
    }
}

/// POST /products (multipart)
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, ApiResponse<Product>)> {
    let form = MultipartForm::read(multipart).await?;

    let name = form.require_text("name")?;
    let price = form
        .parse::<f64>("price", ErrorCode::ProductInvalidPrice)?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::RequiredField, "price is required")
                .with_detail("field", "price")
        })
        .and_then(check_price)?;
    let discount = form
        .parse::<f64>("discount", ErrorCode::ProductInvalidDiscount)?
        .map(check_discount)
        .transpose()?
        .unwrap_or(0.0);
    let category = form
        .parse::<ProductCategory>("category", ErrorCode::ProductCategoryInvalid)?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::RequiredField, "category is required")
                .with_detail("field", "category")
        })?;
    let summary = form.require_text("summary")?;
    let description = form.require_text("description")?;

    let thumbnail = thumbnail_upload(&form)?.ok_or_else(|| {
        AppError::with_message(ErrorCode::RequiredField, "thumbnail is required")
            .with_detail("field", "thumbnail")
    })?;
    let images = gallery_uploads(&form, category)?;

    let thumbnail_key = thumbnail.object_key.clone();
    let image_keys: Vec<String> = images.iter().map(|i| i.object_key.clone()).collect();

    // Uploads are queued in the transaction that creates the product
    let tasks = state.tasks();
    let mut jobs = vec![tasks.job(&thumbnail, &upload_options())?];
    if !images.is_empty() {
        jobs.push(tasks.job(&UploadImagesPayload(images), &upload_options())?);
    }

    let product = state
        .products()
        .create_with_tasks(
            ProductCreate {
                name,
                price,
                discount,
                category,
                summary,
                description,
                ingredients: ingredients(&form).unwrap_or_default(),
                thumbnail: thumbnail_key,
                images: image_keys,
                author: current_user.id.clone(),
            },
            jobs,
        )
        .await?;

    tracing::info!(
        product_id = %product.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
        author = %current_user.id,
        "Product created"
    );

    Ok((StatusCode::CREATED, ApiResponse::success(product)))
}

/// PUT /products/{id} (multipart, all fields optional)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<Product>> {
    let repo = state.products();
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| product_error(&id, e))?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound).with_detail("id", id.as_str()))?;

    let form = MultipartForm::read(multipart).await?;

    let category = form.parse::<ProductCategory>("category", ErrorCode::ProductCategoryInvalid)?;
    let thumbnail = thumbnail_upload(&form)?;
    let images = gallery_uploads(&form, category.unwrap_or(existing.category))?;

    let update = ProductUpdate {
        name: form.text("name"),
        price: form
            .parse::<f64>("price", ErrorCode::ProductInvalidPrice)?
            .map(check_price)
            .transpose()?,
        discount: form
            .parse::<f64>("discount", ErrorCode::ProductInvalidDiscount)?
            .map(check_discount)
            .transpose()?,
        category,
        summary: form.text("summary"),
        description: form.text("description"),
        ingredients: ingredients(&form),
        thumbnail: thumbnail.as_ref().map(|t| t.object_key.clone()),
        images: (!images.is_empty()).then(|| images.iter().map(|i| i.object_key.clone()).collect()),
    };

    if update.is_empty() {
        return Err(AppError::invalid_request("No fields to update"));
    }

    let product = repo.update(&id, update).await.map_err(|e| product_error(&id, e))?;

    let tasks = state.tasks();
    let mut stale = Vec::new();
    if let Some(thumbnail) = thumbnail {
        tasks.upload_object(thumbnail, upload_options()).await?;
        if !existing.thumbnail.is_empty() {
            stale.push(existing.thumbnail.clone());
        }
    }
    if !images.is_empty() {
        tasks.upload_objects(images, upload_options()).await?;
        stale.extend(existing.images.iter().cloned());
    }
    if !stale.is_empty() {
        tasks.delete_objects(stale, replaced_options()).await?;
    }

    Ok(ApiResponse::success(product))
}

/// DELETE /products/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let product = state
        .products()
        .delete(&id)
        .await
        .map_err(|e| product_error(&id, e))?;

    let keys = product.object_keys();
    if !keys.is_empty() {
        state.tasks().delete_objects(keys, removed_options()).await?;
    }

    tracing::info!(product_id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
