//! Uploaded image checks and object naming

use ring::rand::{SecureRandom, SystemRandom};
use shared::error::{AppError, ErrorCode};
use shared::task::UploadImagePayload;

/// Maximum upload size (5MB)
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Supported image formats
pub const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

pub const PRODUCT_THUMBNAIL_PREFIX: &str = "images/products/thumbnails";
pub const PRODUCT_IMAGE_PREFIX: &str = "images/products";
pub const AVATAR_PREFIX: &str = "images/avatars";

/// A validated upload, ready to be handed to an upload job
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    /// Lowercase extension without the dot
    pub extension: String,
    /// `<random hex>.<extension>`
    pub file_name: String,
}

impl ImageUpload {
    pub fn object_key(&self, prefix: &str) -> String {
        format!("{}/{}", prefix, self.file_name)
    }

    /// Upload job for this image under `prefix`
    pub fn into_payload(self, prefix: &str) -> UploadImagePayload {
        UploadImagePayload {
            object_key: self.object_key(prefix),
            image: self.bytes,
            extension: self.extension,
        }
    }
}

/// Check size, extension and that the bytes decode as an image
pub fn validate_image(file_name: Option<&str>, bytes: Vec<u8>) -> Result<ImageUpload, AppError> {
    if bytes.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyFile));
    }

    if bytes.len() > MAX_FILE_SIZE {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!("File too large: {} bytes (max {})", bytes.len(), MAX_FILE_SIZE),
        ));
    }

    let extension = file_name
        .and_then(|name| std::path::Path::new(name).extension())
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !SUPPORTED_FORMATS.contains(&extension.as_str()) {
        return Err(AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            format!("Unsupported format: {extension}. Supported: png, jpg, jpeg, webp"),
        ));
    }

    image::load_from_memory(&bytes).map_err(|e| {
        AppError::with_message(ErrorCode::InvalidImageFile, format!("Invalid image: {e}"))
    })?;

    let file_name = format!("{}.{}", random_name()?, extension);
    Ok(ImageUpload {
        bytes,
        extension,
        file_name,
    })
}

/// 32 hex characters from the system RNG
pub fn random_name() -> Result<String, AppError> {
    let mut bytes = [0u8; 16];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::internal("Failed to generate object name"))?;
    Ok(hex::encode(bytes))
}

/// MIME type for an extension, `application/octet-stream` when unknown
pub fn content_type(extension: &str) -> String {
    mime_guess::from_ext(extension)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::new(2, 2);
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_valid_png() {
        let upload = validate_image(Some("latte.PNG"), png_bytes()).unwrap();
        assert_eq!(upload.extension, "png");
        assert!(upload.file_name.ends_with(".png"));
        assert_eq!(upload.file_name.len(), 32 + 4);
        assert!(upload.object_key(AVATAR_PREFIX).starts_with("images/avatars/"));
    }

    #[test]
    fn test_into_payload() {
        let upload = validate_image(Some("mocha.png"), png_bytes()).unwrap();
        let key = upload.object_key(PRODUCT_THUMBNAIL_PREFIX);
        let payload = upload.into_payload(PRODUCT_THUMBNAIL_PREFIX);
        assert_eq!(payload.object_key, key);
        assert_eq!(payload.extension, "png");
        assert_eq!(payload.image, png_bytes());
    }

    #[test]
    fn test_rejects_unsupported_extension() {
        let err = validate_image(Some("latte.gif"), png_bytes()).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedFileFormat);
    }

    #[test]
    fn test_rejects_garbage() {
        let err = validate_image(Some("latte.png"), b"not an image".to_vec()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidImageFile);
    }

    #[test]
    fn test_rejects_empty_and_large() {
        assert_eq!(
            validate_image(Some("a.png"), Vec::new()).unwrap_err().code,
            ErrorCode::EmptyFile
        );
        assert_eq!(
            validate_image(Some("a.png"), vec![0u8; MAX_FILE_SIZE + 1])
                .unwrap_err()
                .code,
            ErrorCode::FileTooLarge
        );
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type("png"), "image/png");
        assert_eq!(content_type("jpg"), "image/jpeg");
        assert_eq!(content_type("webp"), "image/webp");
    }
}
