//! Upload checks run before any call to the vision model.
//!
//! Everything here is pure: no logging, no I/O. Handlers decide what to
//! report and how.

use image::{GenericImageView, ImageReader};

use crate::config::UploadConfig;
use crate::error::{GatewayError, Result};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Ceiling for the multipart `prompt` field.
pub const MAX_PROMPT_BYTES: usize = 16 * 1024;

/// Exact, case-sensitive membership in the allow-list.
pub fn is_type_allowed(content_type: &str, allowed: &[String]) -> bool {
    allowed.iter().any(|t| t == content_type)
}

/// Reject iff `len` exceeds `limit`.
pub fn check_size(len: usize, limit: usize) -> Result<()> {
    if len > limit {
        return Err(GatewayError::PayloadTooLarge(format!(
            "File too large. Maximum size is {:.2}MB",
            limit as f64 / BYTES_PER_MB
        )));
    }
    Ok(())
}

/// Reject a prompt field once it grows past [`MAX_PROMPT_BYTES`].
pub fn check_prompt_size(len: usize) -> Result<()> {
    if len > MAX_PROMPT_BYTES {
        return Err(GatewayError::PayloadTooLarge(format!(
            "Prompt too large. Maximum size is {MAX_PROMPT_BYTES} bytes"
        )));
    }
    Ok(())
}

pub fn decode_prompt(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|_| GatewayError::Validation("Prompt must be valid UTF-8 text".to_string()))
}

/// Validate a declared content type against the configured allow-list.
pub fn check_type(content_type: &str, config: &UploadConfig) -> Result<()> {
    if is_type_allowed(content_type, &config.allowed_types) {
        Ok(())
    } else {
        Err(GatewayError::Validation(format!(
            "Invalid file type. Allowed types: {}",
            config.allowed_types.join(", ")
        )))
    }
}

/// Format and dimensions of a decoded upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: Option<image::ImageFormat>,
    pub width: u32,
    pub height: u32,
}

/// Decode `bytes` to confirm they form a well-formed image.
///
/// The decoded pixels are discarded; the original bytes are what gets sent
/// upstream.
pub fn probe_image(bytes: &[u8]) -> Result<ImageInfo> {
    let reader = ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| GatewayError::Processing(format!("Failed to read image: {e}")))?;

    let format = reader.format();
    let img = reader
        .decode()
        .map_err(|e| GatewayError::Processing(format!("Failed to decode image: {e}")))?;

    let (width, height) = img.dimensions();
    Ok(ImageInfo {
        format,
        width,
        height,
    })
}
