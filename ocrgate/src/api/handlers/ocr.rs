//! OCR handlers.
//!
//! Both endpoints run the same pipeline: type check, bounded read, size
//! check, image probe, then one vision model call. Any failure short-circuits
//! into a [`GatewayError`], which renders the response.

use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use axum::Json;
use tracing::{debug, info};

use crate::api::dto::{ErrorResponse, OcrResponse, OcrWithPromptResponse, PromptQuery};
use crate::api::state::AppState;
use crate::config::{UploadConfig, DEFAULT_PROMPT};
use crate::error::{GatewayError, Result};
use crate::upload;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A validated upload, alive for one request.
#[derive(Debug)]
struct Upload {
    bytes: Vec<u8>,
    content_type: String,
    filename: Option<String>,
}

/// Multipart fields this service understands.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<Upload>,
    prompt: Option<String>,
}

/// Read the field chunk by chunk, giving up as soon as `limit` is crossed.
async fn read_limited(field: &mut Field<'_>, limit: usize) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await? {
        upload::check_size(bytes.len() + chunk.len(), limit)?;
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn read_prompt(field: &mut Field<'_>) -> Result<String> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await? {
        upload::check_prompt_size(bytes.len() + chunk.len())?;
        bytes.extend_from_slice(&chunk);
    }
    upload::decode_prompt(bytes)
}

async fn read_form(multipart: &mut Multipart, config: &UploadConfig) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" if form.file.is_none() => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field
                    .content_type()
                    .unwrap_or(FALLBACK_CONTENT_TYPE)
                    .to_string();

                info!(filename = ?filename, content_type = %content_type, "OCR upload received");

                upload::check_type(&content_type, config)?;
                let bytes = read_limited(&mut field, config.max_bytes()).await?;

                form.file = Some(Upload {
                    bytes,
                    content_type,
                    filename,
                });
            }
            "prompt" => {
                form.prompt = Some(read_prompt(&mut field).await?);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Probe the image and hand it to the vision model.
async fn run_extraction(state: &AppState, upload: &Upload, prompt: &str) -> Result<String> {
    let image = upload::probe_image(&upload.bytes)?;
    debug!(
        format = ?image.format,
        width = image.width,
        height = image.height,
        "Image validated"
    );

    info!(model = %state.vision.model(), "Calling vision model");
    let text = state
        .vision
        .extract(&upload.bytes, &upload.content_type, prompt)
        .await?;

    info!(filename = ?upload.filename, "Text extraction successful");
    Ok(text)
}

fn require_file(form: &mut UploadForm) -> Result<Upload> {
    form.file
        .take()
        .ok_or_else(|| GatewayError::Validation("Missing required 'file' field".to_string()))
}

/// `POST /ocr`
///
/// Extracts text with the default instruction.
#[utoipa::path(
    post,
    path = "/ocr",
    tag = "ocr",
    request_body(content_type = "multipart/form-data", content = String, description = "Multipart form with a `file` image part (JPEG, PNG, GIF, WebP)"),
    responses(
        (status = 200, description = "Text extracted", body = OcrResponse),
        (status = 400, description = "Unsupported file type or malformed form", body = ErrorResponse),
        (status = 413, description = "File exceeds the size ceiling", body = ErrorResponse),
        (status = 500, description = "Image could not be processed", body = ErrorResponse),
    )
)]
pub async fn extract_text(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<OcrResponse>> {
    let mut multipart = multipart?;
    let mut form = read_form(&mut multipart, &state.config.upload).await?;
    let upload = require_file(&mut form)?;

    let extracted_text = run_extraction(&state, &upload, DEFAULT_PROMPT).await?;

    Ok(Json(OcrResponse {
        success: true,
        filename: upload.filename,
        content_type: upload.content_type,
        extracted_text,
    }))
}

/// `POST /ocr-with-prompt`
///
/// Extracts text with a caller-supplied instruction, taken from the
/// multipart `prompt` field or the `prompt` query parameter.
#[utoipa::path(
    post,
    path = "/ocr-with-prompt",
    tag = "ocr",
    params(PromptQuery),
    request_body(content_type = "multipart/form-data", content = String, description = "Multipart form with a `file` image part and optional `prompt` text part"),
    responses(
        (status = 200, description = "Text extracted", body = OcrWithPromptResponse),
        (status = 400, description = "Unsupported file type or malformed form", body = ErrorResponse),
        (status = 413, description = "File or prompt exceeds its size ceiling", body = ErrorResponse),
        (status = 500, description = "Image could not be processed", body = ErrorResponse),
    )
)]
pub async fn extract_text_with_prompt(
    State(state): State<AppState>,
    query: std::result::Result<Query<PromptQuery>, QueryRejection>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<OcrWithPromptResponse>> {
    let Query(query) = query?;
    let mut multipart = multipart?;
    let mut form = read_form(&mut multipart, &state.config.upload).await?;
    let upload = require_file(&mut form)?;

    let prompt = form
        .prompt
        .or(query.prompt)
        .unwrap_or_else(|| DEFAULT_PROMPT.to_string());

    let extracted_text = run_extraction(&state, &upload, &prompt).await?;

    Ok(Json(OcrWithPromptResponse {
        success: true,
        filename: upload.filename,
        content_type: upload.content_type,
        prompt,
        extracted_text,
    }))
}
