use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OCR API",
        description = "Extracts text from uploaded images using a hosted vision model.",
    ),
    paths(
        handlers::health::root,
        handlers::health::health_check,
        handlers::ocr::extract_text,
        handlers::ocr::extract_text_with_prompt,
    ),
    components(schemas(
        dto::RootResponse,
        dto::HealthResponse,
        dto::OcrResponse,
        dto::OcrWithPromptResponse,
        dto::ErrorResponse,
    )),
    tags(
        (name = "health", description = "Liveness and service identity"),
        (name = "ocr", description = "Image text extraction"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
