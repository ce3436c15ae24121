//! Wire types for the HTTP surface.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// `GET /` body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
    pub name: String,
    pub version: String,
}

/// `GET /health` body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Result of `POST /ocr`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OcrResponse {
    pub success: bool,
    /// Filename as sent by the client, `null` when the part had none.
    pub filename: Option<String>,
    pub content_type: String,
    pub extracted_text: String,
}

/// Result of `POST /ocr-with-prompt`; echoes the prompt actually used.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OcrWithPromptResponse {
    pub success: bool,
    pub filename: Option<String>,
    pub content_type: String,
    pub prompt: String,
    pub extracted_text: String,
}

/// Error body shared by every failing request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PromptQuery {
    /// Instruction for the vision model. A multipart `prompt` field takes precedence.
    pub prompt: Option<String>,
}
