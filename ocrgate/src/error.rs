use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Client sent something we refuse to process (bad type, missing field).
    #[error("{0}")]
    Validation(String),

    /// Upload or prompt crossed its size ceiling while being read.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Any failure reported by, or while reaching, the vision model.
    #[error("{0}")]
    Vision(String),

    /// Local processing failure, e.g. the upload does not decode as an image.
    #[error("{0}")]
    Processing(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Vision(_) | GatewayError::Processing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message placed in the `detail` field of the response body.
    pub fn detail(&self) -> String {
        match self {
            GatewayError::Validation(msg) | GatewayError::PayloadTooLarge(msg) => msg.clone(),
            GatewayError::Vision(msg) | GatewayError::Processing(msg) => {
                format!("Error processing image: {msg}")
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();

        if status.is_server_error() {
            tracing::error!(error = ?self, status = status.as_u16(), "{}", detail);
        } else {
            tracing::warn!(status = status.as_u16(), "{}", detail);
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            GatewayError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::PayloadTooLarge("x".into()).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            GatewayError::Vision("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GatewayError::Processing("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn client_errors_keep_message_verbatim() {
        let err = GatewayError::Validation("Invalid file type. Allowed types: image/png".into());
        assert_eq!(err.detail(), "Invalid file type. Allowed types: image/png");
    }

    #[test]
    fn server_errors_embed_underlying_message() {
        let err = GatewayError::Vision("quota exceeded".into());
        assert_eq!(err.detail(), "Error processing image: quota exceeded");
    }

    #[tokio::test]
    async fn response_body_uses_detail_key() {
        let response = GatewayError::PayloadTooLarge("too big".into()).into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let json = body_json(response).await;
        assert_eq!(json, json!({ "detail": "too big" }));
    }
}
