use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::QueryRejection;

use crate::error::GatewayError;

impl From<MultipartRejection> for GatewayError {
    fn from(rejection: MultipartRejection) -> Self {
        GatewayError::Validation(format!("Invalid multipart request: {}", rejection.body_text()))
    }
}

impl From<MultipartError> for GatewayError {
    fn from(err: MultipartError) -> Self {
        GatewayError::Validation(format!("Failed to read multipart body: {}", err.body_text()))
    }
}

impl From<QueryRejection> for GatewayError {
    fn from(rejection: QueryRejection) -> Self {
        GatewayError::Validation(format!("Invalid query string: {}", rejection.body_text()))
    }
}
