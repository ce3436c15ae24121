#![allow(dead_code)]

use std::io::Cursor;

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use image::{DynamicImage, ImageFormat};
use serde_json::json;

use ocrgate::api::{create_router, AppState};
use ocrgate::config::Config;
use ocrgate::vision::VisionProvider;

pub const BOUNDARY: &str = "ocrgate-test-boundary";
pub const GEMINI_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

/// A valid configuration whose vision backend points at `base_url`.
pub fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.vision.api_key = "test-key".to_string();
    config.vision.base_url = Some(format!("{base_url}/v1beta"));
    config.vision.timeout_secs = 5;
    config
}

pub fn test_router(config: Config) -> Router {
    let vision = VisionProvider::new(&config.vision).expect("vision provider");
    create_router(AppState::new(config, vision))
}

pub fn create_test_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::new_rgb8(width, height);
    let mut output = Vec::new();
    img.write_to(&mut Cursor::new(&mut output), format)
        .expect("encode test image");
    output
}

pub fn small_jpeg() -> Vec<u8> {
    create_test_image(40, 20, ImageFormat::Jpeg)
}

pub enum Part<'a> {
    File {
        name: &'a str,
        filename: Option<&'a str>,
        content_type: Option<&'a str>,
        bytes: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

pub fn file_part<'a>(filename: &'a str, content_type: &'a str, bytes: &'a [u8]) -> Part<'a> {
    Part::File {
        name: "file",
        filename: Some(filename),
        content_type: Some(content_type),
        bytes,
    }
}

/// Encode parts as a `multipart/form-data` body using [`BOUNDARY`].
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                name,
                filename,
                content_type,
                bytes,
            } => {
                let mut disposition = format!("Content-Disposition: form-data; name=\"{name}\"");
                if let Some(filename) = filename {
                    disposition.push_str(&format!("; filename=\"{filename}\""));
                }
                body.extend_from_slice(disposition.as_bytes());
                body.extend_from_slice(b"\r\n");
                if let Some(content_type) = content_type {
                    body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
                }
                body.extend_from_slice(b"\r\n");
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// A successful `generateContent` response carrying `text`.
pub fn gemini_body(text: &str) -> serde_json::Value {
    json!({
        "candidates": [
            {
                "content": {
                    "role": "model",
                    "parts": [{ "text": text }]
                },
                "finishReason": "STOP",
                "index": 0
            }
        ],
        "usageMetadata": {
            "promptTokenCount": 1,
            "candidatesTokenCount": 1,
            "totalTokenCount": 2
        }
    })
}

pub fn gemini_error_body(code: u16, message: &str, status: &str) -> serde_json::Value {
    json!({
        "error": {
            "code": code,
            "message": message,
            "status": status
        }
    })
}
