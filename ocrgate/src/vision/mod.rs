//! Vision model adapter.
//!
//! Sends one image plus one instruction to a hosted vision-capable model and
//! returns the generated text verbatim.
//!
//! # Backends
//!
//! The backend is chosen from the `provider/model` prefix of the configured
//! model name (see [`crate::config::parse_vision_provider_model`]):
//! - `gemini` (default for bare names): Google Generative Language
//!   `generateContent` with inline image data
//! - `openai`, `openrouter`: OpenAI-compatible `chat/completions` with an
//!   image data URL
//!
//! There is no retry and no error classification: every failure becomes a
//! single [`GatewayError::Vision`](crate::error::GatewayError::Vision).
//!
//! # Usage
//!
//! ```rust,ignore
//! let vision = VisionProvider::new(&config.vision)?;
//! let text = vision.extract(&bytes, "image/png", DEFAULT_PROMPT).await?;
//! ```

mod api;
mod provider;

pub use api::{GeminiVisionClient, OpenAiVisionClient};
pub use provider::{VisionBackend, VisionProvider};
