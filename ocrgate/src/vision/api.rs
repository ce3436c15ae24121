use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{parse_vision_provider_model, VisionConfig};
use crate::error::{GatewayError, Result};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

#[derive(Clone, Debug)]
pub struct GeminiVisionClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Clone, Debug)]
pub struct OpenAiVisionClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

// Gemini `generateContent` wire types.

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

// OpenAI-compatible chat wire types.

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

/// Error envelope shared by both APIs: `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn build_http_client(config: &VisionConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| GatewayError::Vision(format!("Failed to create HTTP client: {e}")))
}

fn require_api_key(config: &VisionConfig) -> Result<String> {
    let api_key = config.api_key.trim();
    if api_key.is_empty() {
        return Err(GatewayError::Vision(
            "API key required for vision model".to_string(),
        ));
    }
    Ok(api_key.to_string())
}

/// Turn a non-2xx response into a vision error carrying the upstream message.
async fn upstream_error(resp: Response) -> GatewayError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);
    GatewayError::Vision(format!("Vision API request failed: {status} - {message}"))
}

impl GeminiVisionClient {
    pub fn new(config: &VisionConfig) -> Result<Self> {
        let api_key = require_api_key(config)?;
        let (_, model) = parse_vision_provider_model(&config.model);

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| GEMINI_BASE_URL.to_string());

        Ok(Self {
            client: build_http_client(config)?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn extract(&self, image_bytes: &[u8], mime_type: &str, prompt: &str) -> Result<String> {
        let request = Self::build_request(image_bytes, mime_type, prompt);

        let resp = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Vision(format!("Vision API request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(upstream_error(resp).await);
        }

        let response: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::Vision(format!("Failed to parse response: {e}")))?;

        Self::extract_text(response)
    }

    fn build_request(image_bytes: &[u8], mime_type: &str, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: STANDARD.encode(image_bytes),
                        },
                    },
                ],
            }],
        }
    }

    /// Concatenate the text parts of the first candidate.
    fn extract_text(response: GenerateContentResponse) -> Result<String> {
        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "unknown".to_string());
            return Err(GatewayError::Vision(format!(
                "Vision model returned no candidates (block reason: {reason})"
            )));
        };

        let texts: Vec<String> = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if texts.is_empty() {
            return Err(GatewayError::Vision(
                "Vision model response contained no text".to_string(),
            ));
        }

        Ok(texts.concat())
    }
}

impl OpenAiVisionClient {
    pub fn new(config: &VisionConfig) -> Result<Self> {
        let api_key = require_api_key(config)?;
        let (provider, model) = parse_vision_provider_model(&config.model);

        let base_url = config.base_url.clone().unwrap_or_else(|| {
            match provider.to_lowercase().as_str() {
                "openrouter" => OPENROUTER_BASE_URL,
                _ => OPENAI_BASE_URL,
            }
            .to_string()
        });

        Ok(Self {
            client: build_http_client(config)?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn extract(&self, image_bytes: &[u8], mime_type: &str, prompt: &str) -> Result<String> {
        let request = self.build_request(image_bytes, mime_type, prompt);

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Vision(format!("Vision API request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(upstream_error(resp).await);
        }

        let chat_response: ChatResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::Vision(format!("Failed to parse response: {e}")))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GatewayError::Vision("Vision model response contained no text".to_string()))
    }

    fn build_request(&self, image_bytes: &[u8], mime_type: &str, prompt: &str) -> ChatRequest {
        let data_url = format!("data:{mime_type};base64,{}", STANDARD.encode(image_bytes));

        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        text: prompt.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            max_tokens: 4096,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_test_config(model: &str) -> VisionConfig {
        VisionConfig {
            api_key: "test-key".to_string(),
            model: model.to_string(),
            base_url: None,
            timeout_secs: 60,
        }
    }

    #[test]
    fn test_clients_require_api_key() {
        let mut config = create_test_config("gemini-2.0-flash");
        config.api_key = "  ".to_string();

        let gemini = GeminiVisionClient::new(&config);
        assert!(gemini.unwrap_err().to_string().contains("API key required"));

        let openai = OpenAiVisionClient::new(&config);
        assert!(openai.unwrap_err().to_string().contains("API key required"));
    }

    #[test]
    fn test_default_base_urls() {
        let gemini = GeminiVisionClient::new(&create_test_config("gemini-2.0-flash")).unwrap();
        assert_eq!(gemini.base_url(), GEMINI_BASE_URL);
        assert_eq!(gemini.model(), "gemini-2.0-flash");

        let openai = OpenAiVisionClient::new(&create_test_config("openai/gpt-4o-mini")).unwrap();
        assert_eq!(openai.base_url(), OPENAI_BASE_URL);
        assert_eq!(openai.model(), "gpt-4o-mini");

        let openrouter =
            OpenAiVisionClient::new(&create_test_config("openrouter/google/gemini-flash-1.5"))
                .unwrap();
        assert_eq!(openrouter.base_url(), OPENROUTER_BASE_URL);
        assert_eq!(openrouter.model(), "google/gemini-flash-1.5");
    }

    #[test]
    fn test_custom_base_url_trailing_slash_is_trimmed() {
        let mut config = create_test_config("gemini/gemini-1.5-pro");
        config.base_url = Some("http://localhost:9999/v1beta/".to_string());

        let client = GeminiVisionClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9999/v1beta");
        assert_eq!(client.model(), "gemini-1.5-pro");
    }

    #[test]
    fn test_gemini_request_shape() {
        let request =
            GeminiVisionClient::build_request(&[0xFF, 0xD8, 0xFF, 0xE0], "image/jpeg", "Read it");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": "Read it" },
                        { "inlineData": { "mimeType": "image/jpeg", "data": "/9j/4A==" } }
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_openai_request_uses_declared_mime_type() {
        let client = OpenAiVisionClient::new(&create_test_config("openai/gpt-4o")).unwrap();
        let request = client.build_request(&[0x89, 0x50], "image/png", "Read it");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["content"][0]["type"], "text");
        assert_eq!(json["messages"][0]["content"][0]["text"], "Read it");
        assert_eq!(
            json["messages"][0]["content"][1]["image_url"]["url"],
            "data:image/png;base64,iVA="
        );
    }

    #[test]
    fn test_gemini_text_parts_are_concatenated() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Hello " }, { "text": "World" }] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        assert_eq!(
            GeminiVisionClient::extract_text(response).unwrap(),
            "Hello World"
        );
    }

    #[test]
    fn test_gemini_blocked_prompt_is_an_error() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();

        let err = GeminiVisionClient::extract_text(response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }
}
