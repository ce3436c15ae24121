use tracing::info;

use crate::config::{parse_vision_provider_model, VisionConfig};
use crate::error::Result;

use super::api::{GeminiVisionClient, OpenAiVisionClient};

#[derive(Clone, Debug)]
pub enum VisionBackend {
    Gemini(GeminiVisionClient),
    OpenAi(OpenAiVisionClient),
}

/// Handle to the configured vision model. Cheap to clone; shared by every request.
#[derive(Clone, Debug)]
pub struct VisionProvider {
    backend: VisionBackend,
}

impl VisionProvider {
    pub fn new(config: &VisionConfig) -> Result<Self> {
        let (provider, _) = parse_vision_provider_model(&config.model);

        let backend = match provider.to_lowercase().as_str() {
            "openai" | "openrouter" => {
                let client = OpenAiVisionClient::new(config)?;
                info!(model = %client.model(), base_url = %client.base_url(), "OpenAI-compatible vision backend initialized");
                VisionBackend::OpenAi(client)
            }
            _ => {
                let client = GeminiVisionClient::new(config)?;
                info!(model = %client.model(), "Gemini vision backend initialized");
                VisionBackend::Gemini(client)
            }
        };

        Ok(Self { backend })
    }

    pub fn backend(&self) -> &VisionBackend {
        &self.backend
    }

    pub fn model(&self) -> &str {
        match &self.backend {
            VisionBackend::Gemini(c) => c.model(),
            VisionBackend::OpenAi(c) => c.model(),
        }
    }

    /// Send one image and one instruction; return the model's text verbatim.
    pub async fn extract(&self, image_bytes: &[u8], mime_type: &str, prompt: &str) -> Result<String> {
        match &self.backend {
            VisionBackend::Gemini(c) => c.extract(image_bytes, mime_type, prompt).await,
            VisionBackend::OpenAi(c) => c.extract(image_bytes, mime_type, prompt).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;

    fn make_config(model: &str, api_key: &str) -> VisionConfig {
        VisionConfig {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: None,
            timeout_secs: 60,
        }
    }

    #[test]
    fn test_bare_model_routes_to_gemini() {
        let provider = VisionProvider::new(&make_config("gemini-2.0-flash", "k")).unwrap();
        assert!(matches!(provider.backend(), VisionBackend::Gemini(_)));
        assert_eq!(provider.model(), "gemini-2.0-flash");
    }

    #[test]
    fn test_openai_prefix_routes_to_chat_completions() {
        let provider = VisionProvider::new(&make_config("openai/gpt-4o-mini", "k")).unwrap();
        assert!(matches!(provider.backend(), VisionBackend::OpenAi(_)));
        assert_eq!(provider.model(), "gpt-4o-mini");
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let result = VisionProvider::new(&make_config("gemini-2.0-flash", ""));
        assert!(matches!(result, Err(GatewayError::Vision(_))));
    }

    #[test]
    fn test_provider_clone() {
        let provider = VisionProvider::new(&make_config("openrouter/openai/gpt-4o", "k")).unwrap();
        let cloned = provider.clone();
        assert_eq!(cloned.model(), "openai/gpt-4o");
    }
}
