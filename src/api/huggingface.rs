use crate::api::body_snippet;
use crate::config::Config;
use crate::error::PosterError;
use crate::generator::RemoteGenerator;
use crate::{logi, logw};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::json;

const SERVICE: &str = "Hugging Face";

/// Stable Diffusion text-to-image through the Hugging Face inference API.
pub struct HuggingFaceGenerator {
    client: Client,
    api_key: Option<String>,
    model_url: String,
}

impl HuggingFaceGenerator {
    pub fn new(client: Client, api_key: Option<String>, model_url: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            model_url: model_url.into(),
        }
    }

    pub fn from_config(client: Client, cfg: &Config) -> Self {
        Self::new(
            client,
            cfg.huggingface_api_key.clone(),
            cfg.huggingface_model_url.clone(),
        )
    }
}

#[async_trait]
impl RemoteGenerator for HuggingFaceGenerator {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn generate(&self, prompt: &str) -> Result<String, PosterError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(PosterError::MissingCredential(SERVICE))?;

        // 512x768 keeps the poster aspect ratio.
        let body = json!({
            "inputs": prompt,
            "parameters": {
                "guidance_scale": 7.5,
                "num_inference_steps": 50,
                "width": 512,
                "height": 768,
            }
        });

        let resp = self
            .client
            .post(&self.model_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            if !raw.is_empty() {
                logw(format!("{} raw body: {}", SERVICE, body_snippet(&raw)));
            }
            return Err(PosterError::Status {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let mime = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let bytes = resp.bytes().await?;
        if bytes.is_empty() || !mime.starts_with("image/") {
            if !bytes.is_empty() {
                let raw = String::from_utf8_lossy(&bytes);
                logw(format!("{} returned {}: {}", SERVICE, mime, body_snippet(&raw)));
            }
            return Err(PosterError::EmptyResponse(SERVICE));
        }

        logi(format!("{} image received: {} bytes", SERVICE, bytes.len()));
        Ok(to_data_url(&mime, &bytes))
    }
}

pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_server;

    #[test]
    fn data_url_embeds_mime_and_payload() {
        assert_eq!(to_data_url("image/png", b"abc"), "data:image/png;base64,YWJj");
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let generator = HuggingFaceGenerator::new(Client::new(), None, "http://127.0.0.1:9/unused");
        let err = generator.generate("Movie poster for \"X\"").await.unwrap_err();
        assert!(matches!(err, PosterError::MissingCredential(SERVICE)));
        assert!(err.is_remote_failure());
    }

    #[tokio::test]
    async fn unavailable_model_maps_to_status_error() {
        let url = test_server::serve_once(
            "503 Service Unavailable",
            "application/json",
            br#"{"error":"Model is currently loading","estimated_time":20.0}"#,
        )
        .await;
        let generator =
            HuggingFaceGenerator::new(test_server::local_client(), Some("hf_test".to_string()), url);

        let err = generator.generate("Movie poster for \"X\"").await.unwrap_err();
        assert!(matches!(err, PosterError::Status { service: SERVICE, status: 503 }));
        assert!(err.is_remote_failure());
    }

    #[tokio::test]
    async fn json_success_body_is_not_an_image() {
        let url = test_server::serve_once(
            "200 OK",
            "application/json",
            br#"{"error":"unexpected payload"}"#,
        )
        .await;
        let generator =
            HuggingFaceGenerator::new(test_server::local_client(), Some("hf_test".to_string()), url);

        let err = generator.generate("Movie poster for \"X\"").await.unwrap_err();
        assert!(matches!(err, PosterError::EmptyResponse(SERVICE)));
        assert!(err.is_remote_failure());
    }

    #[tokio::test]
    async fn image_body_becomes_data_url() {
        let url = test_server::serve_once("200 OK", "image/png", b"abc").await;
        let generator =
            HuggingFaceGenerator::new(test_server::local_client(), Some("hf_test".to_string()), url);

        let reference = generator.generate("Movie poster for \"X\"").await.unwrap();
        assert_eq!(reference, "data:image/png;base64,YWJj");
    }
}
