//! Gemini API Integration
//!
//! `models/{model}:generateContent` REST呼び出し

use super::LlmClient;
use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::HeaderValue;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// APIキーを運ぶヘッダー
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini APIクライアント
#[derive(Debug, Clone)]
pub struct GeminiClient {
    /// APIキー
    api_key: SecretString,
    /// モデル名
    model: String,
    /// APIベースURL
    base_url: String,
    /// リクエストタイムアウト
    timeout: Duration,
    /// HTTPクライアント
    client: Client,
}

impl GeminiClient {
    /// 新しいGeminiクライアントを作成
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("content-agent-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            api_key: SecretString::new(api_key.into().into_boxed_str()),
            model: model.into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout: Duration::from_secs(60),
            client,
        })
    }

    /// 設定から作成。APIキー未設定はエラー
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Config(
                "Gemini API key not configured (set GEMINI_API_KEY)".to_string(),
            ));
        }

        Ok(Self::new(config.api_key.clone(), config.model.clone())?
            .with_base_url(config.endpoint.clone())
            .with_timeout(Duration::from_secs(config.timeout_seconds)))
    }

    /// ビルダーパターン: カスタムベースURL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// ビルダーパターン: タイムアウト設定
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn api_key_header(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(self.api_key.expose_secret())
            .map_err(|_| Error::Config("Gemini API key contains invalid characters".to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let start_time = Instant::now();
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "Calling text generation");

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key_header()?)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let text = extract_text(&body)?;
        info!(
            model = %self.model,
            response_chars = text.len(),
            duration_ms = start_time.elapsed().as_millis() as u64,
            "Text generated"
        );
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// `candidates[0].content.parts[0].text` を取り出す
fn extract_text(body: &str) -> Result<String> {
    let response: GenerateContentResponse = serde_json::from_str(body)?;

    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| {
            Error::ParseError(format!("No content generated. API response: {}", body))
        })
}

/// generateContent リクエスト
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
}

/// generateContent レスポンス
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some("Hello".to_string()),
                }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"contents": [{"role": "user", "parts": [{"text": "Hello"}]}]})
        );
    }

    #[test]
    fn test_extract_text() {
        let body = r##"{"candidates":[{"content":{"role":"model","parts":[{"text":"# Title"}]}}]}"##;
        assert_eq!(extract_text(body).unwrap(), "# Title");
    }

    #[test]
    fn test_extract_text_missing_path() {
        assert!(matches!(
            extract_text(r#"{"candidates":[]}"#),
            Err(Error::ParseError(_))
        ));
        assert!(matches!(
            extract_text(r#"{"candidates":[{"content":{"parts":[]}}]}"#),
            Err(Error::ParseError(_))
        ));
        assert!(matches!(extract_text("not json"), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = GeneratorConfig::default();
        assert!(matches!(
            GeminiClient::from_config(&config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_endpoint_uses_model() {
        let client = GeminiClient::new("k", "gemini-2.0-flash")
            .unwrap()
            .with_base_url("http://localhost:9999/v1beta/");
        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(client.model_name(), "gemini-2.0-flash");
    }

    #[test]
    fn test_api_key_header_is_sensitive() {
        let client = GeminiClient::new("secret-key", "gemini-2.0-flash").unwrap();
        let header = client.api_key_header().unwrap();
        assert!(header.is_sensitive());
        assert_eq!(header, "secret-key");
        assert!(!format!("{:?}", client).contains("secret-key"));

        let invalid = GeminiClient::new("bad\nkey", "gemini-2.0-flash").unwrap();
        assert!(matches!(invalid.api_key_header(), Err(Error::Config(_))));
    }
}
