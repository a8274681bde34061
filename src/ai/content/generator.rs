//! Content Generator
//!
//! LLMを活用した記事・プロジェクト生成

use crate::ai::content::project::{parse_project_files, ProjectFiles};
use crate::ai::content::prompt::{ArticleRequest, ProjectRequest};
use crate::ai::content::seo::{seo_prompt, SeoMetadata};
use crate::ai::llm::LlmClient;
use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{info, warn};

/// タイトルが見つからない場合の既定値
pub const DEFAULT_TITLE: &str = "Generated Content";

/// 生成されたコンテンツ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedContent {
    /// Markdown本文
    pub markdown_body: String,
    /// タイトル
    pub title: String,
    /// SEOメタデータ
    pub seo_metadata: Option<SeoMetadata>,
}

/// コンテンツ生成器
pub struct ContentGenerator {
    llm_client: Box<dyn LlmClient>,
}

impl ContentGenerator {
    /// 新しい生成器を作成
    pub fn new(llm_client: impl LlmClient + 'static) -> Self {
        Self {
            llm_client: Box::new(llm_client),
        }
    }

    pub fn model_name(&self) -> &str {
        self.llm_client.model_name()
    }

    /// 記事を生成
    pub async fn generate_article(&self, request: &ArticleRequest) -> Result<GeneratedContent> {
        info!(topic = %request.topic, content_type = %request.content_type, "Generating article");

        let markdown_body = self.llm_client.generate(&request.to_prompt()).await?;
        if markdown_body.trim().is_empty() {
            return Err(Error::ParseError("Generated article is empty".to_string()));
        }

        let title = extract_title(&markdown_body);
        let seo_metadata = if request.include_seo {
            Some(
                self.generate_seo_metadata(&markdown_body, &request.topic)
                    .await,
            )
        } else {
            None
        };

        Ok(GeneratedContent {
            markdown_body,
            title,
            seo_metadata,
        })
    }

    /// 複数ファイルのプロジェクトを生成
    pub async fn generate_project(&self, request: &ProjectRequest) -> Result<ProjectFiles> {
        info!(project = %request.project_name, project_type = %request.project_type, "Generating project");

        let response = self.llm_client.generate(&request.to_prompt()).await?;
        let files = parse_project_files(&response)?;

        info!(files = files.len(), "Project files parsed");
        Ok(files)
    }

    /// SEOメタデータを生成。失敗時はトピックから組み立てる
    pub async fn generate_seo_metadata(&self, content: &str, topic: &str) -> SeoMetadata {
        let prompt = seo_prompt(content, topic);

        let parsed = match self.llm_client.generate(&prompt).await {
            Ok(response) => SeoMetadata::from_response(&response, topic),
            Err(e) => Err(e),
        };

        match parsed {
            Ok(seo) => seo,
            Err(e) => {
                warn!(error = %e, topic = %topic, "SEO generation failed, using fallback metadata");
                SeoMetadata::fallback(topic)
            }
        }
    }
}

fn h1_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?m)^#[ \t]+(.+)$").expect("valid heading pattern"))
}

fn punctuation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^\w\s]").expect("valid punctuation pattern"))
}

/// 最初のH1見出しからタイトルを抽出
pub fn extract_title(markdown: &str) -> String {
    h1_pattern()
        .captures(markdown)
        .map(|c| {
            punctuation_pattern()
                .replace_all(c[1].trim(), "")
                .trim()
                .to_string()
        })
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// 応答を順番に返すテスト用クライアント
    struct ScriptedClient {
        responses: Mutex<VecDeque<Result<String>>>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<Result<String>>) -> (Self, Arc<Mutex<Vec<String>>>) {
            let prompts = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    responses: Mutex::new(responses.into()),
                    prompts: prompts.clone(),
                },
                prompts,
            )
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::NetworkError("no scripted response".to_string())))
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    #[test]
    fn test_extract_title() {
        assert_eq!(
            extract_title("Intro\n\n# Rust: A Guide!\n\n## Part"),
            "Rust A Guide"
        );
        assert_eq!(extract_title("## Only subheading\ntext"), DEFAULT_TITLE);
        assert_eq!(extract_title(""), DEFAULT_TITLE);
        assert_eq!(extract_title("# !!!"), DEFAULT_TITLE);
    }

    #[tokio::test]
    async fn test_generate_article_with_seo() {
        let (client, prompts) = ScriptedClient::new(vec![
            Ok("# Async Rust\n\nBody text.".to_string()),
            Ok(r#"{"title":"Async Rust","description":"d","keywords":["Rust"],"slug":"async-rust"}"#
                .to_string()),
        ]);
        let generator = ContentGenerator::new(client);

        let content = generator
            .generate_article(&ArticleRequest::new("Async Rust"))
            .await
            .unwrap();

        assert_eq!(content.title, "Async Rust");
        let seo = content.seo_metadata.unwrap();
        assert_eq!(seo.slug, "async-rust");
        assert_eq!(seo.keywords, vec!["rust".to_string()]);
        assert_eq!(prompts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_seo_failure_falls_back() {
        let (client, _) = ScriptedClient::new(vec![
            Ok("# Title\n\nBody".to_string()),
            Ok("no json at all".to_string()),
        ]);
        let generator = ContentGenerator::new(client);

        let content = generator
            .generate_article(&ArticleRequest::new("Edge AI"))
            .await
            .unwrap();
        assert_eq!(content.seo_metadata, Some(SeoMetadata::fallback("Edge AI")));
    }

    #[tokio::test]
    async fn test_seo_call_error_falls_back() {
        let (client, _) = ScriptedClient::new(vec![Err(Error::Timeout("slow".to_string()))]);
        let generator = ContentGenerator::new(client);

        let seo = generator.generate_seo_metadata("body", "Topic").await;
        assert_eq!(seo, SeoMetadata::fallback("Topic"));
    }

    #[tokio::test]
    async fn test_article_without_seo_makes_one_call() {
        let (client, prompts) = ScriptedClient::new(vec![Ok("text without heading".to_string())]);
        let generator = ContentGenerator::new(client);

        let content = generator
            .generate_article(&ArticleRequest::new("Topic").with_seo(false))
            .await
            .unwrap();
        assert_eq!(content.title, DEFAULT_TITLE);
        assert!(content.seo_metadata.is_none());
        assert_eq!(prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_generation_error_propagates() {
        let (client, _) = ScriptedClient::new(vec![Err(Error::ApiError {
            status: 500,
            body: "boom".to_string(),
        })]);
        let generator = ContentGenerator::new(client);

        let result = generator.generate_article(&ArticleRequest::new("Topic")).await;
        assert!(matches!(result, Err(Error::ApiError { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_generate_project() {
        let (client, _) = ScriptedClient::new(vec![Ok(
            "FILE: main.py\n```python\nprint(1)\n```\n".to_string()
        )]);
        let generator = ContentGenerator::new(client);

        let files = generator
            .generate_project(&ProjectRequest::new("demo", "Python CLI"))
            .await
            .unwrap();
        assert_eq!(files["main.py"], "print(1)");
    }
}
