//! SEO metadata
//!
//! 生成AIの応答からJSONを抽出し、長さ制約に合わせて正規化する

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// 記事のSEOメタデータ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoMetadata {
    /// タイトル（60文字以内）
    pub title: String,
    /// メタディスクリプション（160文字以内）
    pub description: String,
    /// キーワード（最大5個、小文字）
    pub keywords: Vec<String>,
    /// URLスラッグ
    pub slug: String,
}

/// ユーザーによるSEO項目の編集
#[derive(Debug, Clone, Default)]
pub struct SeoEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub slug: Option<String>,
}

/// 応答JSON（欠けた項目は許容）
#[derive(Debug, Default, Deserialize)]
struct RawSeo {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    slug: Option<String>,
}

impl SeoMetadata {
    /// 生成失敗時のフォールバック
    pub fn fallback(topic: &str) -> Self {
        let slug: String = topic
            .to_lowercase()
            .replace(' ', "-")
            .replace([',', '.'], "")
            .chars()
            .take(50)
            .collect();

        Self {
            title: truncate_chars(topic, 60),
            description: format!("Learn about {} in this comprehensive guide.", topic),
            keywords: vec![topic.to_lowercase()],
            slug,
        }
    }

    /// 生成テキストから最初の `{...}` を取り出して正規化
    pub fn from_response(response: &str, topic: &str) -> Result<Self> {
        let json = json_object_pattern()
            .find(response)
            .ok_or_else(|| Error::ParseError("No JSON object in SEO response".to_string()))?;

        let raw: RawSeo = serde_json::from_str(json.as_str())?;
        Ok(Self::normalize(raw, topic))
    }

    fn normalize(raw: RawSeo, topic: &str) -> Self {
        let title = raw.title.unwrap_or_else(|| topic.to_string());
        let description = raw
            .description
            .unwrap_or_else(|| format!("Learn about {}", topic))
            .replace('\n', " ");
        let keywords = raw
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .take(5)
            .collect();
        let slug = slugify(&raw.slug.unwrap_or_else(|| topic.to_string()), 60);

        Self {
            title: truncate_chars(&title, 60).trim().to_string(),
            description: truncate_chars(&description, 160).trim().to_string(),
            keywords,
            slug,
        }
    }

    /// 編集内容を反映（指定項目のみ）
    pub fn apply_edit(&mut self, edit: SeoEdit) {
        if let Some(title) = edit.title {
            self.title = title;
        }
        if let Some(description) = edit.description {
            self.description = description;
        }
        if let Some(keywords) = edit.keywords {
            self.keywords = keywords;
        }
        if let Some(slug) = edit.slug {
            self.slug = slugify(&slug, 60);
        }
    }
}

/// SEOメタデータ生成プロンプト
pub fn seo_prompt(content: &str, topic: &str) -> String {
    let preview = truncate_chars(content, 1500);
    format!(
        r#"Based on this content about "{topic}", generate SEO metadata.

Content Preview: {preview}...

Please provide SEO-optimized metadata in this exact JSON format.
Make sure the content adheres to length constraints and is highly relevant.
{{
    "title": "SEO-optimized title (50-60 characters, avoid truncation)",
    "description": "Compelling meta description (150-160 characters, summarize key points, entice clicks)",
    "keywords": ["keyword1", "keyword2", "keyword3", "keyword4", "keyword5"],
    "slug": "url-friendly-slug-with-hyphens"
}}

Guidelines:
- **Title**: Include main keywords, be descriptive, engaging, and fit within 50-60 characters.
- **Description**: Summarize the article, use strong verbs, include relevant keywords, and be between 150-160 characters.
- **Keywords**: 3-5 relevant, high-impact keywords.
- **Slug**: Lowercase, use hyphens instead of spaces, avoid special characters, be concise.
"#
    )
}

fn json_object_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid JSON object pattern"))
}

fn slug_strip_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^\w\s-]").expect("valid slug pattern"))
}

/// 句読点を除去し、小文字・ハイフン区切りに変換
pub fn slugify(text: &str, max_chars: usize) -> String {
    let stripped = slug_strip_pattern().replace_all(&text.to_lowercase(), "").to_string();
    let hyphenated = stripped.trim().replace(' ', "-");
    truncate_chars(&hyphenated, max_chars)
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
