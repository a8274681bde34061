//! Content Generation Module
//!
//! プロンプト構築、生成応答の解析、SEOメタデータ導出

pub mod generator;
pub mod project;
pub mod prompt;
pub mod seo;

pub use generator::{extract_title, ContentGenerator, GeneratedContent, DEFAULT_TITLE};
pub use project::{parse_project_files, ProjectFiles};
pub use prompt::{ArticleRequest, ContentType, ProjectRequest};
pub use seo::{slugify, SeoEdit, SeoMetadata};
