//! AI Integration Module
//!
//! テキスト生成クライアントとコンテンツ生成機能を提供

pub mod content;
pub mod llm;

pub use llm::{GeminiClient, LlmClient};
