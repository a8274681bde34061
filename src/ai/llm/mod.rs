//! Large Language Model Integration
//!
//! テキスト生成エンドポイント（Gemini）との統合

pub mod gemini;

use crate::error::Result;
use async_trait::async_trait;

pub use gemini::GeminiClient;

/// LLMクライアントトレイト
///
/// プロンプト文字列を受け取り、生成テキストを返す単一の呼び出し。
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// テキスト生成
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// モデル名
    fn model_name(&self) -> &str;
}

