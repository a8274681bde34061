//! WordPress publishing
//!
//! 自己ホスト型WordPress（REST API v2）とWordPress.com（REST API v1.1）の
//! 2種類のAPIを1つのパブリッシャーで扱います。
//!
//! - [`SiteConnection`]: サイト種別判定、パーマリンク形式に応じたエンドポイント解決
//! - [`WordPressPublisher`]: 接続テスト、ターム取得、メディアアップロード、投稿作成
//! - [`PublishSession`]: セッション単位のタームキャッシュと投稿履歴

pub mod connection;
pub mod publisher;
pub mod session;
pub mod terms;
pub mod types;

pub use connection::SiteConnection;
pub use publisher::{WordPressPublisher, READ_TIMEOUT, WRITE_TIMEOUT};
pub use session::{ConnectionReport, PublishOutcome, PublishSession, PublishStage};
pub use terms::{resolve_term_ids, TermCache, TermResolution};
pub use types::*;
