//! 統合テスト用の共通フィクスチャ

#![allow(dead_code)]

pub mod mock_services;
