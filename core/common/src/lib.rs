//! vocab 共通ライブラリ
//!
//! エラー型、ログ・ファイル・環境変数のポートと標準アダプター、
//! テキスト生成プロバイダ（Gemini / Echo）を提供します。

/// エラーハンドリング
pub mod error;

/// ドメイン型（Newtype）
pub mod domain;

/// リクエスト ID 生成
pub mod request_id;

/// LLMドライバーとプロバイダ
pub mod llm;

/// Outbound ポート
pub mod ports;

/// ポートの標準実装
pub mod adapter;
