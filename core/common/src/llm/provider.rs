//! LLMプロバイダのトレイト定義

use crate::error::Error;
use serde::Serialize;
use serde_json::Value;

/// 生成パラメータ（1 回のテキスト生成呼び出しに渡す）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 8000,
            top_p: 0.9,
            top_k: 40,
        }
    }
}

/// LLMプロバイダのトレイト
///
/// 各プロバイダ（Gemini、Echo など）はこのトレイトを実装する。
/// ベンダー固有のリクエスト／レスポンス形状の変換はここに閉じ込め、呼び出し側は文字列だけを扱う。
pub trait LlmProvider: Send + Sync {
    /// プロバイダ名を返す
    fn name(&self) -> &str;

    /// リクエストペイロードを生成
    ///
    /// # Arguments
    /// * `prompt` - ユーザープロンプト
    /// * `system_instruction` - システム指示（オプション）
    /// * `options` - 生成パラメータ
    fn make_request_payload(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
        options: &GenerationOptions,
    ) -> Result<Value, Error>;

    /// HTTPリクエストを実行してレスポンスを取得
    ///
    /// # Returns
    /// * `Ok(String)` - レスポンスJSON文字列
    /// * `Err(Error::Http)` - 非 2xx またはネットワーク失敗
    fn make_http_request(&self, request_json: &str) -> Result<String, Error>;

    /// レスポンスからテキストを抽出
    ///
    /// # Returns
    /// * `Ok(Some(text))` - 抽出したテキスト
    /// * `Ok(None)` - テキストが存在しない
    fn parse_response_text(&self, response_json: &str) -> Result<Option<String>, Error>;
}
