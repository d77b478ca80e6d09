//! profiles.json 用の設定型
//!
//! `{ "default_provider": "...", "providers": { name: { "type": "gemini" | "echo", ... } } }`。
//! 旧い書き方（default / provider / default_model / timeout、google / mock）も受け付ける。

use serde::Deserialize;
use std::collections::HashMap;

/// profiles.json のルート
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilesConfig {
    /// 未指定時に使うプロファイル名
    #[serde(default, alias = "default")]
    pub default_provider: Option<String>,
    /// プロファイル名 -> プロファイル
    #[serde(default)]
    pub providers: HashMap<String, ProviderProfile>,
}

/// 1 プロファイル分の設定。省略した値は各プロバイダの既定値になる
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderProfile {
    #[serde(rename = "type", alias = "provider")]
    pub type_: ProviderTypeKind,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default, alias = "default_model")]
    pub model: Option<String>,
    /// API キーを読む環境変数名（省略時は GEMINI_API_KEY）
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// HTTP タイムアウト秒
    #[serde(default, alias = "timeout")]
    pub timeout_secs: Option<u64>,
}

/// JSON の "type" で使うプロバイダ種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderTypeKind {
    #[serde(alias = "google")]
    Gemini,
    #[serde(alias = "mock")]
    Echo,
}

impl ProfilesConfig {
    /// JSON 文字列からパース（ファイル読みは resolver で行う）
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
