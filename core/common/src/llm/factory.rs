//! プロバイダファクトリー
//!
//! 解決済みプロファイルから適切なプロバイダを作成します。

use crate::error::Error;
use crate::llm::driver::LlmDriver;
use crate::llm::echo::EchoProvider;
use crate::llm::gemini::{GeminiProvider, DEFAULT_API_KEY_ENV};
use crate::llm::provider::{GenerationOptions, LlmProvider};
use crate::llm::resolver::ResolvedProvider;
use crate::ports::outbound::EnvResolver;
use serde_json::Value;

/// プロバイダタイプ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    /// Gemini generateContent
    Gemini,
    /// Echo（オフラインで語彙レコードを返す）
    Echo,
}

impl ProviderType {
    /// 文字列からプロバイダタイプを解析
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Some(Self::Gemini),
            "echo" => Some(Self::Echo),
            _ => None,
        }
    }

    /// プロバイダタイプを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Echo => "echo",
        }
    }
}

/// プロバイダのenumラッパー
pub enum AnyProvider {
    Gemini(GeminiProvider),
    Echo(EchoProvider),
}

impl LlmProvider for AnyProvider {
    fn name(&self) -> &str {
        match self {
            Self::Gemini(p) => p.name(),
            Self::Echo(p) => p.name(),
        }
    }

    fn make_request_payload(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
        options: &GenerationOptions,
    ) -> Result<Value, Error> {
        match self {
            Self::Gemini(p) => p.make_request_payload(prompt, system_instruction, options),
            Self::Echo(p) => p.make_request_payload(prompt, system_instruction, options),
        }
    }

    fn make_http_request(&self, request_json: &str) -> Result<String, Error> {
        match self {
            Self::Gemini(p) => p.make_http_request(request_json),
            Self::Echo(p) => p.make_http_request(request_json),
        }
    }

    fn parse_response_text(&self, response_json: &str) -> Result<Option<String>, Error> {
        match self {
            Self::Gemini(p) => p.parse_response_text(response_json),
            Self::Echo(p) => p.parse_response_text(response_json),
        }
    }
}

/// プロバイダを作成する
///
/// Gemini の API キーは `api_key_env`（省略時 GEMINI_API_KEY）を EnvResolver 経由で読む。
/// 未設定なら Error::Env（バッチ試行前に失敗させる）。
/// `model_override` は -m/--model の値で、プロファイルの model より優先する。
pub fn create_provider(
    resolved: &ResolvedProvider,
    model_override: Option<&str>,
    env: &dyn EnvResolver,
) -> Result<AnyProvider, Error> {
    match resolved.provider_type {
        ProviderType::Gemini => {
            let key_env = resolved
                .api_key_env
                .as_deref()
                .unwrap_or(DEFAULT_API_KEY_ENV);
            let api_key = env.var(key_env).ok_or_else(|| {
                Error::env(format!(
                    "{} is not set (required by profile '{}')",
                    key_env, resolved.profile_name
                ))
            })?;
            let model = model_override
                .map(|m| m.to_string())
                .or_else(|| resolved.model.clone());
            let provider = GeminiProvider::new(
                model,
                api_key,
                resolved.base_url.clone(),
                resolved.temperature,
                resolved.timeout_secs,
            )?;
            Ok(AnyProvider::Gemini(provider))
        }
        ProviderType::Echo => Ok(AnyProvider::Echo(EchoProvider::new())),
    }
}

/// ドライバーを作成する
pub fn create_driver(
    resolved: &ResolvedProvider,
    model_override: Option<&str>,
    env: &dyn EnvResolver,
) -> Result<LlmDriver<AnyProvider>, Error> {
    let provider = create_provider(resolved, model_override, env)?;
    Ok(LlmDriver::new(provider))
}
