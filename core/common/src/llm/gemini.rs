//! Gemini generateContent プロバイダの実装
//!
//! base_url を差し替えれば generateContent 互換のプロキシにも向けられる。

use crate::error::Error;
use crate::llm::provider::{GenerationOptions, LlmProvider};
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Gemini プロバイダ
pub struct GeminiProvider {
    model: String,
    api_key: String,
    base_url: String,
    temperature: Option<f32>,
    timeout: Duration,
}

impl GeminiProvider {
    /// 新しいGeminiプロバイダを作成
    ///
    /// # Arguments
    /// * `model` - モデル名（None のとき DEFAULT_MODEL）
    /// * `api_key` - API キー（解決は呼び出し側で行う）
    /// * `base_url` - ベース URL（None のとき DEFAULT_BASE_URL）
    /// * `temperature` - プロファイルで固定する温度（None のとき GenerationOptions に従う）
    /// * `timeout_secs` - HTTP タイムアウト秒（None のとき 120）
    pub fn new(
        model: Option<String>,
        api_key: String,
        base_url: Option<String>,
        temperature: Option<f32>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, Error> {
        if api_key.trim().is_empty() {
            return Err(Error::env("Gemini API key is empty"));
        }
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key,
            base_url,
            temperature,
            timeout: Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }

    /// API キーはクエリに載せず x-goog-api-key ヘッダで送る
    fn url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

/// candidates[0] から応答テキストを取り出す。parts が複数あれば連結する。
fn candidate_text(v: &Value) -> Option<String> {
    let candidate = &v["candidates"][0];
    if let Some(parts) = candidate["content"]["parts"].as_array() {
        let joined: String = parts
            .iter()
            .filter_map(|part| part["text"].as_str())
            .collect();
        if !joined.trim().is_empty() {
            return Some(joined);
        }
    }
    [&candidate["text"], &v["text"], &v["content"]]
        .into_iter()
        .find_map(|field| field.as_str().filter(|s| !s.trim().is_empty()))
        .map(|s| s.to_string())
}

impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn make_request_payload(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
        options: &GenerationOptions,
    ) -> Result<Value, Error> {
        let mut payload = json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": prompt}]
            }],
            "generationConfig": {
                "temperature": self.temperature.unwrap_or(options.temperature),
                "maxOutputTokens": options.max_output_tokens,
                "topP": options.top_p,
                "topK": options.top_k
            }
        });

        if let Some(system) = system_instruction {
            payload["systemInstruction"] = json!({
                "parts": [{"text": system}]
            });
        }

        Ok(payload)
    }

    fn make_http_request(&self, request_json: &str) -> Result<String, Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;
        let response = client
            .post(self.url())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", self.api_key.as_str())
            .body(request_json.to_string())
            .send()
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e.without_url())))?;

        let status = response.status();
        let response_text = response
            .text()
            .map_err(|e| Error::http(format!("Failed to read response: {}", e.without_url())))?;

        if !status.is_success() {
            // エラーレスポンスを解析してメッセージを抽出
            let error_msg = serde_json::from_str::<Value>(&response_text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(|s| s.to_string()))
                .unwrap_or_else(|| format!("HTTP {}: {}", status, response_text));
            return Err(Error::http(format!("Gemini API error: {}", error_msg)));
        }

        Ok(response_text)
    }

    fn parse_response_text(&self, response_json: &str) -> Result<Option<String>, Error> {
        let v: Value = serde_json::from_str(response_json)
            .map_err(|e| Error::json(format!("Failed to parse response JSON: {}", e)))?;

        if let Some(error) = v.get("error") {
            let error_msg = error["message"]
                .as_str()
                .or_else(|| error.as_str())
                .unwrap_or("Unknown error");
            return Err(Error::http(format!("Gemini API error: {}", error_msg)));
        }

        if let Some(text) = candidate_text(&v) {
            return Ok(Some(text));
        }

        if v["candidates"][0]["finishReason"].as_str() == Some("MAX_TOKENS") {
            return Err(Error::empty_response(
                "Response was truncated due to token limit before any text was produced",
            ));
        }

        Ok(None)
    }
}
