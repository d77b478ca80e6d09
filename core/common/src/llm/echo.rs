//! Echoプロバイダの実装
//!
//! 実際の API は呼び出さず、プロンプト中の "Generate exactly N" に合わせた
//! 語彙レコードの JSON 配列を返す。オフライン動作確認・テスト用。

use crate::error::Error;
use crate::llm::provider::{GenerationOptions, LlmProvider};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

const DEFAULT_COUNT: usize = 3;
const MAX_COUNT: usize = 50;

fn count_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)generate exactly (\d+)").expect("static regex"))
}

/// Echoプロバイダ
pub struct EchoProvider {
    next_index: AtomicUsize,
}

impl EchoProvider {
    /// 新しいEchoプロバイダを作成
    pub fn new() -> Self {
        Self {
            next_index: AtomicUsize::new(1),
        }
    }

    fn requested_count(&self, prompt: &str) -> usize {
        count_re()
            .captures(prompt)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<usize>().ok())
            .unwrap_or(DEFAULT_COUNT)
            .min(MAX_COUNT)
    }

    fn record(&self) -> Value {
        let n = self.next_index.fetch_add(1, Ordering::SeqCst);
        let headword = format!("echo-{}", n);
        json!({
            "word": headword,
            "definition": format!("a placeholder entry number {}", n),
            "example": format!("The echo provider returned {} offline.", headword),
            "pronunciation": "/ˈɛkoʊ/",
            "category": "General",
            "difficulty": "Beginner",
            "traditionalChinese": "回聲"
        })
    }
}

impl Default for EchoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    fn make_request_payload(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
        options: &GenerationOptions,
    ) -> Result<Value, Error> {
        let mut payload = json!({
            "prompt": prompt,
            "generationConfig": options,
        });
        if let Some(system) = system_instruction {
            payload["system_instruction"] = json!(system);
        }
        Ok(payload)
    }

    fn make_http_request(&self, request_json: &str) -> Result<String, Error> {
        let request: Value = serde_json::from_str(request_json)
            .map_err(|e| Error::json(format!("Failed to parse echo request: {}", e)))?;
        let prompt = request["prompt"].as_str().unwrap_or("");
        let items: Vec<Value> = (0..self.requested_count(prompt))
            .map(|_| self.record())
            .collect();
        let text = serde_json::to_string(&items)
            .map_err(|e| Error::json(format!("Failed to serialize echo items: {}", e)))?;
        Ok(json!({ "text": text }).to_string())
    }

    fn parse_response_text(&self, response_json: &str) -> Result<Option<String>, Error> {
        let v: Value = serde_json::from_str(response_json)
            .map_err(|e| Error::json(format!("Failed to parse echo response: {}", e)))?;
        Ok(v["text"].as_str().map(|s| s.to_string()))
    }
}
