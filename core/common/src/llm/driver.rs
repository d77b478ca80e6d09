//! LLMドライバーの実装
//!
//! プロバイダに依存しない共通処理（ペイロード生成 → HTTP → テキスト抽出）を提供します。

use crate::error::Error;
use crate::llm::provider::{GenerationOptions, LlmProvider};

/// LLMドライバー
pub struct LlmDriver<P: LlmProvider> {
    provider: P,
}

impl<P: LlmProvider> LlmDriver<P> {
    /// 新しいドライバーを作成
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// プロンプトを送信して応答テキストを取得
    ///
    /// # Returns
    /// * `Ok(String)` - LLMからの応答テキスト
    /// * `Err(Error::Http)` - 通信失敗・非 2xx
    /// * `Err(Error::EmptyResponse)` - 応答にテキストが含まれない
    pub fn generate(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
        options: &GenerationOptions,
    ) -> Result<String, Error> {
        let payload = self
            .provider
            .make_request_payload(prompt, system_instruction, options)?;

        let request_json = serde_json::to_string(&payload)
            .map_err(|e| Error::json(format!("Failed to serialize request: {}", e)))?;

        let response_json = self.provider.make_http_request(&request_json)?;

        let text = self
            .provider
            .parse_response_text(&response_json)?
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                Error::empty_response(format!("No text in {} response", self.provider.name()))
            })?;

        Ok(text)
    }

    /// プロバイダを取得
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    // モックプロバイダ
    struct MockProvider;

    impl LlmProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        fn make_request_payload(
            &self,
            prompt: &str,
            _system_instruction: Option<&str>,
            options: &GenerationOptions,
        ) -> Result<Value, Error> {
            Ok(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": prompt}]}],
                "generationConfig": options,
            }))
        }

        fn make_http_request(&self, _request_json: &str) -> Result<String, Error> {
            Ok(r#"{"candidates":[{"content":{"parts":[{"text":"Hello, world!"}]}}]}"#.to_string())
        }

        fn parse_response_text(&self, response_json: &str) -> Result<Option<String>, Error> {
            let v: Value = serde_json::from_str(response_json)
                .map_err(|e| Error::json(format!("Failed to parse JSON: {}", e)))?;
            Ok(v["candidates"][0]["content"]["parts"][0]["text"]
                .as_str()
                .map(|s| s.to_string()))
        }
    }

    #[test]
    fn test_llm_driver_new() {
        let driver = LlmDriver::new(MockProvider);
        assert_eq!(driver.provider().name(), "mock");
    }

    #[test]
    fn test_llm_driver_generate() {
        let driver = LlmDriver::new(MockProvider);
        let result = driver.generate("test", None, &GenerationOptions::default());
        assert_eq!(result.unwrap(), "Hello, world!");
    }

    // エラーハンドリングのテスト用モックプロバイダ
    struct ErrorMockProvider {
        error_type: ErrorType,
    }

    enum ErrorType {
        PayloadError,
        HttpError,
        ParseError,
        NoText,
        BlankText,
    }

    impl LlmProvider for ErrorMockProvider {
        fn name(&self) -> &str {
            "error_mock"
        }

        fn make_request_payload(
            &self,
            _prompt: &str,
            _system_instruction: Option<&str>,
            _options: &GenerationOptions,
        ) -> Result<Value, Error> {
            match self.error_type {
                ErrorType::PayloadError => Err(Error::invalid_argument("Failed to create payload")),
                _ => Ok(serde_json::json!({"contents": []})),
            }
        }

        fn make_http_request(&self, _request_json: &str) -> Result<String, Error> {
            match self.error_type {
                ErrorType::HttpError => Err(Error::http("HTTP request failed")),
                _ => Ok("{}".to_string()),
            }
        }

        fn parse_response_text(&self, _response_json: &str) -> Result<Option<String>, Error> {
            match self.error_type {
                ErrorType::ParseError => Err(Error::json("Failed to parse response")),
                ErrorType::NoText => Ok(None),
                ErrorType::BlankText => Ok(Some("  \n ".to_string())),
                _ => Ok(Some("ok".to_string())),
            }
        }
    }

    fn generate_with(error_type: ErrorType) -> Result<String, Error> {
        LlmDriver::new(ErrorMockProvider { error_type }).generate(
            "test",
            None,
            &GenerationOptions::default(),
        )
    }

    #[test]
    fn test_llm_driver_payload_error() {
        let err = generate_with(ErrorType::PayloadError).unwrap_err();
        assert!(err.to_string().contains("Failed to create payload"));
        assert!(err.is_usage());
    }

    #[test]
    fn test_llm_driver_http_error_is_transport() {
        let err = generate_with(ErrorType::HttpError).unwrap_err();
        assert!(err.to_string().contains("HTTP request failed"));
        assert!(err.is_transport());
    }

    #[test]
    fn test_llm_driver_parse_error() {
        let err = generate_with(ErrorType::ParseError).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_llm_driver_no_text_is_empty_response() {
        let err = generate_with(ErrorType::NoText).unwrap_err();
        assert!(matches!(err, Error::EmptyResponse(_)));
        assert!(err.to_string().contains("error_mock"));
    }

    #[test]
    fn test_llm_driver_blank_text_is_empty_response() {
        let err = generate_with(ErrorType::BlankText).unwrap_err();
        assert!(matches!(err, Error::EmptyResponse(_)));
    }

    #[test]
    fn test_llm_driver_with_echo_provider() {
        use crate::llm::echo::EchoProvider;
        let driver = LlmDriver::new(EchoProvider::new());
        let text = driver
            .generate("Generate exactly 2 words.", None, &GenerationOptions::default())
            .unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
    }
}
