//! オーケストレータの調整値

use common::error::Error;
use common::llm::GenerationOptions;
use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: usize = 5;
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// 中断要求の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelMode {
    /// 中断された呼び出しを通常の失敗として数える（最終的に Exhausted）
    #[default]
    Graceful,
    /// 次のチェックポイントで即座に Cancelled で終える
    HardStop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// 連続失敗の上限
    pub max_retries: usize,
    /// 送信失敗後の待ち時間（重複だけのバッチでは待たない）
    pub backoff: Duration,
    /// 返すレコード数の上限。None のときは目標語数を上限にする
    pub item_cap: Option<usize>,
    pub cancel_mode: CancelMode,
    pub options: GenerationOptions,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: DEFAULT_BACKOFF,
            item_cap: None,
            cancel_mode: CancelMode::Graceful,
            options: GenerationOptions::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_retries == 0 {
            return Err(Error::invalid_argument("max retries must be at least 1"));
        }
        if self.item_cap == Some(0) {
            return Err(Error::invalid_argument("max items must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = OrchestratorConfig::default();
        assert_eq!(c.max_retries, 5);
        assert_eq!(c.backoff, Duration::from_secs(1));
        assert_eq!(c.item_cap, None);
        assert_eq!(c.cancel_mode, CancelMode::Graceful);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_retries() {
        let c = OrchestratorConfig {
            max_retries: 0,
            ..Default::default()
        };
        assert!(c.validate().unwrap_err().is_usage());
    }
}
