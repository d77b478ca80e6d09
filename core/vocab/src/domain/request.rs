//! 生成リクエスト（不変。オーケストレータは書き換えない）

use crate::domain::difficulty::RequestedDifficulty;
use common::error::Error;

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_TARGET_WORD_COUNT: usize = 70;
pub const DEFAULT_MEANING_LANGUAGE: &str = "Traditional Chinese";

/// 自由記述か、職業・興味からのペルソナ指定か
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    FreeText {
        prompt: String,
        context: Option<String>,
    },
    Persona {
        occupation: String,
        interests: String,
        theme: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    kind: RequestKind,
    difficulty: RequestedDifficulty,
    batch_size: usize,
    meaning_language: String,
}

impl GenerationRequest {
    /// リクエストを作る。batch_size == 0 や空のプロンプトは usage エラー。
    pub fn new(
        kind: RequestKind,
        difficulty: RequestedDifficulty,
        batch_size: usize,
    ) -> Result<Self, Error> {
        if batch_size == 0 {
            return Err(Error::invalid_argument("batch size must be at least 1"));
        }
        match &kind {
            RequestKind::FreeText { prompt, .. } if prompt.trim().is_empty() => {
                return Err(Error::invalid_argument(
                    "No prompt provided. Pass prompt words or --occupation/--interests.",
                ));
            }
            RequestKind::Persona {
                occupation,
                interests,
                ..
            } if occupation.trim().is_empty() || interests.trim().is_empty() => {
                return Err(Error::invalid_argument(
                    "Persona requests need both --occupation and --interests",
                ));
            }
            _ => {}
        }
        Ok(Self {
            kind,
            difficulty,
            batch_size,
            meaning_language: DEFAULT_MEANING_LANGUAGE.to_string(),
        })
    }

    pub fn with_meaning_language(mut self, language: impl Into<String>) -> Self {
        let language = language.into();
        if !language.trim().is_empty() {
            self.meaning_language = language.trim().to_string();
        }
        self
    }

    pub fn kind(&self) -> &RequestKind {
        &self.kind
    }

    pub fn difficulty(&self) -> RequestedDifficulty {
        self.difficulty
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn meaning_language(&self) -> &str {
        &self.meaning_language
    }
}

/// 1 回のランの入力: リクエストと目標語数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    pub request: GenerationRequest,
    pub target_word_count: usize,
}

impl GenerationJob {
    pub fn new(request: GenerationRequest, target_word_count: usize) -> Result<Self, Error> {
        if target_word_count == 0 {
            return Err(Error::invalid_argument("target word count must be at least 1"));
        }
        Ok(Self {
            request,
            target_word_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free(prompt: &str) -> RequestKind {
        RequestKind::FreeText {
            prompt: prompt.to_string(),
            context: None,
        }
    }

    #[test]
    fn test_new_rejects_zero_batch_size() {
        let err = GenerationRequest::new(free("cooking"), RequestedDifficulty::default(), 0)
            .unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_new_rejects_blank_prompt() {
        assert!(GenerationRequest::new(free("  "), RequestedDifficulty::default(), 10).is_err());
    }

    #[test]
    fn test_new_rejects_partial_persona() {
        let kind = RequestKind::Persona {
            occupation: "nurse".to_string(),
            interests: "".to_string(),
            theme: None,
        };
        assert!(GenerationRequest::new(kind, RequestedDifficulty::default(), 10).is_err());
    }

    #[test]
    fn test_job_rejects_zero_target() {
        let r =
            GenerationRequest::new(free("cooking"), RequestedDifficulty::default(), 10).unwrap();
        assert!(GenerationJob::new(r.clone(), 0).unwrap_err().is_usage());
        assert_eq!(GenerationJob::new(r, 70).unwrap().target_word_count, 70);
    }

    #[test]
    fn test_meaning_language_default_and_override() {
        let r =
            GenerationRequest::new(free("cooking"), RequestedDifficulty::default(), 10).unwrap();
        assert_eq!(r.meaning_language(), "Traditional Chinese");
        let r = r.with_meaning_language(" Japanese ");
        assert_eq!(r.meaning_language(), "Japanese");
        let r = r.with_meaning_language("");
        assert_eq!(r.meaning_language(), "Japanese");
    }
}
