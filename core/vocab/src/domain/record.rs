//! 語彙レコード

use crate::domain::difficulty::DifficultyTier;
use serde::Serialize;

/// 抽出直後の型なしレコード（キーはモデルが返したまま）
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// 検証済みの語彙レコード。全フィールドが空でないことは RecordValidator が保証する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyRecord {
    pub headword: String,
    pub definition: String,
    pub example: String,
    pub pronunciation: String,
    pub category: String,
    pub difficulty_tier: DifficultyTier,
    pub localized_meaning: String,
}

/// 空白区切りのトークン数（空文字は 0）
pub fn count_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

impl VocabularyRecord {
    /// 重複判定キー（小文字化した見出し語）
    pub fn key(&self) -> String {
        self.headword.to_lowercase()
    }

    /// 見出し語・定義・例文のトークン数の和
    pub fn word_count(&self) -> usize {
        count_tokens(&self.headword) + count_tokens(&self.definition) + count_tokens(&self.example)
    }
}

#[cfg(test)]
pub(crate) fn sample_record(headword: &str) -> VocabularyRecord {
    VocabularyRecord {
        headword: headword.to_string(),
        definition: "a short definition".to_string(),
        example: "It is used here.".to_string(),
        pronunciation: "/x/".to_string(),
        category: "General".to_string(),
        difficulty_tier: DifficultyTier::Intermediate,
        localized_meaning: "範例".to_string(),
    }
}
