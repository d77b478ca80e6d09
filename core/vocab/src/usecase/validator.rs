//! 型なしレコードの検証
//!
//! 7 フィールドすべてが空でない文字列で、難易度が 4 段階のいずれかに完全一致するものだけを通す。
//! キーは大文字小文字・`_`・`-` を無視して照合し、別名も受け付ける。

use crate::domain::{DifficultyTier, RawRecord, VocabularyRecord};
use serde_json::Value;

/// 正規化済みキーの別名（先に書いたものを優先）
const HEADWORD: &[&str] = &["headword", "word"];
const DEFINITION: &[&str] = &["definition"];
const EXAMPLE: &[&str] = &["example"];
const PRONUNCIATION: &[&str] = &["pronunciation"];
const CATEGORY: &[&str] = &["category"];
const DIFFICULTY: &[&str] = &["difficultytier", "difficulty"];
const LOCALIZED: &[&str] = &["localizedmeaning", "traditionalchinese", "translation"];

/// 検証を通らなかった理由（ログ用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    MissingField(&'static str),
    InvalidDifficulty(String),
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(name) => write!(f, "missing or empty field: {}", name),
            Self::InvalidDifficulty(v) => write!(f, "invalid difficulty: {}", v),
        }
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn lookup<'a>(raw: &'a RawRecord, aliases: &[&str]) -> Option<&'a str> {
    aliases.iter().find_map(|alias| {
        raw.iter()
            .filter(|(k, _)| normalize_key(k) == *alias)
            .find_map(|(_, v)| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim()),
                _ => None,
            })
    })
}

fn required<'a>(
    raw: &'a RawRecord,
    aliases: &[&str],
    name: &'static str,
) -> Result<&'a str, Rejection> {
    lookup(raw, aliases).ok_or(Rejection::MissingField(name))
}

/// 検証して理由付きで返す
pub fn check(raw: &RawRecord) -> Result<VocabularyRecord, Rejection> {
    let headword = required(raw, HEADWORD, "headword")?;
    let definition = required(raw, DEFINITION, "definition")?;
    let example = required(raw, EXAMPLE, "example")?;
    let pronunciation = required(raw, PRONUNCIATION, "pronunciation")?;
    let category = required(raw, CATEGORY, "category")?;
    let difficulty = required(raw, DIFFICULTY, "difficultyTier")?;
    let localized = required(raw, LOCALIZED, "localizedMeaning")?;
    let difficulty_tier = DifficultyTier::from_literal(difficulty)
        .ok_or_else(|| Rejection::InvalidDifficulty(difficulty.to_string()))?;

    Ok(VocabularyRecord {
        headword: headword.to_string(),
        definition: definition.to_string(),
        example: example.to_string(),
        pronunciation: pronunciation.to_string(),
        category: category.to_string(),
        difficulty_tier,
        localized_meaning: localized.to_string(),
    })
}

/// 有効なら VocabularyRecord、無効なら None（純粋・決定的）
pub fn validate(raw: &RawRecord) -> Option<VocabularyRecord> {
    check(raw).ok()
}
