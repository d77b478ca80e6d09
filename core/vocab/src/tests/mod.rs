mod orchestrator_tests;
mod run_app_tests;

use serde_json::{json, Value};

/// 5 トークン（見出し語 1 + 定義 2 + 例文 2）の応答オブジェクト
pub(crate) fn entry(word: &str) -> Value {
    entry_with(word, "d d")
}

pub(crate) fn entry_with(word: &str, definition: &str) -> Value {
    json!({
        "word": word,
        "definition": definition,
        "example": "e e",
        "pronunciation": "/p/",
        "category": "General",
        "difficulty": "Beginner",
        "localizedMeaning": "詞"
    })
}

/// 見出し語の並びから JSON 配列の応答テキストを作る
pub(crate) fn batch_text(words: &[&str]) -> String {
    Value::Array(words.iter().map(|w| entry(w)).collect()).to_string()
}
