//! 生成メモリ（1 回のランが専有する蓄積状態）

use crate::domain::record::VocabularyRecord;
use serde::Serialize;
use std::collections::HashSet;

/// 蓄積済みレコード・語数・試行履歴
#[derive(Debug, Clone)]
pub struct GenerationMemory {
    records: Vec<VocabularyRecord>,
    seen: HashSet<String>,
    word_count: usize,
    target_word_count: usize,
    history: Vec<String>,
}

/// 進捗通知に載せるスナップショット
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySnapshot {
    pub word_count: usize,
    pub target_word_count: usize,
    pub item_count: usize,
    pub is_complete: bool,
    pub history: Vec<String>,
}

impl GenerationMemory {
    pub fn new(target_word_count: usize) -> Self {
        Self {
            records: Vec::new(),
            seen: HashSet::new(),
            word_count: 0,
            target_word_count,
            history: Vec::new(),
        }
    }

    /// 未登録の見出し語だけを発見順に追加し、追加件数を返す。
    /// 同じバッチ内の重複も後勝ちせず先に出たものを残す。
    pub fn append(&mut self, batch: Vec<VocabularyRecord>) -> usize {
        let before = self.records.len();
        for record in batch {
            if self.seen.insert(record.key()) {
                self.records.push(record);
            }
        }
        let added = self.records.len() - before;
        if added > 0 {
            self.word_count = self.records.iter().map(VocabularyRecord::word_count).sum();
        }
        added
    }

    #[cfg(test)]
    pub fn contains(&self, headword: &str) -> bool {
        self.seen.contains(&headword.to_lowercase())
    }

    pub fn remaining_count(&self) -> usize {
        self.target_word_count.saturating_sub(self.word_count)
    }

    pub fn is_complete(&self) -> bool {
        self.word_count >= self.target_word_count
    }

    pub fn log_event(&mut self, text: impl Into<String>) {
        self.history.push(text.into());
    }

    pub fn headwords(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.headword.as_str())
    }

    pub fn records(&self) -> &[VocabularyRecord] {
        &self.records
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn target_word_count(&self) -> usize {
        self.target_word_count
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            word_count: self.word_count,
            target_word_count: self.target_word_count,
            item_count: self.records.len(),
            is_complete: self.is_complete(),
            history: self.history.clone(),
        }
    }

    /// ランの終了時にレコードを取り出す
    pub fn into_parts(self) -> (Vec<VocabularyRecord>, Vec<String>) {
        (self.records, self.history)
    }
}
