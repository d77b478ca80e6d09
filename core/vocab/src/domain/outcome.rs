//! ランの終了状態・統計・進捗イベント

use crate::domain::memory::MemorySnapshot;
use crate::domain::record::VocabularyRecord;
use serde::Serialize;

/// オーケストレータの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Completed,
    /// 連続失敗が上限に達した（エラーではなく部分結果を返す）
    Exhausted,
    /// ハードストップで中断された
    Cancelled,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Exhausted => "exhausted",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub word_count: usize,
    pub target_word_count: usize,
    pub item_count: usize,
    /// 試行回数（成功・失敗を問わず 1 試行 1 件の履歴と一致する）
    pub batches_attempted: usize,
    pub is_complete: bool,
    pub state: RunState,
    pub history: Vec<String>,
}

impl RunStats {
    /// 1 バッチも試行できなかったときの空の統計
    pub fn empty(target_word_count: usize) -> Self {
        Self {
            word_count: 0,
            target_word_count,
            item_count: 0,
            batches_attempted: 0,
            is_complete: false,
            state: RunState::Exhausted,
            history: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub records: Vec<VocabularyRecord>,
    pub stats: RunStats,
}

/// 1 試行ごとの結果種別
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AttemptResult {
    /// 新規レコードが 1 件以上追加された
    Added { generated: usize, added: usize },
    /// 全件が重複・不正だった
    NothingNew { generated: usize },
    /// 生成呼び出しが失敗した
    Failed { error: String },
}

/// ProgressSink に渡す進捗イベント
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub batch_number: usize,
    pub attempt: usize,
    pub consecutive_failures: usize,
    pub result: AttemptResult,
    #[serde(flatten)]
    pub memory: MemorySnapshot,
}
