//! ProgressSink 実装: stderr への 1 行表示 / 何もしない

use crate::domain::{AttemptResult, ProgressEvent};
use crate::ports::outbound::ProgressSink;

/// 進捗を stderr に 1 行ずつ出す（-v 指定時）
pub struct StderrProgress;

impl StderrProgress {
    fn format(event: &ProgressEvent) -> String {
        let detail = match &event.result {
            AttemptResult::Added { generated, added } => {
                format!("{} generated, {} new", generated, added)
            }
            AttemptResult::NothingNew { generated } => {
                format!(
                    "{} generated, nothing new (retry {})",
                    generated, event.consecutive_failures
                )
            }
            AttemptResult::Failed { error } => {
                format!("failed (retry {}): {}", event.consecutive_failures, error)
            }
        };
        format!(
            "batch {}: {} [{}/{} words, {} items]",
            event.batch_number,
            detail,
            event.memory.word_count,
            event.memory.target_word_count,
            event.memory.item_count
        )
    }
}

impl ProgressSink for StderrProgress {
    fn on_progress(&self, event: &ProgressEvent) {
        eprintln!("{}", Self::format(event));
    }
}

/// 何もしない ProgressSink
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
