//! 進捗通知の Outbound ポート

use crate::domain::ProgressEvent;

/// 試行ごとの進捗を受け取る（ステータス表示用）。受け手の失敗はランに影響させない。
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}
