//! Ctrl+C（SIGINT）やホストからの取り消しを検知する Outbound ポート

/// 割り込みが要求されたかどうかを返す能力
///
/// 生成アダプタは待機中にこれを参照し、true なら Error::Interrupted を返す。
/// オーケストレータはバックオフ中とバッチの合間にも参照する。
pub trait InterruptChecker: Send + Sync {
    fn is_interrupted(&self) -> bool;
}
