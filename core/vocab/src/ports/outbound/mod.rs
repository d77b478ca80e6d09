//! Outbound ポート: usecase が外界（テキスト生成・割り込み・進捗通知・プロファイル）を使うための trait

pub mod interrupt_checker;
pub mod profile_lister;
pub mod progress_sink;
pub mod text_generator;

pub use interrupt_checker::InterruptChecker;
pub use profile_lister::ProfileLister;
pub use progress_sink::ProgressSink;
pub use text_generator::{TextGenerator, TextGeneratorFactory};
