//! テスト用: クロージャで応答を決める TextGenerator / ファクトリ / 進捗記録


#[cfg(test)]
pub use stub::{RecordingProgress, StubGeneratorFactory, StubTextGenerator};
