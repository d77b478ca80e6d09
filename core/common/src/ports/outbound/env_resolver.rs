//! 環境変数解決 Outbound ポート
//!
//! ホームディレクトリ・設定ファイル・ログファイルのパスを環境変数から解決する。
//! usecase はこの trait 経由でのみ環境変数にアクセスする。

use crate::domain::HomeDir;
use crate::error::Error;
use std::path::PathBuf;

/// 環境変数解決抽象（Outbound ポート）
///
/// 実装は `common::adapter::StdEnvResolver` やテスト用のモックなど。
pub trait EnvResolver: Send + Sync {
    /// ホームディレクトリを環境変数から解決する
    ///
    /// 優先順位:
    /// 1. VOCAB_HOME（設定されていれば）
    /// 2. $XDG_CONFIG_HOME/vocab（XDG_CONFIG_HOME が設定されていれば）
    /// 3. $HOME/.config/vocab
    fn resolve_home_dir(&self) -> Result<HomeDir, Error>;

    /// プロバイダプロファイル設定ファイルのパス
    /// VOCAB_HOME があれば $VOCAB_HOME/config/profiles.json、なければ resolve_home_dir() 直下の profiles.json
    fn resolve_profiles_config_path(&self) -> Result<PathBuf, Error>;

    /// 構造化ログ（JSONL）の出力先
    /// VOCAB_LOG_FILE があればそれ、なければ resolve_home_dir()/log/vocab.jsonl
    fn resolve_log_file_path(&self) -> Result<PathBuf, Error>;

    /// 任意の環境変数（API キー等）。未設定・空文字は None
    fn var(&self, name: &str) -> Option<String>;
}
