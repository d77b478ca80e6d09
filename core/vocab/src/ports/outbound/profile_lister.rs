//! プロファイル一覧の Outbound ポート

use common::error::Error;

/// 利用可能なプロファイル名（ソート済み）とデフォルト名を返す
pub trait ProfileLister: Send + Sync {
    fn list_profiles(&self) -> Result<(Vec<String>, Option<String>), Error>;
}
