//! vocab コマンドの enum（Command Pattern）

use crate::domain::request::GenerationJob;
use common::domain::{ModelName, ProviderName};
use std::path::PathBuf;

/// vocab の実行モード
#[derive(Debug, Clone, PartialEq)]
pub enum VocabCommand {
    /// ヘルプ表示
    Help,
    /// プロファイル一覧
    ListProfiles,
    /// 接続テスト（2 語だけ生成させて抽出できるか確かめる）
    Ping {
        profile: Option<ProviderName>,
        model: Option<ModelName>,
    },
    /// 単一リクエストの生成
    Generate {
        profile: Option<ProviderName>,
        model: Option<ModelName>,
        job: GenerationJob,
    },
    /// JSON ファイルに並んだ複数リクエストを並行に生成
    Batch {
        profile: Option<ProviderName>,
        model: Option<ModelName>,
        path: PathBuf,
    },
}

impl VocabCommand {
    /// ログ用の名前
    pub fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::ListProfiles => "list-profiles",
            Self::Ping { .. } => "ping",
            Self::Generate { .. } => "generate",
            Self::Batch { .. } => "batch",
        }
    }
}
