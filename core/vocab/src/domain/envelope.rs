//! 呼び出し側へ返すレスポンスエンベロープ

use crate::domain::outcome::RunStats;
use crate::domain::record::VocabularyRecord;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    /// ISO8601
    pub timestamp: String,
    pub request_id: String,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseData {
    pub vocabulary: Vec<VocabularyRecord>,
    pub stats: RunStats,
    pub metadata: ResponseMetadata,
}

/// `{success, data, error}`。失敗時も data には空の統計とメタデータを入れる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    pub data: ResponseData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
