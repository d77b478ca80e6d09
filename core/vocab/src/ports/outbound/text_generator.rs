//! テキスト生成の Outbound ポート
//!
//! コアはベンダーのワイヤ形式を知らず、プロンプト文字列を渡して応答テキストを受け取るだけ。

use common::domain::{ModelName, ProviderName};
use common::error::Error;
use common::llm::GenerationOptions;
use std::sync::Arc;

/// 1 回の生成呼び出し
///
/// # Returns
/// * `Ok(String)` - 応答テキスト（形式は保証されない）
/// * `Err(Error::Http)` - 非 2xx・通信失敗
/// * `Err(Error::EmptyResponse)` - 応答にテキストが無い
/// * `Err(Error::Interrupted)` - 呼び出し中に取り消された
pub trait TextGenerator: Send + Sync {
    fn generate_text(&self, prompt: &str, options: &GenerationOptions) -> Result<String, Error>;

    /// ログ用の識別名（プロファイル名など）
    fn name(&self) -> &str;
}

/// プロファイル・モデル指定から TextGenerator を作る
///
/// 設定エラー（不明なプロファイル、API キー未設定）はここで返り、バッチ試行前に失敗する。
pub trait TextGeneratorFactory: Send + Sync {
    fn create(
        &self,
        profile: Option<&ProviderName>,
        model: Option<&ModelName>,
    ) -> Result<Arc<dyn TextGenerator>, Error>;
}
