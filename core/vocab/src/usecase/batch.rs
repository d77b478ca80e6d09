//! バッチモード: JSON ファイルに並んだ複数リクエストを読み、並行に実行する
//!
//! 各エントリは独立に成功・失敗する（1 件の失敗が他を止めない）。結果は入力と同じ順に返す。

use crate::domain::{
    GenerationJob, GenerationRequest, RequestKind, RequestedDifficulty, DEFAULT_BATCH_SIZE,
    DEFAULT_TARGET_WORD_COUNT,
};
use common::error::Error;
use serde::Deserialize;

/// バッチファイルの 1 エントリ
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchEntry {
    pub prompt: Option<String>,
    pub context: Option<String>,
    pub occupation: Option<String>,
    #[serde(alias = "habits")]
    pub interests: Option<String>,
    pub theme: Option<String>,
    pub difficulty: Option<String>,
    #[serde(alias = "targetCount", alias = "target")]
    pub target_word_count: Option<usize>,
    pub batch_size: Option<usize>,
    #[serde(alias = "meaningLanguage")]
    pub language: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BatchFile {
    List(Vec<BatchEntry>),
    Wrapped { requests: Vec<BatchEntry> },
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl BatchEntry {
    /// occupation と interests が揃えばペルソナ、そうでなければ自由記述（theme は context の代わり）
    pub fn to_job(&self) -> Result<GenerationJob, Error> {
        let difficulty = match non_blank(&self.difficulty) {
            Some(d) => RequestedDifficulty::parse(d)?,
            None => RequestedDifficulty::default(),
        };
        let kind = match (non_blank(&self.occupation), non_blank(&self.interests)) {
            (Some(occupation), Some(interests)) => RequestKind::Persona {
                occupation: occupation.to_string(),
                interests: interests.to_string(),
                theme: non_blank(&self.theme).map(str::to_string),
            },
            _ => RequestKind::FreeText {
                prompt: self.prompt.clone().unwrap_or_default(),
                context: non_blank(&self.context)
                    .or_else(|| non_blank(&self.theme))
                    .map(str::to_string),
            },
        };
        let mut request = GenerationRequest::new(
            kind,
            difficulty,
            self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
        )?;
        if let Some(language) = non_blank(&self.language) {
            request = request.with_meaning_language(language);
        }
        GenerationJob::new(
            request,
            self.target_word_count.unwrap_or(DEFAULT_TARGET_WORD_COUNT),
        )
    }

    /// 失敗時の統計に入れる目標語数
    pub fn target_or_default(&self) -> usize {
        self.target_word_count.unwrap_or(DEFAULT_TARGET_WORD_COUNT)
    }
}

/// `[...]` または `{"requests": [...]}` を受け付ける。空のリストは usage エラー。
pub fn parse_batch_file(text: &str) -> Result<Vec<BatchEntry>, Error> {
    let file: BatchFile = serde_json::from_str(text)
        .map_err(|e| Error::json(format!("Invalid batch file: {}", e)))?;
    let entries = match file {
        BatchFile::List(v) => v,
        BatchFile::Wrapped { requests } => requests,
    };
    if entries.is_empty() {
        return Err(Error::invalid_argument("Batch file contains no requests"));
    }
    Ok(entries)
}

/// items を 1 件 1 スレッドで並行に処理し、入力順に結果を返す。
/// ワーカーが panic した場合はその要素だけ System エラーになる。
pub fn run_settled<T, R, F>(items: &[T], f: F) -> Vec<Result<R, Error>>
where
    T: Sync,
    R: Send,
    F: Fn(usize, &T) -> R + Sync,
{
    let f = &f;
    std::thread::scope(|scope| {
        let handles: Vec<_> = items
            .iter()
            .enumerate()
            .map(|(i, item)| scope.spawn(move || f(i, item)))
            .collect();
        handles
            .into_iter()
            .enumerate()
            .map(|(i, h)| {
                h.join()
                    .map_err(|_| Error::system(format!("batch worker {} panicked", i)))
            })
            .collect()
    })
}
