//! バッチオーケストレータ（制御ループ）
//!
//! 目標語数に達するか連続失敗が上限に達するまで、プロンプト組み立て → 生成 → 抽出 → 検証 → 重複除去 → 追記を繰り返す。
//! 1 回のランは逐次実行で、待機するのは生成呼び出しとバックオフの間だけ。

use crate::domain::{
    AttemptResult, CancelMode, GenerationJob, GenerationMemory, OrchestratorConfig,
    ProgressEvent, RunOutcome, RunState, RunStats, VocabularyRecord,
};
use crate::ports::outbound::{InterruptChecker, ProgressSink, TextGenerator};
use crate::usecase::{composer, extractor, validator};
use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// バックオフ中に割り込みを確認する間隔
const INTERRUPT_POLL: Duration = Duration::from_millis(50);

pub struct OrchestratorDeps {
    pub generator: Arc<dyn TextGenerator>,
    pub interrupt: Arc<dyn InterruptChecker>,
    pub progress: Arc<dyn ProgressSink>,
    pub log: Arc<dyn Log>,
}

pub struct BatchOrchestrator {
    deps: OrchestratorDeps,
    config: OrchestratorConfig,
}

/// ループ内の可変状態
struct Cursor {
    batch_number: usize,
    consecutive_failures: usize,
    attempts: usize,
}

impl BatchOrchestrator {
    /// 設定値が不正（max_retries == 0 等）なら、バッチを試行する前に usage エラーを返す
    pub fn new(deps: OrchestratorDeps, config: OrchestratorConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { deps, config })
    }

    fn log(&self, record: LogRecord) {
        let _ = self.deps.log.log(&record.layer("usecase"));
    }

    fn hard_stop_requested(&self) -> bool {
        self.config.cancel_mode == CancelMode::HardStop && self.deps.interrupt.is_interrupted()
    }

    /// バックオフ待ち。割り込まれたら早めに切り上げて false を返す。
    fn wait_backoff(&self) -> bool {
        let deadline = Instant::now() + self.config.backoff;
        loop {
            if self.deps.interrupt.is_interrupted() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep(INTERRUPT_POLL.min(deadline - now));
        }
    }

    fn emit(&self, memory: &GenerationMemory, cursor: &Cursor, result: AttemptResult) {
        self.deps.progress.on_progress(&ProgressEvent {
            batch_number: cursor.batch_number,
            attempt: cursor.attempts,
            consecutive_failures: cursor.consecutive_failures,
            result,
            memory: memory.snapshot(),
        });
    }

    /// 抽出と検証。不正レコードはログに残して捨てる。
    fn parse_batch(&self, text: &str, batch_number: usize) -> Vec<VocabularyRecord> {
        let extraction = extractor::extract_with_strategy(text);
        self.log(
            LogRecord::new(LogLevel::Debug, "response extracted")
                .kind("extract")
                .field("batch", batch_number)
                .field(
                    "strategy",
                    extraction.strategy.map(|s| s.as_str()).unwrap_or("none"),
                )
                .field("raw_records", extraction.records.len())
                .field("response_chars", text.chars().count()),
        );
        extraction
            .records
            .iter()
            .filter_map(|raw| match validator::check(raw) {
                Ok(record) => Some(record),
                Err(reason) => {
                    self.log(
                        LogRecord::new(LogLevel::Debug, "record dropped")
                            .kind("validate")
                            .field("batch", batch_number)
                            .field("reason", reason.to_string()),
                    );
                    None
                }
            })
            .collect()
    }

    /// ランを実行する。失敗の上限到達はエラーではなく部分結果で返す。
    pub fn run(&self, job: &GenerationJob) -> RunOutcome {
        let request = &job.request;
        let mut memory = GenerationMemory::new(job.target_word_count);
        let mut cursor = Cursor {
            batch_number: 1,
            consecutive_failures: 0,
            attempts: 0,
        };
        self.log(
            LogRecord::new(LogLevel::Info, "run started")
                .kind("lifecycle")
                .field("generator", self.deps.generator.name())
                .field("target_word_count", job.target_word_count)
                .field("batch_size", request.batch_size())
                .field("max_retries", self.config.max_retries),
        );

        let state = loop {
            if memory.is_complete() {
                break RunState::Completed;
            }
            let remaining = memory.remaining_count();
            if remaining == 0 {
                break RunState::Completed;
            }
            if self.hard_stop_requested() {
                break RunState::Cancelled;
            }

            let n = cursor.batch_number;
            let prompt = composer::compose(request, &memory, n, remaining);
            cursor.attempts += 1;

            let text = match self
                .deps
                .generator
                .generate_text(&prompt, &self.config.options)
            {
                Ok(text) => text,
                Err(e) => {
                    memory.log_event(format!("Batch {}: Failed ({})", n, e));
                    if self.config.cancel_mode == CancelMode::HardStop
                        && (e.is_interrupted() || self.deps.interrupt.is_interrupted())
                    {
                        break RunState::Cancelled;
                    }
                    cursor.consecutive_failures += 1;
                    self.log(
                        LogRecord::new(LogLevel::Warn, "batch failed")
                            .kind("batch")
                            .field("batch", n)
                            .field("consecutive_failures", cursor.consecutive_failures)
                            .field("error", e.to_string()),
                    );
                    self.emit(&memory, &cursor, AttemptResult::Failed { error: e.to_string() });
                    if cursor.consecutive_failures >= self.config.max_retries {
                        break RunState::Exhausted;
                    }
                    if !self.wait_backoff() && self.hard_stop_requested() {
                        break RunState::Cancelled;
                    }
                    continue;
                }
            };

            let valid = self.parse_batch(&text, n);
            let generated = valid.len();
            let added = memory.append(valid);
            memory.log_event(format!(
                "Batch {}: Generated {} vocabulary items, {} unique added",
                n, generated, added
            ));
            self.log(
                LogRecord::new(LogLevel::Info, "batch finished")
                    .kind("batch")
                    .field("batch", n)
                    .field("generated", generated)
                    .field("added", added)
                    .field("word_count", memory.word_count()),
            );

            if added == 0 {
                // 重複・不正のみ: 待たずに同じバッチ番号で再試行
                cursor.consecutive_failures += 1;
                self.emit(&memory, &cursor, AttemptResult::NothingNew { generated });
                if cursor.consecutive_failures >= self.config.max_retries {
                    break RunState::Exhausted;
                }
                continue;
            }

            cursor.consecutive_failures = 0;
            self.emit(&memory, &cursor, AttemptResult::Added { generated, added });
            cursor.batch_number += 1;
        };

        let is_complete = memory.is_complete();
        let word_count = memory.word_count();
        let target_word_count = memory.target_word_count();
        let (mut records, history) = memory.into_parts();
        records.truncate(self.config.item_cap.unwrap_or(target_word_count));

        self.log(
            LogRecord::new(LogLevel::Info, "run finished")
                .kind("lifecycle")
                .field("state", state.as_str())
                .field("word_count", word_count)
                .field("items", records.len())
                .field("attempts", cursor.attempts),
        );

        RunOutcome {
            stats: RunStats {
                word_count,
                target_word_count,
                item_count: records.len(),
                batches_attempted: cursor.attempts,
                is_complete,
                state,
                history,
            },
            records,
        }
    }
}
