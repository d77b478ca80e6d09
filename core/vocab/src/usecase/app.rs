use crate::domain::{
    GenerationJob, OrchestratorConfig, ResponseData, ResponseEnvelope, ResponseMetadata,
    RunOutcome, RunStats,
};
use crate::ports::outbound::{
    InterruptChecker, ProfileLister, ProgressSink, TextGenerator, TextGeneratorFactory,
};
use crate::usecase::batch::{self, BatchEntry};
use crate::usecase::orchestrator::{BatchOrchestrator, OrchestratorDeps};
use crate::usecase::{composer, extractor, validator};
use common::domain::{ModelName, ProviderName, RequestId};
use common::error::Error;
use common::ports::outbound::{now_iso8601, FileSystem, IdGenerator, Log, LogLevel, LogRecord};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

// --- 責務別 Deps（usecase が定義を所有し、wiring は組み立てるだけ）

pub struct VocabDeps {
    pub model: ModelDeps,
    pub control: ControlDeps,
    pub system: SystemDeps,
    pub obs: ObsDeps,
}

pub struct ModelDeps {
    pub profile_lister: Arc<dyn ProfileLister>,
    pub generator_factory: Arc<dyn TextGeneratorFactory>,
}

pub struct ControlDeps {
    pub interrupt_checker: Arc<dyn InterruptChecker>,
    pub progress: Arc<dyn ProgressSink>,
}

pub struct SystemDeps {
    pub fs: Arc<dyn FileSystem>,
    pub id_generator: Arc<dyn IdGenerator>,
}

pub struct ObsDeps {
    pub log: Arc<dyn Log>,
}

/// 接続テストの結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingReport {
    pub generator: String,
    pub strategy: Option<&'static str>,
    pub extracted: usize,
    pub valid: usize,
    pub processing_time_ms: u64,
}

/// vocab のユースケース（アダプター経由で I/O を行う）
pub struct VocabUseCase {
    deps: VocabDeps,
    config: OrchestratorConfig,
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

impl VocabUseCase {
    /// 設定値はここで検証する（バッチを 1 回も試行しないうちに usage エラーにする）
    pub fn new(deps: VocabDeps, config: OrchestratorConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { deps, config })
    }

    fn log(&self, record: LogRecord) {
        let _ = self.deps.obs.log.log(&record.layer("usecase"));
    }

    pub fn list_profiles(&self) -> Result<(Vec<String>, Option<String>), Error> {
        self.deps.model.profile_lister.list_profiles()
    }

    fn create_generator(
        &self,
        profile: Option<&ProviderName>,
        model: Option<&ModelName>,
    ) -> Result<Arc<dyn TextGenerator>, Error> {
        self.deps.model.generator_factory.create(profile, model)
    }

    fn orchestrator(&self, generator: Arc<dyn TextGenerator>) -> Result<BatchOrchestrator, Error> {
        BatchOrchestrator::new(
            OrchestratorDeps {
                generator,
                interrupt: Arc::clone(&self.deps.control.interrupt_checker),
                progress: Arc::clone(&self.deps.control.progress),
                log: Arc::clone(&self.deps.obs.log),
            },
            self.config.clone(),
        )
    }

    fn envelope(
        &self,
        request_id: &RequestId,
        processing_time_ms: u64,
        target_word_count: usize,
        result: Result<RunOutcome, Error>,
    ) -> ResponseEnvelope {
        let metadata = ResponseMetadata {
            timestamp: now_iso8601(),
            request_id: request_id.to_string(),
            processing_time_ms,
        };
        match result {
            Ok(outcome) => ResponseEnvelope {
                success: true,
                data: ResponseData {
                    vocabulary: outcome.records,
                    stats: outcome.stats,
                    metadata,
                },
                error: None,
            },
            Err(e) => ResponseEnvelope {
                success: false,
                data: ResponseData {
                    vocabulary: Vec::new(),
                    stats: RunStats::empty(target_word_count),
                    metadata,
                },
                error: Some(e.to_string()),
            },
        }
    }

    fn run_job(
        &self,
        orchestrator: &BatchOrchestrator,
        request_id: &RequestId,
        job: &GenerationJob,
    ) -> RunOutcome {
        self.log(
            LogRecord::new(LogLevel::Info, "request started")
                .kind("request")
                .field("request_id", request_id.to_string())
                .field("target_word_count", job.target_word_count),
        );
        let outcome = orchestrator.run(job);
        self.log(
            LogRecord::new(LogLevel::Info, "request finished")
                .kind("request")
                .field("request_id", request_id.to_string())
                .field("state", outcome.stats.state.as_str())
                .field("items", outcome.stats.item_count),
        );
        outcome
    }

    /// 単一リクエストを生成する。
    /// 生成器を用意できない（プロファイル不明・API キー未設定等）場合は Err。
    /// ランが始まった後は、目標未達でも Ok の envelope を返す。
    pub fn generate(
        &self,
        profile: Option<&ProviderName>,
        model: Option<&ModelName>,
        job: &GenerationJob,
    ) -> Result<ResponseEnvelope, Error> {
        let started = Instant::now();
        let request_id = self.deps.system.id_generator.next_id();
        let orchestrator = self.orchestrator(self.create_generator(profile, model)?)?;
        let outcome = self.run_job(&orchestrator, &request_id, job);
        Ok(self.envelope(&request_id, elapsed_ms(started), job.target_word_count, Ok(outcome)))
    }

    /// バッチファイルの各エントリを並行に生成する。
    /// エントリ単位の不正や失敗はその envelope の error に入り、他のエントリには影響しない。
    pub fn run_batch(
        &self,
        profile: Option<&ProviderName>,
        model: Option<&ModelName>,
        path: &Path,
    ) -> Result<Vec<ResponseEnvelope>, Error> {
        let text = self.deps.system.fs.read_to_string(path)?;
        let entries = batch::parse_batch_file(&text)
            .map_err(|e| match e {
                Error::Json(msg) => Error::json(format!("{}: {}", path.display(), msg)),
                other => other,
            })?;
        let orchestrator = self.orchestrator(self.create_generator(profile, model)?)?;
        self.log(
            LogRecord::new(LogLevel::Info, "batch started")
                .kind("request")
                .field("entries", entries.len()),
        );

        let ids: Vec<RequestId> = entries
            .iter()
            .map(|_| self.deps.system.id_generator.next_id())
            .collect();
        let batch_started = Instant::now();
        // 処理時間はエントリごとにワーカー内で測る
        let settled = batch::run_settled(&entries, |i, entry: &BatchEntry| {
            let started = Instant::now();
            let result = entry
                .to_job()
                .map(|job| self.run_job(&orchestrator, &ids[i], &job));
            if let Err(e) = &result {
                self.log(
                    LogRecord::new(LogLevel::Warn, "batch entry rejected")
                        .kind("request")
                        .field("index", i)
                        .field("error", e.to_string()),
                );
            }
            (elapsed_ms(started), result)
        });

        Ok(settled
            .into_iter()
            .zip(entries.iter())
            .zip(ids.iter())
            .map(|((settled, entry), id)| {
                let (processing_time_ms, result) = match settled {
                    Ok((ms, result)) => (ms, result),
                    Err(e) => (elapsed_ms(batch_started), Err(e)),
                };
                self.envelope(id, processing_time_ms, entry.target_or_default(), result)
            })
            .collect())
    }

    /// 2 語だけ生成させ、抽出と検証が通るか確かめる
    pub fn ping(
        &self,
        profile: Option<&ProviderName>,
        model: Option<&ModelName>,
    ) -> Result<PingReport, Error> {
        let started = Instant::now();
        let generator = self.create_generator(profile, model)?;
        let text = generator.generate_text(&composer::ping_prompt(), &self.config.options)?;
        let extraction = extractor::extract_with_strategy(&text);
        let valid = extraction
            .records
            .iter()
            .filter(|raw| validator::validate(raw).is_some())
            .count();
        let report = PingReport {
            generator: generator.name().to_string(),
            strategy: extraction.strategy.map(|s| s.as_str()),
            extracted: extraction.records.len(),
            valid,
            processing_time_ms: elapsed_ms(started),
        };
        self.log(
            LogRecord::new(LogLevel::Info, "ping finished")
                .kind("request")
                .field("generator", report.generator.as_str())
                .field("valid", report.valid),
        );
        Ok(report)
    }
}
