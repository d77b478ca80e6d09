//! 配線: 標準アダプタで VocabUseCase を組み立てる

use std::sync::Arc;

use common::adapter::{
    EnvResolver, FileJsonLog, FileSystem, Log, NoopLog, StderrLog, StdEnvResolver, StdFileSystem,
    TeeLog,
};
use common::error::Error;
use common::request_id::StdIdGenerator;

use crate::adapter::{
    NoopInterruptChecker, NoopProgress, SigintChecker, StderrProgress, StdProfileLister,
    StdTextGeneratorFactory,
};
use crate::cli::{orchestrator_config, Config};
use crate::ports::outbound::{InterruptChecker, ProgressSink};
use crate::usecase::app::{ControlDeps, ModelDeps, ObsDeps, SystemDeps, VocabDeps, VocabUseCase};

/// main から使う組み立て済みアプリ
pub struct App {
    pub logger: Arc<dyn Log>,
    pub vocab_use_case: VocabUseCase,
}

fn wire_logger(
    fs: &Arc<dyn FileSystem>,
    env_resolver: &Arc<dyn EnvResolver>,
    verbose: bool,
) -> Arc<dyn Log> {
    let file: Arc<dyn Log> = match env_resolver.resolve_log_file_path() {
        Ok(path) => Arc::new(FileJsonLog::new(Arc::clone(fs), path)),
        Err(_) => Arc::new(NoopLog),
    };
    if verbose {
        Arc::new(TeeLog::new(vec![file, Arc::new(StderrLog)]))
    } else {
        file
    }
}

/// 配線: 標準アダプタで VocabUseCase を組み立てる。
/// 調整値（--max-retries 等）が不正ならここで usage エラーになる。
pub fn wire_vocab(config: &Config) -> Result<App, Error> {
    let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem);
    let env_resolver: Arc<dyn EnvResolver> = Arc::new(StdEnvResolver);
    let logger = wire_logger(&fs, &env_resolver, config.verbose);

    // ハンドラ登録に失敗しても生成自体は続ける（Ctrl+C は既定動作で終了する）
    let interrupt_checker: Arc<dyn InterruptChecker> = match SigintChecker::new() {
        Ok(c) => Arc::new(c),
        Err(_) => Arc::new(NoopInterruptChecker::new()),
    };
    let progress: Arc<dyn ProgressSink> = if config.verbose {
        Arc::new(StderrProgress)
    } else {
        Arc::new(NoopProgress)
    };

    let deps = VocabDeps {
        model: ModelDeps {
            profile_lister: Arc::new(StdProfileLister::new(
                Arc::clone(&fs),
                Arc::clone(&env_resolver),
            )),
            generator_factory: Arc::new(StdTextGeneratorFactory::new(
                Arc::clone(&fs),
                Arc::clone(&env_resolver),
                Arc::clone(&interrupt_checker),
                Arc::clone(&logger),
            )),
        },
        control: ControlDeps {
            interrupt_checker,
            progress,
        },
        system: SystemDeps {
            fs,
            id_generator: Arc::new(StdIdGenerator),
        },
        obs: ObsDeps {
            log: Arc::clone(&logger),
        },
    };
    let vocab_use_case = VocabUseCase::new(deps, orchestrator_config(config))?;
    Ok(App {
        logger,
        vocab_use_case,
    })
}
