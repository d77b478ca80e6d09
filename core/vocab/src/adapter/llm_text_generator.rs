//! TextGenerator の標準実装（common::llm の resolve_provider / create_driver / LlmDriver を使用）
//!
//! ドライバ呼び出しはブロッキングなので別スレッドで実行し、待っている間に割り込みを確認する。
//! 割り込まれたら結果を待たずに Error::Interrupted を返す（スレッドは応答が来た時点で終わる）。

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use common::domain::{ModelName, ProviderName};
use common::error::Error;
use common::llm::{
    create_driver, load_profiles_config, resolve_provider, AnyProvider, GenerationOptions,
    LlmDriver, ResolvedProvider,
};
use common::ports::outbound::{EnvResolver, FileSystem, Log, LogLevel, LogRecord};

use crate::ports::outbound::{InterruptChecker, TextGenerator, TextGeneratorFactory};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn describe(resolved: &ResolvedProvider, model: Option<&ModelName>) -> String {
    let model = model
        .map(|m| m.to_string())
        .or_else(|| resolved.model.clone());
    match model {
        Some(m) => format!("{} ({})", resolved.profile_name, m),
        None => resolved.profile_name.clone(),
    }
}

/// LlmDriver を TextGenerator として使うアダプタ
pub struct LlmTextGenerator {
    driver: Arc<LlmDriver<AnyProvider>>,
    interrupt: Arc<dyn InterruptChecker>,
    label: String,
}

impl LlmTextGenerator {
    pub fn new(
        driver: Arc<LlmDriver<AnyProvider>>,
        interrupt: Arc<dyn InterruptChecker>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            driver,
            interrupt,
            label: label.into(),
        }
    }
}

impl TextGenerator for LlmTextGenerator {
    fn generate_text(&self, prompt: &str, options: &GenerationOptions) -> Result<String, Error> {
        if self.interrupt.is_interrupted() {
            return Err(Error::Interrupted);
        }
        let (tx, rx) = mpsc::channel();
        let driver = Arc::clone(&self.driver);
        let prompt = prompt.to_string();
        let options = *options;
        std::thread::spawn(move || {
            let _ = tx.send(driver.generate(&prompt, None, &options));
        });
        loop {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(result) => return result,
                Err(RecvTimeoutError::Timeout) => {
                    if self.interrupt.is_interrupted() {
                        return Err(Error::Interrupted);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(Error::system("text generation worker exited without a result"));
                }
            }
        }
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// 標準の TextGenerator ファクトリ（profiles.json → プロバイダ解決 → ドライバ生成）
pub struct StdTextGeneratorFactory {
    fs: Arc<dyn FileSystem>,
    env_resolver: Arc<dyn EnvResolver>,
    interrupt: Arc<dyn InterruptChecker>,
    log: Arc<dyn Log>,
}

impl StdTextGeneratorFactory {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        env_resolver: Arc<dyn EnvResolver>,
        interrupt: Arc<dyn InterruptChecker>,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            fs,
            env_resolver,
            interrupt,
            log,
        }
    }
}

impl TextGeneratorFactory for StdTextGeneratorFactory {
    fn create(
        &self,
        profile: Option<&ProviderName>,
        model: Option<&ModelName>,
    ) -> Result<Arc<dyn TextGenerator>, Error> {
        let cfg = load_profiles_config(self.fs.as_ref(), self.env_resolver.as_ref())?;
        let resolved = resolve_provider(profile, cfg.as_ref())?;
        let driver = create_driver(
            &resolved,
            model.map(|m| m.as_ref()),
            self.env_resolver.as_ref(),
        )?;
        let label = describe(&resolved, model);
        let _ = self.log.log(
            &LogRecord::new(LogLevel::Info, "text generator created")
                .layer("adapter")
                .kind("config")
                .field("profile", resolved.profile_name.as_str())
                .field("provider", resolved.provider_type.as_str())
                .field("label", label.as_str()),
        );
        Ok(Arc::new(LlmTextGenerator::new(
            Arc::new(driver),
            Arc::clone(&self.interrupt),
            label,
        )))
    }
}
