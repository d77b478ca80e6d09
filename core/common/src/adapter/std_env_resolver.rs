//! 標準環境変数解決実装（std::env を委譲）

use crate::domain::HomeDir;
use crate::error::Error;
use crate::ports::outbound::EnvResolver;
use std::env;
use std::path::PathBuf;

/// 標準環境変数解決実装
#[derive(Debug, Clone, Default)]
pub struct StdEnvResolver;

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.is_empty())
}

impl EnvResolver for StdEnvResolver {
    fn resolve_home_dir(&self) -> Result<HomeDir, Error> {
        if let Some(home) = non_empty_var("VOCAB_HOME") {
            return Ok(HomeDir::new(PathBuf::from(home)));
        }

        let config_base = non_empty_var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| non_empty_var("HOME").map(|h| PathBuf::from(h).join(".config")))
            .ok_or_else(|| Error::env("HOME is not set"))?;

        Ok(HomeDir::new(config_base.join("vocab")))
    }

    fn resolve_profiles_config_path(&self) -> Result<PathBuf, Error> {
        if let Some(home) = non_empty_var("VOCAB_HOME") {
            return Ok(PathBuf::from(home).join("config").join("profiles.json"));
        }
        Ok(self.resolve_home_dir()?.join("profiles.json"))
    }

    fn resolve_log_file_path(&self) -> Result<PathBuf, Error> {
        if let Some(path) = non_empty_var("VOCAB_LOG_FILE") {
            return Ok(PathBuf::from(path));
        }
        Ok(self.resolve_home_dir()?.join("log").join("vocab.jsonl"))
    }

    fn var(&self, name: &str) -> Option<String> {
        non_empty_var(name)
    }
}
