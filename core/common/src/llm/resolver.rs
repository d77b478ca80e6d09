//! profiles.json の読み込みとプロバイダ解決

use crate::domain::ProviderName;
use crate::error::Error;
use crate::llm::config::{ProfilesConfig, ProviderProfile, ProviderTypeKind};
use crate::llm::factory::ProviderType;
use crate::ports::outbound::{EnvResolver, FileSystem};
use std::collections::BTreeMap;

/// profiles.json にも -p にも指定が無いときのプロファイル
pub const DEFAULT_PROFILE: &str = "gemini";

/// 解決済みプロバイダ（ProviderType + オプション）
#[derive(Debug, Clone)]
pub struct ResolvedProvider {
    /// 解決に使ったプロファイル名（例: "offline", "gemini"）。エラー表示用
    pub profile_name: String,
    pub provider_type: ProviderType,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key_env: Option<String>,
    pub temperature: Option<f32>,
    pub timeout_secs: Option<u64>,
}

/// profiles.json を読み込む。ファイルが無ければ Ok(None)、JSON が壊れていれば Err（メッセージにパス含める）
pub fn load_profiles_config(
    fs: &dyn FileSystem,
    env: &dyn EnvResolver,
) -> Result<Option<ProfilesConfig>, Error> {
    let path = env.resolve_profiles_config_path()?;
    if !fs.exists(path.as_path()) {
        return Ok(None);
    }
    let contents = fs
        .read_to_string(path.as_path())
        .map_err(|e| Error::io_msg(format!("{}: {}", path.display(), e)))?;
    ProfilesConfig::parse(&contents)
        .map_err(|e| Error::json(format!("{}: {}", path.display(), e)))
        .map(Some)
}

impl From<ProviderTypeKind> for ProviderType {
    fn from(kind: ProviderTypeKind) -> Self {
        match kind {
            ProviderTypeKind::Gemini => ProviderType::Gemini,
            ProviderTypeKind::Echo => ProviderType::Echo,
        }
    }
}

impl ResolvedProvider {
    /// profiles.json に定義が無いビルトイン（設定値はすべて既定）
    fn builtin(name: &str, provider_type: ProviderType) -> Self {
        Self {
            profile_name: name.to_string(),
            provider_type,
            base_url: None,
            model: None,
            api_key_env: None,
            temperature: None,
            timeout_secs: None,
        }
    }

    fn from_profile(name: &str, profile: &ProviderProfile) -> Self {
        Self {
            profile_name: name.to_string(),
            provider_type: profile.type_.into(),
            base_url: profile.base_url.clone(),
            model: profile.model.clone(),
            api_key_env: profile.api_key_env.clone(),
            temperature: profile.temperature,
            timeout_secs: profile.timeout_secs,
        }
    }
}

/// 利用可能なビルトインプロバイダ名
pub fn builtin_provider_names() -> &'static [&'static str] {
    &["gemini", "echo"]
}

fn default_profile_name(cfg: Option<&ProfilesConfig>) -> &str {
    cfg.and_then(|c| c.default_provider.as_deref())
        .unwrap_or(DEFAULT_PROFILE)
}

/// プロファイル一覧（ビルトイン + profiles.json）を (名前, 種別, default か) で返す。名前順。
/// profiles.json に同名があればビルトインより優先する。
pub fn list_profiles(cfg: Option<&ProfilesConfig>) -> Vec<(String, ProviderType, bool)> {
    let mut by_name: BTreeMap<String, ProviderType> = builtin_provider_names()
        .iter()
        .filter_map(|name| ProviderType::from_str(name).map(|t| (name.to_string(), t)))
        .collect();
    for (name, profile) in cfg.map(|c| &c.providers).into_iter().flatten() {
        by_name.insert(name.clone(), profile.type_.into());
    }
    let default_name = default_profile_name(cfg);
    by_name
        .into_iter()
        .map(|(name, t)| {
            let is_default = name == default_name;
            (name, t, is_default)
        })
        .collect()
}

/// 要求されたプロファイル名（None の場合は default）を profiles.json → ビルトインの順で解決する。
/// どちらにも無ければ利用可能一覧付きの usage エラー。
pub fn resolve_provider(
    requested: Option<&ProviderName>,
    cfg: Option<&ProfilesConfig>,
) -> Result<ResolvedProvider, Error> {
    let name: &str = match requested {
        Some(r) => r.as_ref(),
        None => default_profile_name(cfg),
    };

    if let Some(profile) = cfg.and_then(|c| c.providers.get(name)) {
        return Ok(ResolvedProvider::from_profile(name, profile));
    }
    if let Some(provider_type) = ProviderType::from_str(name) {
        return Ok(ResolvedProvider::builtin(name, provider_type));
    }

    let available: Vec<String> = list_profiles(cfg)
        .into_iter()
        .map(|(n, _, _)| n)
        .collect();
    Err(Error::invalid_argument(format!(
        "Unknown provider: '{}'. Available: {}",
        name,
        available.join(", ")
    )))
}
