//! LLMドライバーとプロバイダの実装
//!
//! プロバイダ（Gemini、Echo）に共通する「プロンプト → テキスト」の処理と、
//! profiles.json によるプロバイダ解決を提供します。

pub mod config;
pub mod driver;
pub mod echo;
pub mod factory;
pub mod gemini;
pub mod provider;
pub mod resolver;

pub use config::{ProfilesConfig, ProviderProfile, ProviderTypeKind};
pub use driver::LlmDriver;
pub use factory::{create_driver, create_provider, AnyProvider, ProviderType};
pub use provider::{GenerationOptions, LlmProvider};
pub use resolver::{
    builtin_provider_names, list_profiles, load_profiles_config, resolve_provider,
    ResolvedProvider,
};
