//! vocab のアダプター（ports::outbound の標準実装とテスト用スタブ）

pub mod llm_text_generator;
pub mod profile_lister;
pub mod progress;
pub mod sigint_checker;
pub mod stub_generator;

pub use llm_text_generator::StdTextGeneratorFactory;
pub use profile_lister::StdProfileLister;
pub use progress::{NoopProgress, StderrProgress};
#[cfg(test)]
pub use sigint_checker::FlagInterruptChecker;
pub use sigint_checker::{NoopInterruptChecker, SigintChecker};
#[cfg(test)]
pub use stub_generator::{RecordingProgress, StubGeneratorFactory, StubTextGenerator};
