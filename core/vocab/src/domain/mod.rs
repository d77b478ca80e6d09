//! vocab 固有のドメイン型（型と不変条件）

pub mod command;
pub mod difficulty;
pub mod envelope;
pub mod memory;
pub mod outcome;
pub mod record;
pub mod request;
pub mod settings;

pub use command::VocabCommand;
pub use difficulty::{DifficultyTier, RequestedDifficulty};
pub use envelope::{ResponseData, ResponseEnvelope, ResponseMetadata};
pub use memory::GenerationMemory;
pub use outcome::{AttemptResult, ProgressEvent, RunOutcome, RunState, RunStats};
pub use record::{RawRecord, VocabularyRecord};
pub use request::{
    GenerationJob, GenerationRequest, RequestKind, DEFAULT_BATCH_SIZE, DEFAULT_TARGET_WORD_COUNT,
};
pub use settings::{CancelMode, OrchestratorConfig};
