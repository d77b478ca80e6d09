//! コマンドライン解析（clap）と Config → VocabCommand の変換

mod args;

pub use args::{
    config_to_command, orchestrator_config, parse_args, print_completion, Config, ParseOutcome,
};
