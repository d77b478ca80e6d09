mod adapter;
mod cli;
mod domain;
mod ports;
mod usecase;
mod wiring;

#[cfg(test)]
mod tests;

use std::process;

use cli::{config_to_command, parse_args, print_completion, Config, ParseOutcome};
use common::error::Error;
use common::ports::outbound::{LogLevel, LogRecord};
use domain::VocabCommand;
use ports::inbound::UseCaseRunner;
use serde::Serialize;
use wiring::{wire_vocab, App};

/// Command をディスパッチする Runner（match は main レイヤーに集約）
struct Runner {
    app: App,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Error> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| Error::json(format!("Failed to serialize output: {}", e)))?;
    println!("{}", text);
    Ok(())
}

impl Runner {
    fn log(&self, record: LogRecord) {
        let _ = self.app.logger.log(&record.layer("cli"));
    }

    fn dispatch(&self, cmd: VocabCommand) -> Result<i32, Error> {
        let use_case = &self.app.vocab_use_case;
        match cmd {
            VocabCommand::Help => {
                print_help();
                Ok(0)
            }
            VocabCommand::ListProfiles => {
                let (names, default) = use_case.list_profiles()?;
                for name in &names {
                    if default.as_deref() == Some(name.as_str()) {
                        println!("{} (default)", name);
                    } else {
                        println!("{}", name);
                    }
                }
                Ok(0)
            }
            VocabCommand::Ping { profile, model } => {
                let report = use_case.ping(profile.as_ref(), model.as_ref())?;
                print_json(&report)?;
                Ok(if report.valid > 0 { 0 } else { 1 })
            }
            VocabCommand::Generate {
                profile,
                model,
                job,
            } => {
                let envelope = use_case.generate(profile.as_ref(), model.as_ref(), &job)?;
                print_json(&envelope)?;
                Ok(0)
            }
            VocabCommand::Batch {
                profile,
                model,
                path,
            } => {
                let envelopes = use_case.run_batch(profile.as_ref(), model.as_ref(), &path)?;
                print_json(&envelopes)?;
                Ok(0)
            }
        }
    }
}

impl UseCaseRunner for Runner {
    fn run(&self, config: Config) -> Result<i32, Error> {
        let cmd = config_to_command(config)?;
        let command_name = cmd.name();
        self.log(
            LogRecord::new(LogLevel::Info, "command started")
                .kind("lifecycle")
                .field("command", command_name),
        );
        let result = self.dispatch(cmd);
        let code = match &result {
            Ok(code) => *code,
            Err(e) => e.exit_code(),
        };
        self.log(
            LogRecord::new(LogLevel::Info, "command finished")
                .kind("lifecycle")
                .field("command", command_name)
                .field("exit_code", code),
        );
        if let Err(ref e) = result {
            self.log(LogRecord::new(LogLevel::Error, e.to_string()).kind("error"));
        }
        result
    }
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            if e.is_usage() {
                print_usage();
            }
            eprintln!("vocab: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

pub fn run() -> Result<i32, Error> {
    let config = match parse_args()? {
        ParseOutcome::Config(c) => c,
        ParseOutcome::GenerateCompletion(shell) => {
            print_completion(shell);
            return Ok(0);
        }
    };
    let app = wire_vocab(&config)?;
    let runner = Runner { app };
    runner.run(config)
}

fn print_usage() {
    eprintln!("Usage: vocab [options] [prompt...]");
}

fn print_help() {
    println!("Usage: vocab [options] [prompt...]");
    println!("Options:");
    println!("  -h, --help                    Show this help message");
    println!("  -L, --list-profiles           List currently available provider profiles (from profiles.json + built-ins)");
    println!("      --ping                    Ask the provider for 2 words and report whether the response parses");
    println!("  -p, --profile <profile>       Specify LLM profile (gemini, echo, etc.). Default: profiles.json default, or gemini");
    println!("  -m, --model <model>           Specify model name. Default: profile default");
    println!("      --occupation <text>       Persona request: learner's occupation (use with --interests)");
    println!("      --interests <text>        Persona request: learner's interests or habits");
    println!("      --theme <text>            Theme of the list (default: Professional and Personal Development)");
    println!("      --context <text>          Context for a free-text prompt (default: General Vocabulary)");
    println!("  -d, --difficulty <level>      Beginner, Intermediate, Advanced, Professional or Progressive (default: Intermediate)");
    println!("  -t, --target <words>          Target word count, counted over all fields of every record (default: 70)");
    println!("  -b, --batch-size <n>          Records requested per call (default: 10)");
    println!("      --max-retries <n>         Consecutive failed batches before giving up (default: 5)");
    println!("      --backoff-ms <ms>         Wait after a failed call (default: 1000)");
    println!("      --max-items <n>           Maximum number of records returned (default: target word count)");
    println!("      --language <name>         Language of the localized meaning (default: Traditional Chinese)");
    println!("      --batch <file.json>       Run every request in a JSON array concurrently");
    println!("      --hard-stop               On Ctrl+C stop at once and return what was generated so far");
    println!("  -v, --verbose                 Mirror logs and batch progress to stderr");
    println!("      --generate <shell>        Generate shell completion script (bash, zsh, fish)");
    println!();
    println!("Environment:");
    println!("  VOCAB_HOME      Home directory. Profiles: $VOCAB_HOME/config/profiles.json");
    println!("                  If unset, $XDG_CONFIG_HOME/vocab (e.g. ~/.config/vocab) is used.");
    println!("  VOCAB_LOG_FILE  Structured log (JSONL) path. Default: <home>/log/vocab.jsonl");
    println!("  GEMINI_API_KEY  API key for the gemini profile (or the profile's api_key_env)");
    println!();
    println!("Output:");
    println!("  A JSON envelope {{success, data: {{vocabulary, stats, metadata}}, error}} on stdout.");
    println!();
    println!("Examples:");
    println!("  vocab cooking and food preparation");
    println!("  vocab -d Advanced -t 120 --context Restaurant kitchen safety");
    println!("  vocab --occupation \"Software Engineer\" --interests \"Reading docs\" -d progressive");
    println!("  vocab -p echo --ping");
    println!("  vocab --batch requests.json");
}
