use crate::domain::{
    CancelMode, GenerationJob, GenerationRequest, OrchestratorConfig, RequestKind,
    RequestedDifficulty, VocabCommand, DEFAULT_BATCH_SIZE, DEFAULT_TARGET_WORD_COUNT,
};
use clap::builder::ArgAction;
use clap::value_parser;
use clap_complete::Shell;
use common::domain::{ModelName, ProviderName};
use common::error::Error;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub help: bool,
    /// -L / --list-profiles
    pub list_profiles: bool,
    /// --ping: 2 語だけ生成させて接続と抽出を確かめる
    pub ping: bool,
    /// -v / --verbose: ログと進捗を stderr にも出す
    pub verbose: bool,
    /// --hard-stop: Ctrl+C で即座に Cancelled として終える（既定は失敗として数えて続行）
    pub hard_stop: bool,
    pub profile: Option<ProviderName>,
    pub model: Option<ModelName>,
    pub occupation: Option<String>,
    pub interests: Option<String>,
    pub theme: Option<String>,
    pub context: Option<String>,
    pub difficulty: Option<String>,
    pub target: Option<usize>,
    pub batch_size: Option<usize>,
    pub max_retries: Option<usize>,
    pub backoff_ms: Option<u64>,
    pub max_items: Option<usize>,
    pub language: Option<String>,
    /// --batch <file.json>
    pub batch: Option<PathBuf>,
    pub prompt_args: Vec<String>,
}

/// 解析結果: 通常の Config / 補完スクリプト生成
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Config(Config),
    GenerateCompletion(Shell),
}

fn text_arg(name: &'static str, value_name: &'static str, help: &'static str) -> clap::Arg {
    clap::Arg::new(name)
        .long(name)
        .value_name(value_name)
        .help(help)
        .num_args(1)
}

fn flag_arg(name: &'static str, help: &'static str) -> clap::Arg {
    clap::Arg::new(name)
        .long(name)
        .help(help)
        .action(ArgAction::SetTrue)
}

fn build_clap_command() -> clap::Command {
    clap::Command::new("vocab")
        .about("Generate a vocabulary list of a precise size with an LLM")
        .disable_help_flag(true)
        .arg(flag_arg("help", "Show this help message").short('h'))
        .arg(flag_arg("list-profiles", "List currently available provider profiles").short('L'))
        .arg(flag_arg("ping", "Ask the provider for 2 words and check the response parses"))
        .arg(flag_arg("verbose", "Mirror logs and batch progress to stderr").short('v'))
        .arg(flag_arg("hard-stop", "Stop immediately on Ctrl+C instead of counting it as a failed batch"))
        .arg(text_arg("profile", "profile", "Specify LLM profile (gemini, echo, etc.)").short('p'))
        .arg(text_arg("model", "model", "Specify model name (e.g. gemini-2.5-flash)").short('m'))
        .arg(text_arg("occupation", "text", "Persona request: occupation of the learner"))
        .arg(text_arg("interests", "text", "Persona request: interests or habits of the learner"))
        .arg(text_arg("theme", "text", "Persona request: theme of the list"))
        .arg(text_arg("context", "text", "Free-text request: context of the prompt"))
        .arg(
            text_arg("difficulty", "level", "Beginner, Intermediate, Advanced, Professional or Progressive")
                .short('d'),
        )
        .arg(
            text_arg("target", "words", "Target word count (tokens across all fields)")
                .short('t')
                .value_parser(value_parser!(usize)),
        )
        .arg(
            text_arg("batch-size", "n", "Records requested per call")
                .short('b')
                .value_parser(value_parser!(usize)),
        )
        .arg(
            text_arg("max-retries", "n", "Consecutive failed batches before giving up")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            text_arg("backoff-ms", "ms", "Wait after a failed call")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            text_arg("max-items", "n", "Maximum number of records returned")
                .value_parser(value_parser!(usize)),
        )
        .arg(text_arg("language", "name", "Language of the localized meaning (default: Traditional Chinese)"))
        .arg(
            text_arg("batch", "file.json", "Run every request in a JSON file concurrently")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            text_arg("generate", "shell", "Generate shell completion script")
                .value_parser(value_parser!(Shell)),
        )
        .arg(
            clap::Arg::new("positional")
                .index(1)
                .help("Free-text prompt words")
                .num_args(0..)
                .trailing_var_arg(true),
        )
}

fn matches_to_config(matches: &clap::ArgMatches) -> Config {
    let text = |name: &str| matches.get_one::<String>(name).cloned();
    Config {
        help: matches.get_flag("help"),
        list_profiles: matches.get_flag("list-profiles"),
        ping: matches.get_flag("ping"),
        verbose: matches.get_flag("verbose"),
        hard_stop: matches.get_flag("hard-stop"),
        profile: text("profile").map(ProviderName::new),
        model: text("model").map(ModelName::new),
        occupation: text("occupation"),
        interests: text("interests"),
        theme: text("theme"),
        context: text("context"),
        difficulty: text("difficulty"),
        target: matches.get_one::<usize>("target").copied(),
        batch_size: matches.get_one::<usize>("batch-size").copied(),
        max_retries: matches.get_one::<usize>("max-retries").copied(),
        backoff_ms: matches.get_one::<u64>("backoff-ms").copied(),
        max_items: matches.get_one::<usize>("max-items").copied(),
        language: text("language"),
        batch: matches.get_one::<PathBuf>("batch").cloned(),
        prompt_args: matches
            .get_many::<String>("positional")
            .map(|i| i.cloned().collect())
            .unwrap_or_default(),
    }
}

/// コマンドラインを解析する。補完生成が要求された場合は ParseOutcome::GenerateCompletion を返す。
pub fn parse_args() -> Result<ParseOutcome, Error> {
    let matches = build_clap_command()
        .try_get_matches()
        .map_err(|e| Error::invalid_argument(e.to_string()))?;

    if let Some(&shell) = matches.get_one::<Shell>("generate") {
        return Ok(ParseOutcome::GenerateCompletion(shell));
    }
    Ok(ParseOutcome::Config(matches_to_config(&matches)))
}

/// テスト用: 引数スライスから解析する
#[cfg(test)]
pub fn parse_args_from(args: &[String]) -> Result<Config, Error> {
    let matches = build_clap_command()
        .try_get_matches_from(args)
        .map_err(|e| Error::invalid_argument(e.to_string()))?;
    Ok(matches_to_config(&matches))
}

/// 補完スクリプトを標準出力に出力する。
pub fn print_completion(shell: Shell) {
    let opts = "-h --help -L --list-profiles --ping -v --verbose --hard-stop -p --profile -m --model --occupation --interests --theme --context -d --difficulty -t --target -b --batch-size --max-retries --backoff-ms --max-items --language --batch --generate";
    match shell {
        Shell::Bash => {
            println!(
                r#"# Completion for vocab (options, profile names via vocab -L)
_vocab() {{
  local cur="${{COMP_WORDS[COMP_CWORD]}}"
  local prev="${{COMP_WORDS[COMP_CWORD-1]}}"
  case "$prev" in
    -p|--profile) COMPREPLY=($(compgen -W "$(vocab -L 2>/dev/null | cut -d' ' -f1)" -- "$cur")); return ;;
    -d|--difficulty) COMPREPLY=($(compgen -W "Beginner Intermediate Advanced Professional Progressive" -- "$cur")); return ;;
    --batch) COMPREPLY=($(compgen -f -- "$cur")); return ;;
  esac
  COMPREPLY=($(compgen -W "{opts}" -- "$cur"))
}}
complete -F _vocab vocab
"#,
                opts = opts
            );
        }
        Shell::Zsh => {
            println!(
                r#"#compdef vocab
# Completion for vocab
local -a reply
reply=({opts})
_describe 'vocab' reply
"#,
                opts = opts
            );
        }
        Shell::Fish => {
            println!(
                r#"# Completion for vocab
complete -c vocab -l help -s h -d "Show help"
complete -c vocab -l list-profiles -s L -d "List profiles"
complete -c vocab -l ping -d "Connection test"
complete -c vocab -l verbose -s v -d "Verbose logs"
complete -c vocab -l hard-stop -d "Stop immediately on Ctrl+C"
complete -c vocab -l profile -s p -d "LLM profile" -r -a "(vocab -L 2>/dev/null | cut -d' ' -f1)"
complete -c vocab -l model -s m -d "Model name" -r
complete -c vocab -l difficulty -s d -d "Difficulty" -r -a "Beginner Intermediate Advanced Professional Progressive"
complete -c vocab -l target -s t -d "Target word count" -r
complete -c vocab -l batch-size -s b -d "Records per call" -r
complete -c vocab -l batch -d "Batch request file" -r -F
complete -c vocab -l generate -d "Generate completion script" -r -a "bash zsh fish"
"#
            );
        }
        _ => {}
    }
}

/// 実行時の調整値（--max-retries / --backoff-ms / --max-items / --hard-stop）
pub fn orchestrator_config(config: &Config) -> OrchestratorConfig {
    let defaults = OrchestratorConfig::default();
    OrchestratorConfig {
        max_retries: config.max_retries.unwrap_or(defaults.max_retries),
        backoff: config
            .backoff_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.backoff),
        item_cap: config.max_items,
        cancel_mode: if config.hard_stop {
            CancelMode::HardStop
        } else {
            CancelMode::Graceful
        },
        options: defaults.options,
    }
}

fn request_kind(config: &Config) -> Result<RequestKind, Error> {
    let prompt = config.prompt_args.join(" ");
    if config.occupation.is_some() || config.interests.is_some() {
        if !prompt.trim().is_empty() {
            return Err(Error::invalid_argument(
                "Prompt words cannot be combined with --occupation/--interests",
            ));
        }
        return Ok(RequestKind::Persona {
            occupation: config.occupation.clone().unwrap_or_default(),
            interests: config.interests.clone().unwrap_or_default(),
            theme: config.theme.clone(),
        });
    }
    Ok(RequestKind::FreeText {
        prompt,
        context: config.context.clone().or_else(|| config.theme.clone()),
    })
}

/// Config を VocabCommand に変換する。生成パラメータの不正はここで usage エラーになる。
pub fn config_to_command(config: Config) -> Result<VocabCommand, Error> {
    if config.help {
        return Ok(VocabCommand::Help);
    }
    if config.list_profiles {
        return Ok(VocabCommand::ListProfiles);
    }
    if config.ping {
        return Ok(VocabCommand::Ping {
            profile: config.profile,
            model: config.model,
        });
    }
    if let Some(path) = config.batch {
        return Ok(VocabCommand::Batch {
            profile: config.profile,
            model: config.model,
            path,
        });
    }

    let difficulty = match &config.difficulty {
        Some(d) => RequestedDifficulty::parse(d)?,
        None => RequestedDifficulty::default(),
    };
    let mut request = GenerationRequest::new(
        request_kind(&config)?,
        difficulty,
        config.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
    )?;
    if let Some(language) = &config.language {
        request = request.with_meaning_language(language.as_str());
    }
    let job = GenerationJob::new(
        request,
        config.target.unwrap_or(DEFAULT_TARGET_WORD_COUNT),
    )?;
    Ok(VocabCommand::Generate {
        profile: config.profile,
        model: config.model,
        job,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DifficultyTier;

    fn args(v: &[&str]) -> Vec<String> {
        std::iter::once("vocab")
            .chain(v.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_parse_args_no_args() {
        let config = parse_args_from(&args(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_args_help_and_list_profiles() {
        assert!(parse_args_from(&args(&["-h"])).unwrap().help);
        assert!(parse_args_from(&args(&["--help"])).unwrap().help);
        assert!(parse_args_from(&args(&["-L"])).unwrap().list_profiles);
        assert!(parse_args_from(&args(&["--list-profiles"])).unwrap().list_profiles);
    }

    #[test]
    fn test_parse_args_unknown_option() {
        let err = parse_args_from(&args(&["--unknown"])).unwrap_err();
        assert_eq!(err.exit_code(), 64);
        let err = parse_args_from(&args(&["-x"])).unwrap_err();
        assert_eq!(err.exit_code(), 64);
    }

    #[test]
    fn test_parse_args_numeric_options() {
        let config = parse_args_from(&args(&[
            "-t", "120", "-b", "15", "--max-retries", "3", "--backoff-ms", "250", "--max-items", "40",
            "cooking",
        ]))
        .unwrap();
        assert_eq!(config.target, Some(120));
        assert_eq!(config.batch_size, Some(15));
        assert_eq!(config.max_retries, Some(3));
        assert_eq!(config.backoff_ms, Some(250));
        assert_eq!(config.max_items, Some(40));
        assert_eq!(config.prompt_args, vec!["cooking".to_string()]);

        let err = parse_args_from(&args(&["-t", "many"])).unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_parse_args_profile_requires_arg() {
        let err = parse_args_from(&args(&["-p"])).unwrap_err();
        assert_eq!(err.exit_code(), 64);
    }

    #[test]
    fn test_parse_args_prompt_words_and_profile() {
        let config =
            parse_args_from(&args(&["-p", "echo", "-m", "m1", "cooking", "and", "food"])).unwrap();
        assert_eq!(config.profile.as_ref().map(|p| p.as_ref()), Some("echo"));
        assert_eq!(config.model.as_ref().map(|m| m.as_ref()), Some("m1"));
        assert_eq!(config.prompt_args.join(" "), "cooking and food");
    }

    #[test]
    fn test_config_to_command_priority() {
        let config = Config {
            help: true,
            list_profiles: true,
            ..Default::default()
        };
        assert_eq!(config_to_command(config).unwrap(), VocabCommand::Help);

        let config = Config {
            ping: true,
            prompt_args: vec!["x".to_string()],
            ..Default::default()
        };
        assert!(matches!(config_to_command(config).unwrap(), VocabCommand::Ping { .. }));

        let config = Config {
            batch: Some(PathBuf::from("requests.json")),
            ..Default::default()
        };
        assert!(matches!(config_to_command(config).unwrap(), VocabCommand::Batch { .. }));
    }

    #[test]
    fn test_config_to_command_free_text_defaults() {
        let config = parse_args_from(&args(&["cooking", "and", "food"])).unwrap();
        let VocabCommand::Generate { job, .. } = config_to_command(config).unwrap() else {
            panic!("expected generate");
        };
        assert_eq!(job.target_word_count, 70);
        assert_eq!(job.request.batch_size(), 10);
        assert_eq!(
            job.request.difficulty(),
            RequestedDifficulty::Tier(DifficultyTier::Intermediate)
        );
        assert_eq!(
            job.request.kind(),
            &RequestKind::FreeText {
                prompt: "cooking and food".to_string(),
                context: None
            }
        );
    }

    #[test]
    fn test_config_to_command_persona() {
        let config = parse_args_from(&args(&[
            "--occupation",
            "Nurse",
            "--interests",
            "hiking",
            "-d",
            "progressive",
            "--language",
            "Japanese",
        ]))
        .unwrap();
        let VocabCommand::Generate { job, .. } = config_to_command(config).unwrap() else {
            panic!("expected generate");
        };
        assert_eq!(job.request.difficulty(), RequestedDifficulty::Progressive);
        assert_eq!(job.request.meaning_language(), "Japanese");
        assert!(matches!(job.request.kind(), RequestKind::Persona { .. }));
    }

    #[test]
    fn test_config_to_command_usage_errors() {
        for argv in [
            vec![],
            vec!["-b", "0", "cooking"],
            vec!["-t", "0", "cooking"],
            vec!["-d", "expert", "cooking"],
            vec!["--occupation", "Nurse"],
            vec!["--occupation", "Nurse", "--interests", "hiking", "extra"],
        ] {
            let config = parse_args_from(&args(&argv)).unwrap();
            let err = config_to_command(config).unwrap_err();
            assert!(err.is_usage(), "{:?} should be a usage error", argv);
        }
    }

    #[test]
    fn test_orchestrator_config_from_flags() {
        let config = parse_args_from(&args(&[
            "--max-retries", "2", "--backoff-ms", "10", "--max-items", "5", "--hard-stop", "x",
        ]))
        .unwrap();
        let c = orchestrator_config(&config);
        assert_eq!(c.max_retries, 2);
        assert_eq!(c.backoff, Duration::from_millis(10));
        assert_eq!(c.item_cap, Some(5));
        assert_eq!(c.cancel_mode, CancelMode::HardStop);

        let c = orchestrator_config(&Config::default());
        assert_eq!(c, OrchestratorConfig::default());

        let config = parse_args_from(&args(&["--max-retries", "0", "x"])).unwrap();
        assert!(orchestrator_config(&config).validate().unwrap_err().is_usage());
    }
}
