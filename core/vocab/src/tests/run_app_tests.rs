use crate::cli::Config;
use crate::ports::inbound::UseCaseRunner;
use crate::wiring;
use common::domain::ProviderName;
use common::error::Error;

/// 標準アダプターで App を組み立て、Runner で run する（テスト用の入口）
fn run_app(config: Config) -> Result<i32, Error> {
    let app = wiring::wire_vocab(&config)?;
    let runner = crate::Runner { app };
    runner.run(config)
}

fn echo() -> Option<ProviderName> {
    Some(ProviderName::new("echo"))
}

#[test]
fn test_run_app_with_help() {
    let config = Config {
        help: true,
        ..Default::default()
    };
    assert_eq!(run_app(config).unwrap(), 0);
}

#[test]
fn test_run_app_without_prompt() {
    let err = run_app(Config::default()).unwrap_err();
    assert!(
        err.to_string().contains("No prompt provided"),
        "expected 'No prompt provided', got: {}",
        err
    );
    assert_eq!(err.exit_code(), 64);
}

#[test]
fn test_run_app_generate_with_echo_profile() {
    // echo プロファイルはネットワークも API キーも不要
    let config = Config {
        profile: echo(),
        prompt_args: vec!["cooking".to_string(), "and".to_string(), "food".to_string()],
        target: Some(30),
        ..Default::default()
    };
    assert_eq!(run_app(config).unwrap(), 0);
}

#[test]
fn test_run_app_ping_with_echo_profile() {
    let config = Config {
        profile: echo(),
        ping: true,
        ..Default::default()
    };
    assert_eq!(run_app(config).unwrap(), 0);
}

#[test]
fn test_run_app_rejects_zero_max_retries() {
    let config = Config {
        profile: echo(),
        prompt_args: vec!["cooking".to_string()],
        max_retries: Some(0),
        ..Default::default()
    };
    let err = run_app(config).unwrap_err();
    assert!(err.is_usage());
}

#[test]
fn test_run_app_unknown_profile() {
    let config = Config {
        profile: Some(ProviderName::new("no-such-profile")),
        prompt_args: vec!["cooking".to_string()],
        ..Default::default()
    };
    let err = run_app(config).unwrap_err();
    assert!(err.to_string().contains("Unknown provider"));
    assert_eq!(err.exit_code(), 64);
}

#[test]
fn test_run_app_batch_with_echo_profile() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("requests.json");
    std::fs::write(
        &path,
        r#"[{"prompt": "Business vocabulary", "targetCount": 24}, {"prompt": "", "targetCount": 10}]"#,
    )
    .unwrap();
    let config = Config {
        profile: echo(),
        batch: Some(path),
        ..Default::default()
    };
    assert_eq!(run_app(config).unwrap(), 0);
}
