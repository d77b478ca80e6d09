use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::adapter::NoopLog;
use common::error::Error;
use serde_json::Value;

use super::{batch_text, entry, entry_with};
use crate::adapter::{
    FlagInterruptChecker, NoopInterruptChecker, RecordingProgress, StubTextGenerator,
};
use crate::domain::{
    AttemptResult, CancelMode, DifficultyTier, GenerationJob, GenerationRequest,
    OrchestratorConfig, RequestKind, RunState,
};
use crate::ports::outbound::{InterruptChecker, ProgressSink, TextGenerator};
use crate::usecase::orchestrator::{BatchOrchestrator, OrchestratorDeps};

fn job(target: usize, batch_size: usize) -> GenerationJob {
    let request = GenerationRequest::new(
        RequestKind::FreeText {
            prompt: "cooking and food preparation".to_string(),
            context: None,
        },
        DifficultyTier::Intermediate.into(),
        batch_size,
    )
    .unwrap();
    GenerationJob::new(request, target).unwrap()
}

fn fast_config() -> OrchestratorConfig {
    OrchestratorConfig {
        backoff: Duration::ZERO,
        ..Default::default()
    }
}

fn orchestrator_with(
    generator: &Arc<StubTextGenerator>,
    interrupt: Arc<dyn InterruptChecker>,
    config: OrchestratorConfig,
) -> (BatchOrchestrator, Arc<RecordingProgress>) {
    let progress = Arc::new(RecordingProgress::default());
    let orchestrator = BatchOrchestrator::new(
        OrchestratorDeps {
            generator: Arc::clone(generator) as Arc<dyn TextGenerator>,
            interrupt,
            progress: Arc::clone(&progress) as Arc<dyn ProgressSink>,
            log: Arc::new(NoopLog),
        },
        config,
    )
    .unwrap();
    (orchestrator, progress)
}

fn orchestrator(
    generator: &Arc<StubTextGenerator>,
    config: OrchestratorConfig,
) -> (BatchOrchestrator, Arc<RecordingProgress>) {
    orchestrator_with(generator, Arc::new(NoopInterruptChecker::new()), config)
}

/// 呼び出しごとに新しい見出し語を n 件返す
fn unique_words(n: usize) -> StubTextGenerator {
    StubTextGenerator::new(move |i, _| {
        let words: Vec<String> = (0..n).map(|k| format!("w{}x{}", i, k)).collect();
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        Ok(batch_text(&refs))
    })
}

#[test]
fn test_target_70_with_15_token_batches_takes_exactly_five_batches() {
    let generator = Arc::new(unique_words(3));
    let (orch, progress) = orchestrator(&generator, fast_config());

    let outcome = orch.run(&job(70, 10));

    assert_eq!(generator.calls(), 5);
    assert_eq!(outcome.records.len(), 15);
    assert_eq!(outcome.stats.word_count, 75);
    assert_eq!(outcome.stats.item_count, 15);
    assert_eq!(outcome.stats.batches_attempted, 5);
    assert!(outcome.stats.is_complete);
    assert_eq!(outcome.stats.state, RunState::Completed);
    assert_eq!(outcome.stats.history.len(), 5);
    assert_eq!(
        outcome.stats.history[4],
        "Batch 5: Generated 3 vocabulary items, 3 unique added"
    );
    let batch_numbers: Vec<usize> = progress.events().iter().map(|e| e.batch_number).collect();
    assert_eq!(batch_numbers, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_later_duplicate_with_different_definition_is_dropped() {
    let generator = Arc::new(StubTextGenerator::new(|i, _| {
        let batch = match i {
            0 => vec![entry_with("ubiquitous", "found everywhere"), entry("ledger")],
            1 => vec![entry_with("Ubiquitous", "present in all places"), entry("brisk")],
            _ => vec![entry("candid")],
        };
        Ok(Value::Array(batch).to_string())
    }));
    let (orch, _) = orchestrator(&generator, fast_config());

    let outcome = orch.run(&job(20, 10));

    let headwords: Vec<&str> = outcome.records.iter().map(|r| r.headword.as_str()).collect();
    assert_eq!(headwords, vec!["ubiquitous", "ledger", "brisk", "candid"]);
    assert_eq!(outcome.records[0].definition, "found everywhere");
    assert_eq!(
        outcome.stats.history[1],
        "Batch 2: Generated 2 vocabulary items, 1 unique added"
    );
    assert!(outcome.stats.is_complete);
}

#[test]
fn test_always_timing_out_generator_stops_after_five_attempts() {
    let generator = Arc::new(StubTextGenerator::new(|_, _| {
        Err(Error::http("request timed out"))
    }));
    let (orch, progress) = orchestrator(&generator, fast_config());

    let outcome = orch.run(&job(70, 10));

    assert_eq!(generator.calls(), 5);
    assert!(outcome.records.is_empty());
    assert!(!outcome.stats.is_complete);
    assert_eq!(outcome.stats.state, RunState::Exhausted);
    assert_eq!(outcome.stats.batches_attempted, 5);
    assert!(outcome
        .stats
        .history
        .iter()
        .all(|h| h == "Batch 1: Failed (request timed out)"));
    let failures: Vec<usize> = progress
        .events()
        .iter()
        .map(|e| e.consecutive_failures)
        .collect();
    assert_eq!(failures, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_garbage_generator_terminates_without_backoff() {
    let generator = Arc::new(StubTextGenerator::always(
        "I'm sorry, I cannot produce that list right now.",
    ));
    // 重複・不正だけのバッチでは待たないので、長いバックオフでもすぐ終わる
    let config = OrchestratorConfig {
        backoff: Duration::from_secs(30),
        ..Default::default()
    };
    let (orch, progress) = orchestrator(&generator, config);

    let started = Instant::now();
    let outcome = orch.run(&job(70, 10));

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(generator.calls(), 5);
    assert!(outcome.records.is_empty());
    assert!(!outcome.stats.is_complete);
    assert_eq!(outcome.stats.state, RunState::Exhausted);
    assert!(progress
        .events()
        .iter()
        .all(|e| e.result == AttemptResult::NothingNew { generated: 0 }));
}

#[test]
fn test_prompt_requests_remaining_count_when_below_batch_size() {
    let generator = Arc::new(StubTextGenerator::new(|i, _| {
        Ok(match i {
            0 => batch_text(&["alpha", "bravo", "charlie", "delta"]),
            _ => batch_text(&["echo"]),
        })
    }));
    let (orch, _) = orchestrator(&generator, fast_config());

    let outcome = orch.run(&job(23, 10));

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("Batch 1: Generate exactly 10 unique vocabulary words"));
    assert!(prompts[1].contains("Batch 2: Generate exactly 3 unique vocabulary words"));
    assert!(prompts[1].contains("alpha, bravo, charlie, delta"));
    assert!(outcome.stats.is_complete);
}

#[test]
fn test_fenced_json_response_is_parsed() {
    let generator = Arc::new(StubTextGenerator::new(|i, _| {
        let words = [format!("a{}", i), format!("b{}", i), format!("c{}", i)];
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        Ok(format!(
            "Here is the list:\n```json\n{}\n```\nEnjoy!",
            batch_text(&refs)
        ))
    }));
    let (orch, progress) = orchestrator(&generator, fast_config());

    let outcome = orch.run(&job(15, 10));

    assert_eq!(generator.calls(), 1);
    assert_eq!(outcome.records.len(), 3);
    assert_eq!(
        progress.events()[0].result,
        AttemptResult::Added {
            generated: 3,
            added: 3
        }
    );
}

#[test]
fn test_invalid_records_are_dropped_before_dedup() {
    let generator = Arc::new(StubTextGenerator::new(|i, _| {
        let mut bad = entry(&format!("bad{}", i));
        bad["difficulty"] = Value::from("Expert");
        let mut blank = entry(&format!("blank{}", i));
        blank["example"] = Value::from("  ");
        Ok(Value::Array(vec![bad, blank, entry(&format!("good{}", i))]).to_string())
    }));
    let (orch, _) = orchestrator(&generator, fast_config());

    let outcome = orch.run(&job(10, 10));

    let headwords: Vec<&str> = outcome.records.iter().map(|r| r.headword.as_str()).collect();
    assert_eq!(headwords, vec!["good0", "good1"]);
    assert_eq!(
        outcome.stats.history[0],
        "Batch 1: Generated 1 vocabulary items, 1 unique added"
    );
}

#[test]
fn test_results_have_unique_headwords_and_monotonic_word_count() {
    // 成功・重複・失敗・ごみが混ざった応答列
    let generator = Arc::new(StubTextGenerator::new(|i, _| match i % 4 {
        0 => Ok(batch_text(&[
            format!("Word{}", i).as_str(),
            "shared",
            format!("extra{}", i).as_str(),
        ])),
        1 => Ok(batch_text(&["SHARED", "Shared"])),
        2 => Err(Error::empty_response("No text in echo response")),
        _ => Ok("[{\"word\": \"broken\", ".to_string()),
    }));
    let (orch, progress) = orchestrator(&generator, fast_config());

    let outcome = orch.run(&job(40, 10));

    let mut seen = HashSet::new();
    for r in &outcome.records {
        assert!(seen.insert(r.headword.to_lowercase()), "duplicate {}", r.headword);
    }
    let counts: Vec<usize> = progress.events().iter().map(|e| e.memory.word_count).collect();
    assert!(!counts.is_empty());
    assert!(counts.windows(2).all(|w| w[0] <= w[1]), "{:?}", counts);
}

#[test]
fn test_progress_events_carry_memory_snapshot() {
    let generator = Arc::new(unique_words(3));
    let (orch, progress) = orchestrator(&generator, fast_config());

    orch.run(&job(30, 10));

    let events = progress.events();
    assert_eq!(events.len(), 2);
    for event in &events {
        assert_eq!(event.memory.history.len(), event.attempt);
        assert_eq!(event.memory.target_word_count, 30);
    }
    assert_eq!(events[0].memory.item_count, 3);
    assert!(!events[0].memory.is_complete);
    assert_eq!(events[1].memory.item_count, 6);
    assert!(events[1].memory.is_complete);
    assert!(events[1].memory.history[1].starts_with("Batch 2: Generated 3"));

    let v = serde_json::to_value(&events[1]).unwrap();
    assert_eq!(v["wordCount"], 30);
    assert_eq!(v["isComplete"], true);
}

#[test]
fn test_success_resets_consecutive_failures() {
    let generator = Arc::new(StubTextGenerator::new(|i, _| {
        if i % 5 == 4 {
            Ok(batch_text(&[format!("x{}", i).as_str(), format!("y{}", i).as_str()]))
        } else {
            Err(Error::http("HTTP 503"))
        }
    }));
    let (orch, _) = orchestrator(&generator, fast_config());

    let outcome = orch.run(&job(20, 10));

    assert_eq!(generator.calls(), 10);
    assert_eq!(outcome.stats.state, RunState::Completed);
    assert_eq!(outcome.records.len(), 4);
    assert_eq!(outcome.stats.batches_attempted, 10);
    assert!(outcome.stats.history[3].starts_with("Batch 1: Failed"));
    assert!(outcome.stats.history[5].starts_with("Batch 2: Failed"));
}

#[test]
fn test_hard_stop_cancels_with_partial_records() {
    let flag = Arc::new(FlagInterruptChecker::new());
    let trigger = Arc::clone(&flag);
    let generator = Arc::new(StubTextGenerator::new(move |i, _| {
        if i == 0 {
            return Ok(batch_text(&["alpha", "bravo"]));
        }
        trigger.cancel();
        Err(Error::Interrupted)
    }));
    let config = OrchestratorConfig {
        cancel_mode: CancelMode::HardStop,
        ..fast_config()
    };
    let (orch, _) = orchestrator_with(&generator, flag, config);

    let outcome = orch.run(&job(70, 10));

    assert_eq!(generator.calls(), 2);
    assert_eq!(outcome.stats.state, RunState::Cancelled);
    assert_eq!(outcome.records.len(), 2);
    assert!(!outcome.stats.is_complete);
    assert_eq!(outcome.stats.history[1], "Batch 2: Failed (interrupted)");
}

#[test]
fn test_graceful_cancel_counts_as_transport_failures() {
    let flag = Arc::new(FlagInterruptChecker::new());
    let trigger = Arc::clone(&flag);
    let generator = Arc::new(StubTextGenerator::new(move |i, _| {
        if i == 0 {
            return Ok(batch_text(&["alpha", "bravo"]));
        }
        trigger.cancel();
        Err(Error::Interrupted)
    }));
    let config = OrchestratorConfig {
        backoff: Duration::from_secs(30),
        ..Default::default()
    };
    let (orch, _) = orchestrator_with(&generator, flag, config);

    let started = Instant::now();
    let outcome = orch.run(&job(70, 10));

    // 割り込み中はバックオフを待たない
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(generator.calls(), 6);
    assert_eq!(outcome.stats.state, RunState::Exhausted);
    assert_eq!(outcome.records.len(), 2);
}

#[test]
fn test_item_cap_truncates_returned_records() {
    let generator = Arc::new(unique_words(3));
    let config = OrchestratorConfig {
        item_cap: Some(4),
        ..fast_config()
    };
    let (orch, _) = orchestrator(&generator, config);

    let outcome = orch.run(&job(70, 10));

    assert_eq!(outcome.records.len(), 4);
    assert_eq!(outcome.stats.item_count, 4);
    assert_eq!(outcome.stats.word_count, 75);
    assert!(outcome.stats.is_complete);
    assert_eq!(outcome.records[0].headword, "w0x0");
}

#[test]
fn test_zero_max_retries_is_rejected_before_any_batch() {
    let generator = Arc::new(unique_words(3));
    let result = BatchOrchestrator::new(
        OrchestratorDeps {
            generator: Arc::clone(&generator) as Arc<dyn TextGenerator>,
            interrupt: Arc::new(NoopInterruptChecker::new()),
            progress: Arc::new(RecordingProgress::default()),
            log: Arc::new(NoopLog),
        },
        OrchestratorConfig {
            max_retries: 0,
            ..Default::default()
        },
    );
    let err = result.err().expect("max_retries 0 must be rejected");
    assert!(err.is_usage());
    assert_eq!(generator.calls(), 0);
}

#[test]
fn test_backoff_is_applied_after_transport_failure() {
    let generator = Arc::new(StubTextGenerator::sequence(vec![
        Err(Error::http("HTTP 500")),
        Ok(batch_text(&["alpha", "bravo"])),
    ]));
    let config = OrchestratorConfig {
        backoff: Duration::from_millis(120),
        ..Default::default()
    };
    let (orch, _) = orchestrator(&generator, config);

    let started = Instant::now();
    let outcome = orch.run(&job(10, 10));

    assert!(started.elapsed() >= Duration::from_millis(120));
    assert_eq!(outcome.stats.state, RunState::Completed);
    assert_eq!(outcome.stats.batches_attempted, 2);
}
