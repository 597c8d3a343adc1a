//! Case execution on shared and dedicated threads

#![allow(clippy::unwrap_used)]

use assert_matches::assert_matches;
use std::sync::Arc;
use std::time::{Duration, Instant};
use verdict_case::{
    CaseExecutor, ExecutionStrategy, FailureKind, MethodRef, RunState, SkipLabel, TestCase,
    Value, Verdict,
};
use verdict_core::properties::keys;
use verdict_core::{ExecutionContext, PropertyBag, ReportNode, TEST_SUITE_ELEMENT};
use verdict_testkit::*;

fn thread_name_method(name: &str) -> MethodRef {
    MethodRef::new(name, type_name("tests.Fixture"), || {
        Ok(Value::from(std::thread::current().name().unwrap_or("<unnamed>")))
    })
}

#[tokio::test]
async fn test_shared_case_passes() {
    init_test_tracing();
    let executor = CaseExecutor::new(ExecutionContext::new());
    let case = Arc::new(case_of(method_returning("answer", 42)).expecting_result(42));

    let result = executor.run(case).await;

    assert_success!(result.verdict());
    assert_eq!(result.affinity().unwrap().strategy(), ExecutionStrategy::Shared);
    assert!(result.end_time() >= result.start_time());
}

#[tokio::test]
async fn test_isolated_case_runs_on_named_thread() {
    let executor = CaseExecutor::new(ExecutionContext::new().with_thread_name_prefix("iso"));
    let case = Arc::new(
        case_of(thread_name_method("where"))
            .with_property(keys::TIMEOUT, 5_000)
            .expecting_result("iso:where"),
    );

    let result = executor.run(case).await;

    assert_success!(result.verdict());
    assert!(result.affinity().unwrap().isolate());
}

#[tokio::test]
async fn test_nul_in_thread_prefix_is_stripped() {
    let executor = CaseExecutor::new(ExecutionContext::new().with_thread_name_prefix("i\0so"));
    let case = Arc::new(
        case_of(thread_name_method("where"))
            .with_property(keys::TIMEOUT, 5_000)
            .expecting_result("iso:where"),
    );

    let result = executor.run(case).await;

    assert_success!(result.verdict());
}

#[tokio::test]
async fn test_shared_case_does_not_use_dedicated_thread() {
    let executor = CaseExecutor::new(ExecutionContext::new().with_thread_name_prefix("iso"));
    let case = Arc::new(case_of(thread_name_method("where")).expecting_result("iso:where"));

    let result = executor.run(case).await;
    assert_failure!(result.verdict().clone(), FailureKind::ResultMismatch);
}

#[tokio::test]
async fn test_timeout_abandons_runaway_case() {
    init_test_tracing();
    let executor = CaseExecutor::new(ExecutionContext::new());
    let case = Arc::new(
        case_of(method_sleeping("hangs", Duration::from_secs(5))).with_property(keys::TIMEOUT, 50),
    );

    let started = Instant::now();
    let result = executor.run(case).await;

    assert!(started.elapsed() < Duration::from_secs(4));
    let failure = assert_failure!(result.verdict().clone(), FailureKind::TimeoutExceeded);
    assert!(failure.message().contains("50ms"));
    assert_eq!(
        result.affinity().unwrap().timeout(),
        Some(Duration::from_millis(50))
    );
}

#[tokio::test]
async fn test_context_default_timeout_applies() {
    let executor = CaseExecutor::new(ExecutionContext::new().with_default_timeout_ms(40));
    let case = Arc::new(case_of(method_sleeping("hangs", Duration::from_secs(5))));

    let result = executor.run(case).await;
    assert_failure!(result.verdict().clone(), FailureKind::TimeoutExceeded);
}

#[tokio::test]
async fn test_fast_isolated_case_beats_timeout() {
    let executor = CaseExecutor::new(ExecutionContext::new());
    let parent = fixture_with("tests.Fixture", PropertyBag::new().with(keys::TIMEOUT, 5_000));
    let case = Arc::new(
        TestCase::new(method_sleeping("naps", Duration::from_millis(5)), parent).unwrap(),
    );

    let result = executor.run(case).await;
    assert_success!(result.verdict());
    assert!(result.duration() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_panic_on_dedicated_thread_is_captured() {
    let executor = CaseExecutor::new(ExecutionContext::new());
    let case = Arc::new(
        case_of(method_panicking("explodes", "kaboom")).with_property(keys::REQUIRES_THREAD, true),
    );

    let result = executor.run(case).await;
    let failure = assert_failure!(result.verdict().clone(), FailureKind::UnexpectedFault);
    assert!(failure.fault().unwrap().is_panic());
}

#[tokio::test]
async fn test_skipped_run_states() {
    let executor = CaseExecutor::new(ExecutionContext::new());

    let ignored = Arc::new(case_of(method_panicking("a", "must not run")).with_run_state(
        RunState::Ignored {
            reason: "tracked elsewhere".into(),
        },
    ));
    let invalid = Arc::new(case_of(method_panicking("b", "must not run")).with_run_state(
        RunState::NotRunnable {
            reason: "wrong signature".into(),
        },
    ));
    let explicit =
        Arc::new(case_of(method_panicking("c", "must not run")).with_run_state(RunState::Explicit));

    let results = executor.run_all([ignored, invalid, explicit]).await;

    assert_skipped!(results[0].verdict(), SkipLabel::Ignored);
    assert_skipped!(results[1].verdict(), SkipLabel::Invalid);
    assert_skipped!(results[2].verdict(), SkipLabel::Explicit);
    assert!(results.iter().all(|r| r.affinity().is_none()));
}

#[tokio::test]
async fn test_ignored_case_reports_declared_reason() {
    let executor = CaseExecutor::new(ExecutionContext::new());
    let case = Arc::new(
        case_of(method_panicking("later", "must not run"))
            .with_property(keys::IGNORE_REASON, "needs a live database")
            .with_run_state(RunState::Ignored {
                reason: String::new(),
            }),
    );

    let result = executor.run(case).await;

    assert_matches!(
        result.verdict(),
        Verdict::Skipped(skip) if skip.reason() == "needs a live database"
    );
    assert_eq!(
        result.to_report_node().text(),
        Some("needs a live database")
    );
}

#[tokio::test]
async fn test_explicit_case_runs_when_selected() {
    let executor = CaseExecutor::new(ExecutionContext::new().with_explicit_cases(true));
    let case = Arc::new(case_of(method_passing("manual")).with_run_state(RunState::Explicit));

    let result = executor.run(case).await;
    assert_success!(result.verdict());
}

#[tokio::test]
async fn test_run_all_feeds_report_tree() {
    let executor = CaseExecutor::new(ExecutionContext::new());
    let cases = vec![
        Arc::new(case_of(method_returning("one", 1)).expecting_result(1)),
        Arc::new(case_of(method_returning("two", 3)).expecting_result(2)),
    ];

    let results = executor.run_all(cases).await;
    let mut suite = ReportNode::new(TEST_SUITE_ELEMENT);
    for result in &results {
        result.add_to_report(&mut suite, false);
    }

    let statuses: Vec<&str> = suite
        .children()
        .iter()
        .filter_map(|n| n.attribute("result"))
        .collect();
    assert_eq!(statuses, vec!["Passed", "Failed"]);
    assert_matches!(results[1].verdict(), Verdict::Failure(f) if f.kind() == FailureKind::ResultMismatch);
}
