//! Thread affinity: cascading timeout lookup and isolation decisions

#![allow(clippy::unwrap_used)]

use std::time::Duration;
use verdict_case::{affinity, ExecutionStrategy, TestCase, TimeoutSource};
use verdict_core::properties::keys;
use verdict_core::{ExecutionContext, PropertyBag};
use verdict_testkit::*;

fn case_under(parent_props: PropertyBag) -> TestCase {
    TestCase::new(method_passing("runs"), fixture_with("app.Fixture", parent_props)).unwrap()
}

#[test]
fn test_no_timeout_anywhere_is_shared() {
    let case = case_under(PropertyBag::new());
    let affinity = case.thread_affinity(&ExecutionContext::new());

    assert!(!affinity.isolate());
    assert_eq!(affinity.strategy(), ExecutionStrategy::Shared);
    assert_eq!(affinity.timeout(), None);
    assert_eq!(affinity.timeout_source(), TimeoutSource::Context);
}

#[test]
fn test_parent_timeout_isolates() {
    let case = case_under(PropertyBag::new().with(keys::TIMEOUT, 500));
    let affinity = case.thread_affinity(&ExecutionContext::new());

    assert!(affinity.isolate());
    assert_eq!(affinity.timeout(), Some(Duration::from_millis(500)));
    assert_eq!(affinity.timeout_source(), TimeoutSource::Parent);
}

#[test]
fn test_explicit_zero_overrides_parent() {
    let case = case_under(PropertyBag::new().with(keys::TIMEOUT, 500)).with_property(keys::TIMEOUT, 0);
    let affinity = case.thread_affinity(&ExecutionContext::new());

    assert!(!affinity.isolate());
    assert_eq!(affinity.timeout_source(), TimeoutSource::Case);
    assert!(!case.requires_dedicated_thread(&ExecutionContext::new()));
}

#[test]
fn test_case_timeout_wins_over_parent_and_context() {
    let case = case_under(PropertyBag::new().with(keys::TIMEOUT, 500)).with_property(keys::TIMEOUT, 20);
    let ctx = ExecutionContext::new().with_default_timeout_ms(9000);
    let affinity = case.thread_affinity(&ctx);

    assert_eq!(affinity.timeout(), Some(Duration::from_millis(20)));
    assert_eq!(affinity.timeout_source(), TimeoutSource::Case);
}

#[test]
fn test_parent_zero_overrides_context_default() {
    let case = case_under(PropertyBag::new().with(keys::TIMEOUT, 0));
    let ctx = ExecutionContext::new().with_default_timeout_ms(9000);
    assert!(!case.requires_dedicated_thread(&ctx));
}

#[test]
fn test_context_default_isolates() {
    let case = case_under(PropertyBag::new());
    let ctx = ExecutionContext::new().with_default_timeout_ms(250);
    assert!(case.requires_dedicated_thread(&ctx));
}

#[test]
fn test_requires_thread_on_parent_isolates_without_timeout() {
    let case = case_under(PropertyBag::new().with(keys::REQUIRES_THREAD, true));
    let affinity = case.thread_affinity(&ExecutionContext::new());

    assert!(affinity.required_by_policy());
    assert_eq!(affinity.strategy(), ExecutionStrategy::Dedicated { timeout: None });
}

#[test]
fn test_requires_thread_keeps_resolved_bound() {
    let case = case_under(PropertyBag::new().with(keys::TIMEOUT, 75))
        .with_property(keys::REQUIRES_THREAD, true);
    let affinity = case.thread_affinity(&ExecutionContext::new());
    assert_eq!(affinity.timeout(), Some(Duration::from_millis(75)));
}

#[test]
fn test_resolve_timeout_reports_raw_value() {
    let case = case_under(PropertyBag::new()).with_property(keys::TIMEOUT, -10);
    assert_eq!(
        affinity::resolve_timeout(&case, &ExecutionContext::new()),
        (-10, TimeoutSource::Case)
    );
}
