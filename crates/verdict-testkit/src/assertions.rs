//! Assertion macros for verdicts

/// Assert that a verdict is a pass
#[macro_export]
macro_rules! assert_success {
    ($verdict:expr) => {
        match &$verdict {
            ::verdict_case::Verdict::Success => {}
            other => panic!("Expected success, got {:?}", other),
        }
    };
}

/// Assert that a verdict failed with the given kind, returning the failure
#[macro_export]
macro_rules! assert_failure {
    ($verdict:expr, $kind:expr) => {
        match $verdict {
            ::verdict_case::Verdict::Failure(failure) => {
                assert_eq!(
                    failure.kind(),
                    $kind,
                    "Unexpected failure kind, message: {}",
                    failure.message()
                );
                failure
            }
            other => panic!("Expected {:?} failure, got {:?}", $kind, other),
        }
    };
}

/// Assert that a verdict was skipped with the given label
#[macro_export]
macro_rules! assert_skipped {
    ($verdict:expr, $label:expr) => {
        match &$verdict {
            ::verdict_case::Verdict::Skipped(skip) => assert_eq!(skip.label(), $label),
            other => panic!("Expected skip, got {:?}", other),
        }
    };
}
