//! Outcome evaluation
//!
//! Turns the raw outcome of invoking a case's method into a [`Verdict`] by
//! checking it against the case's declared expectation: an expected fault
//! (type, message, match mode) or an expected return value.
//!
//! Evaluation never propagates faults. Anything raised by the method, by
//! the alternate handler or by a custom result comparer ends up inside the
//! verdict.

use crate::descriptor::TestCase;
use crate::fault::{guarded, Fault};
use crate::method::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Raw outcomes and verdicts
// ─────────────────────────────────────────────────────────────────────────────

/// What happened when the method ran
#[derive(Debug, Clone)]
pub enum RawOutcome {
    /// The method returned a value
    Returned(Value),
    /// The method raised a fault
    Raised(Fault),
    /// The alternate handler consumed a fault
    Handled,
}

/// Classification of a failed verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Wrong fault, missing fault, or a fault where none was expected
    UnexpectedFault,
    /// Returned value differs from the expected result
    ResultMismatch,
    /// The case ran past its timeout on a dedicated thread
    TimeoutExceeded,
    /// Comparing observed against expected itself failed
    EvaluationError,
}

impl FailureKind {
    /// Stable identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnexpectedFault => "UnexpectedFault",
            Self::ResultMismatch => "ResultMismatch",
            Self::TimeoutExceeded => "TimeoutExceeded",
            Self::EvaluationError => "EvaluationError",
        }
    }

    /// Report label separating assertion failures from timeouts and errors
    pub fn label(&self) -> &'static str {
        match self {
            Self::UnexpectedFault | Self::ResultMismatch => "Failure",
            Self::TimeoutExceeded => "Timeout",
            Self::EvaluationError => "Error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Details of a failed verdict
#[derive(Debug, Clone)]
pub struct Failure {
    kind: FailureKind,
    message: String,
    fault: Option<Fault>,
    secondary: Option<Fault>,
}

impl Failure {
    /// Failure classification
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Human readable explanation
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Fault raised by the method under test, if any
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    /// Fault raised while evaluating, kept for diagnostics
    pub fn secondary_fault(&self) -> Option<&Fault> {
        self.secondary.as_ref()
    }
}

/// Why a case was not run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipLabel {
    /// Marked ignored
    Ignored,
    /// Could not be run as declared
    Invalid,
    /// Explicit case not selected for this run
    Explicit,
}

impl SkipLabel {
    /// Report label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ignored => "Ignored",
            Self::Invalid => "Invalid",
            Self::Explicit => "Explicit",
        }
    }
}

/// A case that was not run
#[derive(Debug, Clone)]
pub struct Skip {
    label: SkipLabel,
    reason: String,
}

impl Skip {
    /// Create a skip record
    pub fn new(label: SkipLabel, reason: impl Into<String>) -> Self {
        Self {
            label,
            reason: reason.into(),
        }
    }

    /// Skip label
    pub fn label(&self) -> SkipLabel {
        self.label
    }

    /// Why the case was skipped
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Outcome of a case after evaluation
#[derive(Debug, Clone)]
pub enum Verdict {
    /// Observed behavior satisfied the declared expectation
    Success,
    /// Observed behavior violated the declared expectation
    Failure(Failure),
    /// The case was not run
    Skipped(Skip),
}

impl Verdict {
    /// Failure without an associated fault
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure(Failure {
            kind,
            message: message.into(),
            fault: None,
            secondary: None,
        })
    }

    /// Failure carrying the fault the method raised
    pub fn failure_with_fault(kind: FailureKind, message: impl Into<String>, fault: Fault) -> Self {
        Self::Failure(Failure {
            kind,
            message: message.into(),
            fault: Some(fault),
            secondary: None,
        })
    }

    /// Evaluation error preserving the secondary fault
    pub fn evaluation_error(
        message: impl Into<String>,
        fault: Option<Fault>,
        secondary: Fault,
    ) -> Self {
        Self::Failure(Failure {
            kind: FailureKind::EvaluationError,
            message: message.into(),
            fault,
            secondary: Some(secondary),
        })
    }

    /// Timeout on a dedicated thread
    pub fn timeout(limit: Duration) -> Self {
        Self::failure(
            FailureKind::TimeoutExceeded,
            format!("Test exceeded Timeout value of {}ms", limit.as_millis()),
        )
    }

    /// Whether the verdict is a pass
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Whether the verdict is a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Failure details
    pub fn as_failure(&self) -> Option<&Failure> {
        match self {
            Self::Failure(failure) => Some(failure),
            _ => None,
        }
    }

    /// Failure classification, if failed
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.as_failure().map(Failure::kind)
    }

    /// Result status as reported
    pub fn status(&self) -> &'static str {
        match self {
            Self::Success => "Passed",
            Self::Failure(_) => "Failed",
            Self::Skipped(_) => "Skipped",
        }
    }

    /// Sub-classification label, absent for passes
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Self::Success => None,
            Self::Failure(failure) => Some(failure.kind.label()),
            Self::Skipped(skip) => Some(skip.label.as_str()),
        }
    }

    /// Message shown to the user, absent for passes
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Failure(failure) => Some(&failure.message),
            Self::Skipped(skip) => Some(&skip.reason),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Expectation building blocks
// ─────────────────────────────────────────────────────────────────────────────

/// How an expected fault message is compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// String equality
    #[default]
    Exact,
    /// Expected text is a substring of the message
    Contains,
    /// Message starts with the expected text
    StartsWith,
    /// Expected text is a regular expression searched in the whole message
    Regex,
}

impl MatchMode {
    /// Compare `actual` against `expected`
    ///
    /// Only `Regex` can fail, when the pattern does not compile.
    pub fn matches(&self, expected: &str, actual: &str) -> Result<bool, regex::Error> {
        Ok(match self {
            Self::Exact => actual == expected,
            Self::Contains => actual.contains(expected),
            Self::StartsWith => actual.starts_with(expected),
            Self::Regex => regex::Regex::new(expected)?.is_match(actual),
        })
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Exact => "equal to",
            Self::Contains => "containing",
            Self::StartsWith => "starting with",
            Self::Regex => "matching",
        }
    }
}

type ComparerBody = Arc<dyn Fn(&Value, &Value) -> Result<bool, Fault> + Send + Sync>;

/// Custom equality used in place of value equality for expected results
#[derive(Clone)]
pub struct ResultComparer {
    name: String,
    body: ComparerBody,
}

impl ResultComparer {
    /// Create a comparer; arguments are `(expected, actual)`
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<bool, Fault> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Arc::new(body),
        }
    }

    /// Comparer name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compare, turning a panic into a fault
    pub fn compare(&self, expected: &Value, actual: &Value) -> Result<bool, Fault> {
        guarded(|| (self.body)(expected, actual))
    }
}

impl fmt::Debug for ResultComparer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultComparer")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Value equality used for expected results
///
/// Numbers compare by numeric value, so `42` equals `42.0`. Arrays and
/// objects compare element-wise with the same rule.
pub fn values_equal(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(lhs), Value::Number(rhs)) => {
            if let (Some(a), Some(b)) = (lhs.as_i64(), rhs.as_i64()) {
                a == b
            } else if let (Some(a), Some(b)) = (lhs.as_u64(), rhs.as_u64()) {
                a == b
            } else {
                match (lhs.as_f64(), rhs.as_f64()) {
                    (Some(a), Some(b)) => a == b,
                    _ => lhs == rhs,
                }
            }
        }
        (Value::Array(lhs), Value::Array(rhs)) => {
            lhs.len() == rhs.len() && lhs.iter().zip(rhs).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(lhs), Value::Object(rhs)) => {
            lhs.len() == rhs.len()
                && lhs
                    .iter()
                    .all(|(key, a)| rhs.get(key).is_some_and(|b| values_equal(a, b)))
        }
        _ => expected == actual,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Evaluation
// ─────────────────────────────────────────────────────────────────────────────

/// Whether the alternate handler may still be consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    First,
    AfterHandler,
}

/// Evaluate a raw outcome against the case's expectation
pub fn evaluate(case: &TestCase, outcome: RawOutcome) -> Verdict {
    let verdict = evaluate_pass(case, outcome, Pass::First);
    match &verdict {
        Verdict::Failure(failure) => tracing::debug!(
            case = %case.full_name(),
            kind = ?failure.kind(),
            "Case failed evaluation"
        ),
        _ => tracing::trace!(case = %case.full_name(), status = verdict.status(), "Case evaluated"),
    }
    verdict
}

fn evaluate_pass(case: &TestCase, outcome: RawOutcome, pass: Pass) -> Verdict {
    match outcome {
        RawOutcome::Handled => Verdict::Success,
        RawOutcome::Raised(fault) if pass == Pass::AfterHandler => {
            let handler = case.alternate_handler().map_or("<none>", |h| h.name());
            Verdict::evaluation_error(
                format!("error during evaluation: alternate handler {handler} raised {fault}"),
                None,
                fault,
            )
        }
        RawOutcome::Raised(fault) => {
            if let Some(handler) = case.alternate_handler() {
                tracing::debug!(
                    case = %case.full_name(),
                    handler = handler.name(),
                    fault = %fault,
                    "Routing fault to alternate handler"
                );
                let next = handler.invoke(&fault);
                return evaluate_pass(case, next, Pass::AfterHandler);
            }
            if !case.exception_expected() {
                return Verdict::failure_with_fault(
                    FailureKind::UnexpectedFault,
                    format!("unexpected exception raised: {fault}"),
                    fault,
                );
            }
            check_fault(case, fault)
        }
        RawOutcome::Returned(value) => {
            if case.exception_expected() {
                let message = match case.expected_fault_type() {
                    Some(expected) => format!("expected exception not thrown: {expected} was expected"),
                    None => "expected exception not thrown".to_string(),
                };
                return Verdict::failure(FailureKind::UnexpectedFault, message);
            }
            check_result(case, &value)
        }
    }
}

fn check_fault(case: &TestCase, fault: Fault) -> Verdict {
    if let Some(expected) = case.expected_fault_type() {
        if !expected.matches(fault.fault_type()) {
            let message = format!(
                "An unexpected exception type was thrown\n  Expected: {}\n  but was:  {}: {}",
                expected.name(),
                fault.type_name(),
                fault.message()
            );
            return Verdict::failure_with_fault(FailureKind::UnexpectedFault, message, fault);
        }
    }

    let Some(expected_message) = case.expected_message() else {
        return Verdict::Success;
    };
    let mode = case.match_mode();
    match mode.matches(expected_message, fault.message()) {
        Ok(true) => Verdict::Success,
        Ok(false) => {
            let message = match case.expected_user_message() {
                Some(user_message) => {
                    format!("{user_message}\n  but was:  \"{}\"", fault.message())
                }
                None => format!(
                    "The exception message text was incorrect\n  Expected: {} \"{}\"\n  but was:  \"{}\"",
                    mode.describe(),
                    expected_message,
                    fault.message()
                ),
            };
            Verdict::failure_with_fault(FailureKind::UnexpectedFault, message, fault)
        }
        Err(err) => Verdict::evaluation_error(
            format!("error during evaluation: invalid message pattern {expected_message:?}"),
            Some(fault),
            Fault::from_error(err),
        ),
    }
}

fn check_result(case: &TestCase, actual: &Value) -> Verdict {
    let Some(expected) = case.expected_result() else {
        return Verdict::Success;
    };

    let compared = match case.result_comparer() {
        Some(comparer) => comparer.compare(expected, actual).map_err(|secondary| {
            Verdict::evaluation_error(
                format!(
                    "error during evaluation: result comparer {} raised {secondary}",
                    comparer.name()
                ),
                None,
                secondary,
            )
        }),
        None => Ok(values_equal(expected, actual)),
    };

    match compared {
        Ok(true) => Verdict::Success,
        Ok(false) => Verdict::failure(
            FailureKind::ResultMismatch,
            format!("expected result {expected}, got {actual}"),
        ),
        Err(verdict) => verdict,
    }
}
