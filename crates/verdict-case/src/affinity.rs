//! Thread affinity
//!
//! Decides whether a case runs on the shared worker pool or on a dedicated
//! thread of its own. A positive timeout can only be enforced by running
//! the case somewhere the caller can walk away from, so any positive
//! timeout selects a dedicated thread.
//!
//! Timeout lookup cascades from the case's own properties to its parent's
//! and finally to the execution context default. The first declared value
//! wins, including an explicit zero.

use crate::descriptor::TestCase;
use std::time::Duration;
use verdict_core::properties::keys;
use verdict_core::{ExecutionContext, PropertyBag};

/// Base-level isolation rule consulted before any timeout lookup
pub trait IsolationPolicy {
    /// Whether the case must be isolated regardless of timeouts
    fn requires_isolation(&self, case: &TestCase) -> bool;
}

/// Honors a `RequiresThread` property on the case or its parent
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiresThreadProperty;

impl IsolationPolicy for RequiresThreadProperty {
    fn requires_isolation(&self, case: &TestCase) -> bool {
        case.properties()
            .get_bool(keys::REQUIRES_THREAD)
            .or_else(|| case.parent().properties().get_bool(keys::REQUIRES_THREAD))
            .unwrap_or(false)
    }
}

/// Where a resolved timeout came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutSource {
    /// Declared on the case
    Case,
    /// Declared on the parent fixture
    Parent,
    /// Ambient context default
    Context,
}

/// How a case is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Run on the shared worker pool, unbounded
    Shared,
    /// Run on a thread spawned for this case alone
    Dedicated {
        /// Bound after which the caller abandons the thread
        timeout: Option<Duration>,
    },
}

/// Result of the affinity decision for one case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    strategy: ExecutionStrategy,
    timeout_ms: i64,
    timeout_source: TimeoutSource,
    required_by_policy: bool,
}

impl ThreadAffinity {
    /// Scheduling strategy
    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// Whether the case runs on a dedicated thread
    pub fn isolate(&self) -> bool {
        matches!(self.strategy, ExecutionStrategy::Dedicated { .. })
    }

    /// Enforced bound, if any
    pub fn timeout(&self) -> Option<Duration> {
        match self.strategy {
            ExecutionStrategy::Dedicated { timeout } => timeout,
            ExecutionStrategy::Shared => None,
        }
    }

    /// Resolved timeout value as declared, in milliseconds
    pub fn timeout_ms(&self) -> i64 {
        self.timeout_ms
    }

    /// Where the timeout value came from
    pub fn timeout_source(&self) -> TimeoutSource {
        self.timeout_source
    }

    /// Whether the base policy forced isolation
    pub fn required_by_policy(&self) -> bool {
        self.required_by_policy
    }
}

/// Resolve the timeout for a case: case, then parent, then context
pub fn resolve_timeout(case: &TestCase, ctx: &ExecutionContext) -> (i64, TimeoutSource) {
    if let Some(ms) = declared_timeout(case.properties(), case.full_name()) {
        return (ms, TimeoutSource::Case);
    }
    if let Some(ms) = declared_timeout(case.parent().properties(), case.parent().full_name()) {
        return (ms, TimeoutSource::Parent);
    }
    (ctx.default_timeout_ms(), TimeoutSource::Context)
}

fn declared_timeout(properties: &PropertyBag, owner: &str) -> Option<i64> {
    let value = properties.get(keys::TIMEOUT)?;
    let ms = value.as_int();
    if ms.is_none() {
        tracing::warn!(owner, value = %value, "Ignoring non-integer Timeout property");
    }
    ms
}

/// Decide affinity using the `RequiresThread` base policy
pub fn resolve(case: &TestCase, ctx: &ExecutionContext) -> ThreadAffinity {
    resolve_with(case, ctx, &RequiresThreadProperty)
}

/// Decide affinity with a caller-supplied base policy
pub fn resolve_with(
    case: &TestCase,
    ctx: &ExecutionContext,
    policy: &dyn IsolationPolicy,
) -> ThreadAffinity {
    let (timeout_ms, timeout_source) = resolve_timeout(case, ctx);
    let bound = u64::try_from(timeout_ms)
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis);
    let required_by_policy = policy.requires_isolation(case);

    let strategy = if required_by_policy || bound.is_some() {
        ExecutionStrategy::Dedicated { timeout: bound }
    } else {
        ExecutionStrategy::Shared
    };

    tracing::trace!(
        case = %case.full_name(),
        timeout_ms,
        source = ?timeout_source,
        required_by_policy,
        ?strategy,
        "Resolved thread affinity"
    );

    ThreadAffinity {
        strategy,
        timeout_ms,
        timeout_source,
        required_by_policy,
    }
}
