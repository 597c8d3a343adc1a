//! Case execution
//!
//! Cases run on tokio's shared blocking pool unless their thread affinity
//! asks for isolation. Isolated cases get a freshly spawned thread; the
//! caller waits for its verdict or for the timeout, whichever comes first.
//! A timed-out thread is abandoned, not killed: it keeps running until the
//! method returns on its own, and its eventual verdict is discarded.

use crate::affinity::ExecutionStrategy;
use crate::descriptor::{RunState, TestCase};
use crate::evaluation::{Skip, SkipLabel, Verdict};
use crate::fault::Fault;
use crate::result::CaseResult;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use verdict_core::ExecutionContext;

/// Failures of the dedicated-thread machinery itself
#[derive(Debug, thiserror::Error)]
enum IsolationError {
    #[error("failed to spawn dedicated thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("dedicated thread exited without reporting a verdict")]
    Disconnected,

    #[error("test exceeded timeout of {}ms", .0.as_millis())]
    TimedOut(Duration),
}

/// Runs cases under an execution context
#[derive(Debug, Clone, Default)]
pub struct CaseExecutor {
    context: ExecutionContext,
}

impl CaseExecutor {
    /// Create an executor for a run
    pub fn new(context: ExecutionContext) -> Self {
        Self { context }
    }

    /// Context shared by every case this executor runs
    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Run one case to a result
    pub async fn run(&self, case: Arc<TestCase>) -> CaseResult {
        if let Some(skip) = self.skip_reason(&case) {
            tracing::info!(
                case = %case.full_name(),
                label = skip.label().as_str(),
                reason = skip.reason(),
                "Skipping case"
            );
            return case.make_result(Verdict::Skipped(skip));
        }

        let affinity = case.thread_affinity(&self.context);
        let start_time = Utc::now();
        let clock = Instant::now();

        let verdict = match affinity.strategy() {
            ExecutionStrategy::Shared => self.run_shared(Arc::clone(&case)).await,
            ExecutionStrategy::Dedicated { timeout } => {
                match self.run_dedicated(Arc::clone(&case), timeout).await {
                    Ok(verdict) => verdict,
                    Err(IsolationError::TimedOut(limit)) => {
                        tracing::warn!(
                            case = %case.full_name(),
                            timeout_ms = limit.as_millis() as u64,
                            "Case timed out, abandoning dedicated thread"
                        );
                        Verdict::timeout(limit)
                    }
                    Err(err) => Verdict::evaluation_error(
                        format!("error during execution: {err}"),
                        None,
                        Fault::from_error(err),
                    ),
                }
            }
        };

        let duration = clock.elapsed();
        tracing::debug!(
            case = %case.full_name(),
            status = verdict.status(),
            isolated = affinity.isolate(),
            duration_ms = duration.as_millis() as u64,
            "Case finished"
        );

        case.make_result(verdict)
            .with_timing(start_time, Utc::now(), duration)
            .with_affinity(affinity)
    }

    /// Run several cases one after another
    pub async fn run_all<I>(&self, cases: I) -> Vec<CaseResult>
    where
        I: IntoIterator<Item = Arc<TestCase>>,
    {
        let mut results = Vec::new();
        for case in cases {
            results.push(self.run(case).await);
        }
        results
    }

    fn skip_reason(&self, case: &TestCase) -> Option<Skip> {
        match case.run_state() {
            RunState::Runnable => None,
            RunState::Ignored { .. } => Some(Skip::new(
                SkipLabel::Ignored,
                case.run_state_reason().unwrap_or_default(),
            )),
            RunState::NotRunnable { reason } => {
                Some(Skip::new(SkipLabel::Invalid, reason.as_str()))
            }
            RunState::Explicit if self.context.include_explicit() => None,
            RunState::Explicit => Some(Skip::new(
                SkipLabel::Explicit,
                "explicit case not selected for this run",
            )),
        }
    }

    async fn run_shared(&self, case: Arc<TestCase>) -> Verdict {
        match tokio::task::spawn_blocking(move || case.execute()).await {
            Ok(verdict) => verdict,
            Err(join_err) => Verdict::evaluation_error(
                format!("error during execution: shared worker failed: {join_err}"),
                None,
                Fault::from_error(join_err),
            ),
        }
    }

    async fn run_dedicated(
        &self,
        case: Arc<TestCase>,
        timeout: Option<Duration>,
    ) -> Result<Verdict, IsolationError> {
        let (tx, rx) = oneshot::channel();
        // Interior NUL makes `Builder::spawn` panic.
        let thread_name = format!("{}:{}", self.context.thread_name_prefix(), case.name())
            .replace('\0', "");

        tracing::trace!(case = %case.full_name(), thread = %thread_name, "Spawning dedicated thread");
        // Dropping the join handle detaches the thread; timed-out work is abandoned.
        std::thread::Builder::new()
            .name(thread_name)
            .spawn(move || {
                let _ = tx.send(case.execute());
            })?;

        match timeout {
            Some(limit) => match tokio::time::timeout(limit, rx).await {
                Ok(received) => received.map_err(|_| IsolationError::Disconnected),
                Err(_) => Err(IsolationError::TimedOut(limit)),
            },
            None => rx.await.map_err(|_| IsolationError::Disconnected),
        }
    }
}
