//! Verdict Case - the per-test execution descriptor
//!
//! A [`TestCase`] wraps one discovered test method together with its
//! expectation contract. The crate answers three questions about it:
//!
//! - did the observed outcome satisfy the expectation? ([`evaluate`])
//! - must the case run on its own thread? ([`affinity::resolve`])
//! - what does its result look like in the report tree?
//!   ([`CaseResult::add_to_report`])
//!
//! [`CaseExecutor`] ties these together for a runner.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use verdict_case::{CaseExecutor, MethodRef, TestCase, TypeName};
//! use verdict_core::{ExecutionContext, ParentInfo, ReportNode};
//!
//! # async fn run() -> verdict_core::Result<()> {
//! let parent = ParentInfo::from_full_name("app.tests.MathFixture")?.shared();
//! let method = MethodRef::from_result("answer", TypeName::new("app::tests::MathFixture"), || {
//!     Ok::<_, std::io::Error>(42)
//! });
//! let case = TestCase::new(method, parent)?.expecting_result(42);
//!
//! let executor = CaseExecutor::new(ExecutionContext::new());
//! let result = executor.run(Arc::new(case)).await;
//!
//! let mut root = ReportNode::run_root();
//! result.add_to_report(&mut root, false);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

/// Thread affinity policy
pub mod affinity;

/// Test case descriptor and tree surface
pub mod descriptor;

/// Outcome evaluation contract
pub mod evaluation;

/// Case execution on shared and dedicated threads
pub mod executor;

/// Faults raised by methods under test
pub mod fault;

/// Method references and alternate handlers
pub mod method;

/// Case results and report nodes
pub mod result;

pub use affinity::{ExecutionStrategy, IsolationPolicy, ThreadAffinity, TimeoutSource};
pub use descriptor::{CaseId, RunState, TestCase, TestNode};
pub use evaluation::{
    evaluate, values_equal, Failure, FailureKind, MatchMode, RawOutcome, ResultComparer, Skip,
    SkipLabel, Verdict,
};
pub use executor::CaseExecutor;
pub use fault::{Fault, FaultType, PANIC_FAULT_TYPE};
pub use method::{AlternateHandler, MethodRef, TypeName, Value};
pub use result::CaseResult;
