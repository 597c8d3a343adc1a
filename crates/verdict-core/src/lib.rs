//! Verdict Core - foundation types for the Verdict test engine
//!
//! This crate holds everything the case machinery shares with the outside
//! world but does not itself decide:
//!
//! - `VerdictError`: construction and configuration errors
//! - `RunnerConfig`: layered configuration (defaults, TOML, environment)
//! - `ExecutionContext` / `ParentInfo`: the explicit ambient context and
//!   ancestor property lookup
//! - `PropertyBag`: declared properties such as `Timeout`
//! - `ReportNode`: the generic, recursively composable report tree

#![forbid(unsafe_code)]

/// Layered runner configuration
pub mod config;

/// Execution context and ancestor information
pub mod context;

/// Unified error handling
pub mod errors;

/// Tracing subscriber setup
pub mod logging;

/// Declared property bags
pub mod properties;

/// Generic report tree
pub mod report;

pub use config::RunnerConfig;
pub use context::{ExecutionContext, ParentInfo};
pub use errors::{Result, VerdictError};
pub use properties::{keys, PropertyBag, PropertyValue};
pub use report::{ReportNode, TEST_CASE_ELEMENT, TEST_RUN_ELEMENT, TEST_SUITE_ELEMENT};
