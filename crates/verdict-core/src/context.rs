//! Execution context threaded through case operations
//!
//! The context is an explicit, immutable value. Many cases read it at the
//! same time, so it is `Send + Sync` and never mutated while a run is in
//! progress. Ancestor properties are reached through [`ParentInfo`], which
//! every case holds a shared handle to.

use crate::errors::{Result, VerdictError};
use crate::properties::PropertyBag;
use std::sync::Arc;
use std::time::Duration;

/// Default prefix used when naming dedicated case threads
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "verdict-case";

/// The owning fixture of a case, as the case sees it
#[derive(Debug, Clone, PartialEq)]
pub struct ParentInfo {
    name: String,
    full_name: String,
    properties: PropertyBag,
}

impl ParentInfo {
    /// Create parent information for a fixture
    ///
    /// The full name must be non-empty: every case full name is prefixed
    /// with it.
    pub fn new(name: impl Into<String>, full_name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let full_name = full_name.into();
        if full_name.trim().is_empty() {
            return Err(VerdictError::invalid_argument(
                "fixture full name must not be empty",
            ));
        }
        Ok(Self {
            name,
            full_name,
            properties: PropertyBag::new(),
        })
    }

    /// Create parent information from a dotted full name
    ///
    /// The simple name is the last segment.
    pub fn from_full_name(full_name: impl Into<String>) -> Result<Self> {
        let full_name = full_name.into();
        let name = full_name
            .rsplit('.')
            .next()
            .unwrap_or(full_name.as_str())
            .to_string();
        Self::new(name, full_name)
    }

    /// Attach declared properties
    pub fn with_properties(mut self, properties: PropertyBag) -> Self {
        self.properties = properties;
        self
    }

    /// Wrap in a shared handle
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Simple name of the fixture
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full name of the fixture
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Properties declared on the fixture
    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }
}

/// Ambient state for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    default_timeout_ms: i64,
    include_explicit: bool,
    thread_name_prefix: String,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            default_timeout_ms: 0,
            include_explicit: false,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl ExecutionContext {
    /// Context with no ambient timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ambient default case timeout in milliseconds
    ///
    /// Zero or a negative value means no timeout.
    pub fn with_default_timeout_ms(mut self, timeout_ms: i64) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }

    /// Allow cases marked explicit to run
    pub fn with_explicit_cases(mut self, include: bool) -> Self {
        self.include_explicit = include;
        self
    }

    /// Prefix for dedicated thread names
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Ambient default case timeout in milliseconds
    pub fn default_timeout_ms(&self) -> i64 {
        self.default_timeout_ms
    }

    /// Ambient default case timeout, if positive
    pub fn default_timeout(&self) -> Option<Duration> {
        u64::try_from(self.default_timeout_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Whether explicit cases are included in this run
    pub fn include_explicit(&self) -> bool {
        self.include_explicit
    }

    /// Prefix for dedicated thread names
    pub fn thread_name_prefix(&self) -> &str {
        &self.thread_name_prefix
    }
}
