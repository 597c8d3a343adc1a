//! Runner configuration
//!
//! Configuration is layered: defaults, then a TOML file, then `VERDICT_*`
//! environment variables, then individual `key=value` overrides. The
//! result is validated and turned into an [`ExecutionContext`].

use crate::context::{ExecutionContext, DEFAULT_THREAD_NAME_PREFIX};
use crate::errors::{Result, VerdictError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "VERDICT_";

/// Default tracing filter
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration for a case runner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Ambient default case timeout in milliseconds (0 disables)
    pub default_timeout_ms: i64,
    /// Run cases marked explicit
    pub include_explicit: bool,
    /// Prefix used to name dedicated case threads
    pub thread_name_prefix: String,
    /// Tracing filter directive
    pub log_filter: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 0,
            include_explicit: false,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl RunnerConfig {
    /// Default configuration values
    pub fn defaults() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            VerdictError::io(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: Self = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded runner config");
        Ok(config)
    }

    /// Apply `VERDICT_*` environment variables
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply overrides from an iterator of `(name, value)` pairs
    ///
    /// Only names carrying [`ENV_PREFIX`] are considered; unknown keys are
    /// ignored so unrelated variables sharing the prefix do not break runs.
    pub fn merge_with_vars<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let Some(key) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let key = key.to_lowercase();
            if Self::is_known_key(&key) {
                self.set_from_string(&key, &value)?;
            } else {
                tracing::trace!(variable = %name, "Ignoring unknown config variable");
            }
        }
        Ok(())
    }

    /// Merge with another configuration
    ///
    /// Fields of `other` that differ from the defaults take precedence.
    pub fn merge_with(&mut self, other: &Self) {
        let defaults = Self::default();
        if other.default_timeout_ms != defaults.default_timeout_ms {
            self.default_timeout_ms = other.default_timeout_ms;
        }
        if other.include_explicit != defaults.include_explicit {
            self.include_explicit = other.include_explicit;
        }
        if other.thread_name_prefix != defaults.thread_name_prefix {
            self.thread_name_prefix.clone_from(&other.thread_name_prefix);
        }
        if other.log_filter != defaults.log_filter {
            self.log_filter.clone_from(&other.log_filter);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.thread_name_prefix.trim().is_empty() {
            return Err(VerdictError::config("thread_name_prefix must not be empty"));
        }
        if self.thread_name_prefix.contains('\0') {
            return Err(VerdictError::config(
                "thread_name_prefix must not contain NUL bytes",
            ));
        }
        if self.log_filter.trim().is_empty() {
            return Err(VerdictError::config("log_filter must not be empty"));
        }
        Ok(())
    }

    /// Set a configuration value from a string (for CLI parsing)
    pub fn set_from_string(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "default_timeout_ms" => {
                self.default_timeout_ms = value.trim().parse().map_err(|e| {
                    VerdictError::config(format!("default_timeout_ms: invalid integer {value:?}: {e}"))
                })?;
            }
            "include_explicit" => {
                self.include_explicit = value.trim().parse().map_err(|e| {
                    VerdictError::config(format!("include_explicit: invalid boolean {value:?}: {e}"))
                })?;
            }
            "thread_name_prefix" => self.thread_name_prefix = value.to_string(),
            "log_filter" => self.log_filter = value.to_string(),
            other => {
                return Err(VerdictError::config(format!("unknown config key {other:?}")));
            }
        }
        Ok(())
    }

    /// Validate and build the execution context for a run
    pub fn into_context(self) -> Result<ExecutionContext> {
        self.validate()?;
        Ok(ExecutionContext::new()
            .with_default_timeout_ms(self.default_timeout_ms)
            .with_explicit_cases(self.include_explicit)
            .with_thread_name_prefix(self.thread_name_prefix))
    }

    /// Install the global tracing subscriber using `log_filter`
    pub fn init_logging(&self) -> bool {
        crate::logging::init_tracing(&self.log_filter)
    }

    fn is_known_key(key: &str) -> bool {
        matches!(
            key,
            "default_timeout_ms" | "include_explicit" | "thread_name_prefix" | "log_filter"
        )
    }
}
