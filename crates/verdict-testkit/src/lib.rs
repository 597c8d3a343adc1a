//! Verdict Testing Infrastructure
//!
//! Shared factories, proptest strategies and assertion macros for the
//! Verdict crates' integration tests.
//!
//! # Usage
//!
//! ```rust,no_run
//! use verdict_testkit::*;
//!
//! #[test]
//! fn my_test() {
//!     let case = case_in("app.tests.Fixture", method_returning("answer", 42))
//!         .expecting_result(42);
//!     assert_success!(case.execute());
//! }
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod assertions;
pub mod factories;
pub mod strategies;

pub use factories::*;

use tracing_subscriber::EnvFilter;

/// Install a subscriber that writes through the test harness
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
