//! Faults raised by methods under test
//!
//! A fault is the Rust-side picture of "the test threw": an error value
//! returned from the method, or a panic caught around it. Fault types are
//! identified by `TypeId` when the concrete type is known at compile time
//! and by fully-qualified name otherwise, so expectations written against a
//! type name still match faults that arrive from outside the crate graph.

use std::any::{Any, TypeId};
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Type name given to faults produced by a caught panic
pub const PANIC_FAULT_TYPE: &str = "panic";

/// Identity of a fault type
#[derive(Debug, Clone)]
pub struct FaultType {
    id: Option<TypeId>,
    name: String,
}

impl FaultType {
    /// Statically known fault type
    pub fn of<E: 'static>() -> Self {
        Self {
            id: Some(TypeId::of::<E>()),
            name: std::any::type_name::<E>().to_string(),
        }
    }

    /// Fault type known only by its fully-qualified name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    /// Fully-qualified type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the static type identity is available
    pub fn is_static(&self) -> bool {
        self.id.is_some()
    }

    /// Exact type equality
    ///
    /// Compares `TypeId`s when both sides have one, names otherwise.
    pub fn matches(&self, other: &FaultType) -> bool {
        match (self.id, other.id) {
            (Some(lhs), Some(rhs)) => lhs == rhs,
            _ => self.name == other.name,
        }
    }
}

impl fmt::Display for FaultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A fault observed while running a case
#[derive(Clone)]
pub struct Fault {
    fault_type: FaultType,
    message: String,
    source: Option<Arc<dyn Error + Send + Sync>>,
}

impl Fault {
    /// Create a fault from its parts
    pub fn new(fault_type: FaultType, message: impl Into<String>) -> Self {
        Self {
            fault_type,
            message: message.into(),
            source: None,
        }
    }

    /// Fault known only by type name
    pub fn named(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FaultType::named(type_name), message)
    }

    /// Capture an error value, keeping it for downcasting
    pub fn from_error<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            fault_type: FaultType::of::<E>(),
            message: err.to_string(),
            source: Some(Arc::new(err)),
        }
    }

    /// Convert a caught panic payload
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::named(PANIC_FAULT_TYPE, message)
    }

    /// Type identity of the fault
    pub fn fault_type(&self) -> &FaultType {
        &self.fault_type
    }

    /// Fully-qualified type name of the fault
    pub fn type_name(&self) -> &str {
        self.fault_type.name()
    }

    /// Fault message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the fault came from a panic
    pub fn is_panic(&self) -> bool {
        !self.fault_type.is_static() && self.fault_type.name() == PANIC_FAULT_TYPE
    }

    /// Original error value, when captured with [`Fault::from_error`]
    pub fn error(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Downcast the original error value
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.source.as_deref().and_then(|err| err.downcast_ref::<E>())
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fault")
            .field("type", &self.fault_type.name)
            .field("message", &self.message)
            .field("has_source", &self.source.is_some())
            .finish()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.fault_type, self.message)
    }
}

impl Error for Fault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn Error + 'static))
    }
}

/// Run `f`, turning a panic into a fault
pub(crate) fn guarded<T>(f: impl FnOnce() -> Result<T, Fault>) -> Result<T, Fault> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(Fault::from_panic(payload)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("bad input: {0}")]
    struct BadInput(String);

    #[derive(Debug, thiserror::Error)]
    #[error("io went away")]
    struct Gone;

    #[test]
    fn test_static_types_compare_by_id() {
        assert!(FaultType::of::<BadInput>().matches(&FaultType::of::<BadInput>()));
        assert!(!FaultType::of::<BadInput>().matches(&FaultType::of::<Gone>()));
    }

    #[test]
    fn test_named_types_compare_by_name() {
        let by_name = FaultType::named(std::any::type_name::<BadInput>());
        assert!(by_name.matches(&FaultType::of::<BadInput>()));
        assert!(!by_name.matches(&FaultType::of::<Gone>()));
    }

    #[test]
    fn test_from_error_keeps_source() {
        let fault = Fault::from_error(BadInput("x".into()));
        assert_eq!(fault.message(), "bad input: x");
        assert!(fault.downcast_ref::<BadInput>().is_some());
        assert!(fault.downcast_ref::<Gone>().is_none());
        assert!(!fault.is_panic());
    }

    #[test]
    fn test_guarded_converts_panics() {
        let result: Result<(), Fault> = guarded(|| panic!("boom {}", 7));
        let fault = result.unwrap_err();
        assert!(fault.is_panic());
        assert_eq!(fault.message(), "boom 7");
    }

    #[test]
    fn test_display_includes_type_and_message() {
        let fault = Fault::named("app::Timeout", "took too long");
        assert_eq!(fault.to_string(), "app::Timeout: took too long");
    }
}
