//! Method references handed over by discovery
//!
//! A [`MethodRef`] is the callable under test plus the pair of type names
//! discovery resolved it through: the type that declares the method and
//! the type it was reflected from. The two differ when a fixture inherits
//! a test method from a base fixture.

use crate::evaluation::RawOutcome;
use crate::fault::{guarded, Fault};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Value produced by a method under test
pub type Value = serde_json::Value;

type MethodBody = Arc<dyn Fn() -> Result<Value, Fault> + Send + Sync>;
type HandlerBody = Arc<dyn Fn(&Fault) -> Result<(), Fault> + Send + Sync>;

/// Simple and fully-qualified name of a type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    name: String,
    full_name: String,
}

impl TypeName {
    /// Build from a fully-qualified name
    ///
    /// The simple name is the segment after the last `::` or `.` of the
    /// path, keeping any generic argument list intact.
    pub fn new(full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let name = simple_name(&full_name).to_string();
        Self { name, full_name }
    }

    /// Name of a Rust type
    pub fn of<T: ?Sized>() -> Self {
        Self::new(std::any::type_name::<T>())
    }

    /// Simple name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully-qualified name, the type's identifier
    pub fn full_name(&self) -> &str {
        &self.full_name
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

// Separators inside generic arguments, tuples or slices belong to the
// argument types, not to the path of the type itself.
fn simple_name(full_name: &str) -> &str {
    let path_end = full_name
        .find(|c| matches!(c, '<' | '(' | '['))
        .unwrap_or(full_name.len());
    let path = &full_name[..path_end];
    let start = path
        .rfind("::")
        .map(|i| i + 2)
        .max(path.rfind('.').map(|i| i + 1))
        .unwrap_or(0);
    &full_name[start..]
}

/// Handle to the callable under test
#[derive(Clone)]
pub struct MethodRef {
    name: String,
    declaring_type: TypeName,
    reflected_type: TypeName,
    body: Option<MethodBody>,
}

impl MethodRef {
    /// Method declared on, and reflected through, `declaring_type`
    pub fn new<F>(name: impl Into<String>, declaring_type: TypeName, body: F) -> Self
    where
        F: Fn() -> Result<Value, Fault> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            reflected_type: declaring_type.clone(),
            declaring_type,
            body: Some(Arc::new(body)),
        }
    }

    /// Method with a typed result and error
    ///
    /// The returned value is serialized for comparison against an expected
    /// result; the error becomes a statically typed fault.
    pub fn from_result<T, E, F>(name: impl Into<String>, declaring_type: TypeName, body: F) -> Self
    where
        T: Serialize,
        E: std::error::Error + Send + Sync + 'static,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        Self::new(name, declaring_type, move || {
            let value = body().map_err(Fault::from_error)?;
            serde_json::to_value(value).map_err(Fault::from_error)
        })
    }

    /// Plain test body that passes unless it panics
    pub fn unit<F>(name: impl Into<String>, declaring_type: TypeName, body: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::new(name, declaring_type, move || {
            body();
            Ok(Value::Null)
        })
    }

    /// Method discovery could name but not bind
    pub fn unresolved(name: impl Into<String>, declaring_type: TypeName) -> Self {
        Self {
            name: name.into(),
            reflected_type: declaring_type.clone(),
            declaring_type,
            body: None,
        }
    }

    /// Record the type the method was reflected through
    pub fn reflected_through(mut self, reflected_type: TypeName) -> Self {
        self.reflected_type = reflected_type;
        self
    }

    /// Simple method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type that declares the method
    pub fn declaring_type(&self) -> &TypeName {
        &self.declaring_type
    }

    /// Type the method was reflected through
    pub fn reflected_type(&self) -> &TypeName {
        &self.reflected_type
    }

    /// Whether a callable is bound
    pub fn is_resolved(&self) -> bool {
        self.body.is_some()
    }

    /// Whether the method is declared on a type other than the one it was
    /// reflected through
    pub fn is_inherited(&self) -> bool {
        self.declaring_type.full_name() != self.reflected_type.full_name()
    }

    /// Call the method, capturing returned errors and panics
    pub fn invoke(&self) -> RawOutcome {
        let Some(body) = &self.body else {
            return RawOutcome::Raised(Fault::named(
                "verdict::UnresolvedMethod",
                format!("method {} has no callable bound", self.name),
            ));
        };
        match guarded(|| body()) {
            Ok(value) => RawOutcome::Returned(value),
            Err(fault) => RawOutcome::Raised(fault),
        }
    }
}

impl fmt::Debug for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodRef")
            .field("name", &self.name)
            .field("declaring_type", &self.declaring_type.full_name)
            .field("reflected_type", &self.reflected_type.full_name)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// Secondary method that receives a fault instead of the case failing
#[derive(Clone)]
pub struct AlternateHandler {
    name: String,
    body: HandlerBody,
}

impl AlternateHandler {
    /// Create a handler
    ///
    /// Returning `Ok` accepts the fault; returning `Err` or panicking is
    /// reported as an evaluation error.
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Fault) -> Result<(), Fault> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Arc::new(body),
        }
    }

    /// Handler name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hand the fault to the handler
    pub fn invoke(&self, fault: &Fault) -> RawOutcome {
        match guarded(|| (self.body)(fault)) {
            Ok(()) => RawOutcome::Handled,
            Err(secondary) => RawOutcome::Raised(secondary),
        }
    }
}

impl fmt::Debug for AlternateHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlternateHandler")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
