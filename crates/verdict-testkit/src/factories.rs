//! Factories for fixtures, methods and cases

use std::sync::Arc;
use std::time::Duration;
use verdict_case::{Fault, MethodRef, TestCase, TypeName, Value};
use verdict_core::{ParentInfo, PropertyBag};

/// Fault type used by tests that need a statically typed error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct BadInput(pub String);

/// Second statically typed error, distinct from [`BadInput`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not found: {0}")]
pub struct NotFound(pub String);

/// Type name for a dotted fixture name (`app.tests.Fixture`)
pub fn type_name(full_name: &str) -> TypeName {
    TypeName::new(full_name)
}

/// Fixture with no declared properties
pub fn fixture(full_name: &str) -> Arc<ParentInfo> {
    ParentInfo::from_full_name(full_name).unwrap().shared()
}

/// Fixture with declared properties
pub fn fixture_with(full_name: &str, properties: PropertyBag) -> Arc<ParentInfo> {
    ParentInfo::from_full_name(full_name)
        .unwrap()
        .with_properties(properties)
        .shared()
}

/// Method that passes without returning anything
pub fn method_passing(name: &str) -> MethodRef {
    MethodRef::unit(name, type_name("tests.Fixture"), || {})
}

/// Method that returns `value`
pub fn method_returning(name: &str, value: impl Into<Value>) -> MethodRef {
    let value = value.into();
    MethodRef::new(name, type_name("tests.Fixture"), move || Ok(value.clone()))
}

/// Method that returns the given error every time it is called
pub fn method_failing_with<E>(name: &str, err: E) -> MethodRef
where
    E: std::error::Error + Clone + Send + Sync + 'static,
{
    MethodRef::new(name, type_name("tests.Fixture"), move || {
        Err(Fault::from_error(err.clone()))
    })
}

/// Method that raises a prepared fault
pub fn method_raising(name: &str, fault: Fault) -> MethodRef {
    MethodRef::new(name, type_name("tests.Fixture"), move || Err(fault.clone()))
}

/// Method that panics with `message`
pub fn method_panicking(name: &str, message: &'static str) -> MethodRef {
    MethodRef::unit(name, type_name("tests.Fixture"), move || panic!("{}", message))
}

/// Method that sleeps for `delay`, then passes
pub fn method_sleeping(name: &str, delay: Duration) -> MethodRef {
    MethodRef::unit(name, type_name("tests.Fixture"), move || std::thread::sleep(delay))
}

/// Method declared on `base` but reflected through `derived`
pub fn inherited_method(name: &str, base: &str, derived: &str) -> MethodRef {
    MethodRef::unit(name, type_name(base), || {}).reflected_through(type_name(derived))
}

/// Case for `method` inside a fixture with the given full name
pub fn case_in(fixture_name: &str, method: MethodRef) -> TestCase {
    TestCase::new(method, fixture(fixture_name)).unwrap()
}

/// Case inside a default fixture
pub fn case_of(method: MethodRef) -> TestCase {
    case_in("tests.Fixture", method)
}
