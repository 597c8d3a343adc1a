//! Case naming and identity
//!
//! Inherited methods are qualified with their declaring type so they cannot
//! collide with a same-named method declared on the fixture itself.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use verdict_case::{MethodRef, TestCase, TestNode, TypeName};
use verdict_core::{ParentInfo, VerdictError};
use verdict_testkit::strategies::{distinct_type_paths, dotted_name, identifier, type_path};
use verdict_testkit::*;

#[test]
fn test_own_method_uses_simple_name() {
    let case = case_in("app.tests.Derived", method_passing("parses"));
    assert_eq!(case.name(), "parses");
    assert_eq!(case.full_name(), "app.tests.Derived.parses");
}

#[test]
fn test_inherited_method_is_qualified() {
    let method = inherited_method("parses", "app::tests::Base", "app::tests::Derived");
    let case = case_in("app.tests.Derived", method);

    assert_eq!(case.name(), "Base.parses");
    assert_eq!(case.full_name(), "app.tests.Derived.Base.parses");
}

#[test]
fn test_inherited_and_own_methods_do_not_collide() {
    let parent = fixture("app.tests.Derived");
    let own = TestCase::new(
        MethodRef::unit("parses", type_name("app::tests::Derived"), || {}),
        parent.clone(),
    )
    .unwrap();
    let inherited = TestCase::new(
        inherited_method("parses", "app::tests::Base", "app::tests::Derived"),
        parent,
    )
    .unwrap();

    assert_ne!(own.full_name(), inherited.full_name());
    assert_ne!(own.id(), inherited.id());
}

#[allow(dead_code)]
mod shapes {
    pub struct Inner;
    pub struct Base<T>(pub T);
    pub struct Other<T>(pub T);
    pub struct Derived;
}

#[test]
fn test_generic_base_keeps_its_own_name() {
    use shapes::{Base, Derived, Inner, Other};

    let inherited = |declaring: TypeName| {
        let method = MethodRef::unit("parses", declaring, || {})
            .reflected_through(TypeName::of::<Derived>());
        case_in("app.tests.Derived", method)
    };
    let from_base = inherited(TypeName::of::<Base<Inner>>());
    let from_other = inherited(TypeName::of::<Other<Inner>>());

    assert!(from_base.name().starts_with("Base<"));
    assert!(from_base.name().ends_with("Inner>.parses"));
    assert!(from_other.name().starts_with("Other<"));
    assert_eq!(
        from_base.full_name(),
        format!("app.tests.Derived.{}", from_base.name())
    );
    assert_ne!(from_base.full_name(), from_other.full_name());
    assert_ne!(from_base.id(), from_other.id());
}

#[test]
fn test_unresolved_method_is_invalid_argument() {
    let method = MethodRef::unresolved("ghost", type_name("app::tests::Derived"));
    let err = TestCase::new(method, fixture("app.tests.Derived")).unwrap_err();
    assert!(matches!(err, VerdictError::InvalidArgument { .. }));
}

#[test]
fn test_empty_fixture_name_is_invalid_argument() {
    let err = ParentInfo::from_full_name("").unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn test_case_is_always_a_leaf() {
    let case = case_of(method_returning("answer", 42))
        .expecting_result(42)
        .expecting_any_fault();
    assert!(!case.has_children());
    assert!(TestNode::children(&case).is_empty());
    assert_eq!(case.element_tag(), verdict_core::TEST_CASE_ELEMENT);
}

proptest! {
    #[test]
    fn prop_name_for_own_methods(fixture_name in dotted_name(), ty in type_path(), method in identifier()) {
        let parent = ParentInfo::from_full_name(fixture_name.clone()).unwrap().shared();
        let case = TestCase::new(MethodRef::unit(method.clone(), TypeName::new(ty), || {}), parent).unwrap();

        prop_assert_eq!(case.name(), method.as_str());
        prop_assert_eq!(case.full_name(), format!("{}.{}", fixture_name, method));
    }

    #[test]
    fn prop_name_for_inherited_methods(
        fixture_name in dotted_name(),
        (declaring, reflected) in distinct_type_paths(),
        method in identifier(),
    ) {
        let declaring = TypeName::new(declaring);
        let expected_name = format!("{}.{}", declaring.name(), method);
        let method_ref = MethodRef::unit(method, declaring, || {})
            .reflected_through(TypeName::new(reflected));
        let parent = ParentInfo::from_full_name(fixture_name.clone()).unwrap().shared();
        let case = TestCase::new(method_ref, parent).unwrap();

        prop_assert_eq!(case.name(), expected_name.as_str());
        let prefix = format!("{}.", fixture_name);
        prop_assert!(case.full_name().starts_with(&prefix));
        prop_assert_eq!(case.full_name(), format!("{}.{}", fixture_name, case.name()));
    }
}
