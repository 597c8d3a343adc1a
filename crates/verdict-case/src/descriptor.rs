//! Test case descriptor
//!
//! One [`TestCase`] exists per discovered test method. Identity (name, full
//! name, id, method) is fixed at construction. The expectation contract is
//! populated afterwards by discovery through the setters below and is only
//! read once execution starts; runners share cases as `Arc<TestCase>`, so a
//! case cannot be reconfigured while it runs.

use crate::affinity::{self, ThreadAffinity};
use crate::evaluation::{self, MatchMode, ResultComparer, Verdict};
use crate::fault::FaultType;
use crate::method::{AlternateHandler, MethodRef, Value};
use crate::result::CaseResult;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;
use verdict_core::properties::keys;
use verdict_core::{
    ExecutionContext, ParentInfo, PropertyBag, PropertyValue, ReportNode, Result,
    VerdictError, TEST_CASE_ELEMENT,
};

// ─────────────────────────────────────────────────────────────────────────────
// Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Stable case identifier derived from the full name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaseId(Uuid);

impl CaseId {
    fn from_full_name(full_name: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, full_name.as_bytes()))
    }

    /// Underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether and how a case may run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunState {
    /// Eligible to run
    #[default]
    Runnable,
    /// Declared in a way that cannot run
    NotRunnable {
        /// What is wrong with the declaration
        reason: String,
    },
    /// Marked to be skipped
    Ignored {
        /// Why it is skipped
        reason: String,
    },
    /// Runs only when selected explicitly
    Explicit,
}

impl RunState {
    /// Name used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Runnable => "Runnable",
            Self::NotRunnable { .. } => "NotRunnable",
            Self::Ignored { .. } => "Ignored",
            Self::Explicit => "Explicit",
        }
    }

    /// Reason attached to the state, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::NotRunnable { reason } | Self::Ignored { reason } => Some(reason),
            Self::Runnable | Self::Explicit => None,
        }
    }
}

/// A node of the test tree
///
/// Cases are leaves; suites, which live outside this crate, implement the
/// same surface with real children.
pub trait TestNode {
    /// Display name
    fn name(&self) -> &str;

    /// Name qualified by all ancestors
    fn full_name(&self) -> &str;

    /// Report element tag for this kind of node
    fn element_tag(&self) -> &'static str;

    /// Direct children
    fn children(&self) -> Vec<&dyn TestNode>;

    /// Whether the node has children
    fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    /// Describe this node (and, when `recursive`, its descendants) under
    /// `parent`, returning the attached node
    fn add_to_report<'a>(&self, parent: &'a mut ReportNode, recursive: bool) -> &'a mut ReportNode;
}

// ─────────────────────────────────────────────────────────────────────────────
// Descriptor
// ─────────────────────────────────────────────────────────────────────────────

/// One executable test and its expectation contract
#[derive(Debug, Clone)]
pub struct TestCase {
    id: CaseId,
    name: String,
    full_name: String,
    method: MethodRef,
    parent: Arc<ParentInfo>,
    run_state: RunState,
    properties: PropertyBag,

    exception_expected: bool,
    expected_fault_type: Option<FaultType>,
    expected_message: Option<String>,
    match_mode: MatchMode,
    expected_user_message: Option<String>,
    alternate_handler: Option<AlternateHandler>,
    expected_result: Option<Value>,
    result_comparer: Option<ResultComparer>,
}

impl TestCase {
    /// Create the descriptor for `method` inside `parent`
    ///
    /// Methods inherited from a base type are named
    /// `<declaring type>.<method>` so they cannot collide with a method of
    /// the same simple name declared on the fixture itself.
    pub fn new(method: MethodRef, parent: Arc<ParentInfo>) -> Result<Self> {
        if method.name().trim().is_empty() {
            return Err(VerdictError::invalid_argument("method name must not be empty"));
        }
        if !method.is_resolved() {
            return Err(VerdictError::invalid_argument(format!(
                "method reference {}::{} is unresolved",
                method.declaring_type().full_name(),
                method.name()
            )));
        }

        let name = if method.is_inherited() {
            format!("{}.{}", method.declaring_type().name(), method.name())
        } else {
            method.name().to_string()
        };
        let full_name = format!("{}.{}", parent.full_name(), name);

        Ok(Self {
            id: CaseId::from_full_name(&full_name),
            name,
            full_name,
            method,
            parent,
            run_state: RunState::Runnable,
            properties: PropertyBag::new(),
            exception_expected: false,
            expected_fault_type: None,
            expected_message: None,
            match_mode: MatchMode::Exact,
            expected_user_message: None,
            alternate_handler: None,
            expected_result: None,
            result_comparer: None,
        })
    }

    // ── identity ────────────────────────────────────────────────────────────

    /// Stable identifier
    pub fn id(&self) -> CaseId {
        self.id
    }

    /// Display name, qualified when inherited
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent full name followed by `.` and the name
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Wrapped method
    pub fn method(&self) -> &MethodRef {
        &self.method
    }

    /// Owning fixture
    pub fn parent(&self) -> &ParentInfo {
        &self.parent
    }

    /// Current run state
    pub fn run_state(&self) -> &RunState {
        &self.run_state
    }

    /// Properties declared on the case
    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    /// Reason attached to the run state
    ///
    /// An ignored case without a reason of its own falls back to a declared
    /// `IgnoreReason` property.
    pub fn run_state_reason(&self) -> Option<&str> {
        match (&self.run_state, self.run_state.reason()) {
            (RunState::Ignored { .. }, None | Some("")) => self
                .properties
                .get(keys::IGNORE_REASON)
                .and_then(PropertyValue::as_text),
            (_, reason) => reason,
        }
    }

    // ── expectation contract ────────────────────────────────────────────────

    /// Whether a fault is expected
    pub fn exception_expected(&self) -> bool {
        self.exception_expected
    }

    /// Expected fault type
    pub fn expected_fault_type(&self) -> Option<&FaultType> {
        self.expected_fault_type.as_ref()
    }

    /// Fully-qualified name of the expected fault type
    pub fn expected_fault_name(&self) -> Option<&str> {
        self.expected_fault_type.as_ref().map(FaultType::name)
    }

    /// Expected fault message
    pub fn expected_message(&self) -> Option<&str> {
        self.expected_message.as_deref()
    }

    /// How the expected message is compared
    pub fn match_mode(&self) -> MatchMode {
        self.match_mode
    }

    /// Message shown when the fault message does not match
    pub fn expected_user_message(&self) -> Option<&str> {
        self.expected_user_message.as_deref()
    }

    /// Handler receiving faults in place of failing
    pub fn alternate_handler(&self) -> Option<&AlternateHandler> {
        self.alternate_handler.as_ref()
    }

    /// Whether a return value is expected
    pub fn has_expected_result(&self) -> bool {
        self.expected_result.is_some()
    }

    /// Expected return value
    pub fn expected_result(&self) -> Option<&Value> {
        self.expected_result.as_ref()
    }

    /// Custom equality for the expected result
    pub fn result_comparer(&self) -> Option<&ResultComparer> {
        self.result_comparer.as_ref()
    }

    // ── configuration (discovery phase only) ────────────────────────────────

    /// Mutable access to the declared properties
    pub fn properties_mut(&mut self) -> &mut PropertyBag {
        &mut self.properties
    }

    /// Set the run state
    pub fn set_run_state(&mut self, run_state: RunState) {
        self.run_state = run_state;
    }

    /// Set whether a fault is expected
    pub fn set_exception_expected(&mut self, expected: bool) {
        self.exception_expected = expected;
    }

    /// Set the expected fault type; `Some` also marks a fault as expected
    pub fn set_expected_fault_type(&mut self, fault_type: Option<FaultType>) {
        if fault_type.is_some() {
            self.exception_expected = true;
        }
        self.expected_fault_type = fault_type;
    }

    /// Expect a fault known only by its fully-qualified type name
    pub fn set_expected_fault_name(&mut self, name: impl Into<String>) {
        self.set_expected_fault_type(Some(FaultType::named(name)));
    }

    /// Set the expected fault message and how it is compared
    pub fn set_expected_message(&mut self, message: Option<String>, mode: MatchMode) {
        self.expected_message = message;
        self.match_mode = mode;
    }

    /// Set the message shown on a message mismatch
    pub fn set_expected_user_message(&mut self, message: Option<String>) {
        self.expected_user_message = message;
    }

    /// Set the alternate fault handler
    pub fn set_alternate_handler(&mut self, handler: Option<AlternateHandler>) {
        self.alternate_handler = handler;
    }

    /// Set the expected return value
    pub fn set_expected_result(&mut self, value: Option<Value>) {
        self.expected_result = value;
    }

    /// Set a custom equality for the expected result
    pub fn set_result_comparer(&mut self, comparer: Option<ResultComparer>) {
        self.result_comparer = comparer;
    }

    /// Builder-style: expect a fault of the given type
    pub fn expecting_fault(mut self, fault_type: FaultType) -> Self {
        self.set_expected_fault_type(Some(fault_type));
        self
    }

    /// Builder-style: expect some fault, of any type
    pub fn expecting_any_fault(mut self) -> Self {
        self.exception_expected = true;
        self
    }

    /// Builder-style: expect a fault message
    pub fn expecting_message(mut self, message: impl Into<String>, mode: MatchMode) -> Self {
        self.set_expected_message(Some(message.into()), mode);
        self
    }

    /// Builder-style: user message for message mismatches
    pub fn with_user_message(mut self, message: impl Into<String>) -> Self {
        self.expected_user_message = Some(message.into());
        self
    }

    /// Builder-style: expect a return value
    pub fn expecting_result(mut self, value: impl Into<Value>) -> Self {
        self.expected_result = Some(value.into());
        self
    }

    /// Builder-style: custom result equality
    pub fn with_result_comparer(mut self, comparer: ResultComparer) -> Self {
        self.result_comparer = Some(comparer);
        self
    }

    /// Builder-style: alternate fault handler
    pub fn with_alternate_handler(mut self, handler: AlternateHandler) -> Self {
        self.alternate_handler = Some(handler);
        self
    }

    /// Builder-style: declared property
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.set(key, value);
        self
    }

    /// Builder-style: run state
    pub fn with_run_state(mut self, run_state: RunState) -> Self {
        self.run_state = run_state;
        self
    }

    // ── behaviour ───────────────────────────────────────────────────────────

    /// Decide where this case must run
    pub fn thread_affinity(&self, ctx: &ExecutionContext) -> ThreadAffinity {
        affinity::resolve(self, ctx)
    }

    /// Whether this case must run on a dedicated thread
    pub fn requires_dedicated_thread(&self, ctx: &ExecutionContext) -> bool {
        self.thread_affinity(ctx).isolate()
    }

    /// Invoke the method on the current thread and evaluate the outcome
    pub fn execute(&self) -> Verdict {
        evaluation::evaluate(self, self.method.invoke())
    }

    /// Result object for a verdict, ready to be attached to a report
    pub fn make_result(&self, verdict: Verdict) -> CaseResult {
        CaseResult::new(self, verdict)
    }

    pub(crate) fn identity_attributes(&self, node: &mut ReportNode) {
        node.set_attribute("id", self.id.to_string());
        node.set_attribute("name", self.name.as_str());
        node.set_attribute("fullname", self.full_name.as_str());
        node.set_attribute("methodname", self.method.name());
        node.set_attribute("classname", self.method.reflected_type().full_name());
    }
}

impl TestNode for TestCase {
    fn name(&self) -> &str {
        &self.name
    }

    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn element_tag(&self) -> &'static str {
        TEST_CASE_ELEMENT
    }

    fn children(&self) -> Vec<&dyn TestNode> {
        Vec::new()
    }

    fn has_children(&self) -> bool {
        false
    }

    fn add_to_report<'a>(&self, parent: &'a mut ReportNode, _recursive: bool) -> &'a mut ReportNode {
        let mut node = ReportNode::new(TEST_CASE_ELEMENT);
        self.identity_attributes(&mut node);
        node.set_attribute("runstate", self.run_state.as_str());
        if let Some(reason) = self.run_state_reason() {
            node.set_attribute("reason", reason);
        }
        if let Some(description) = self.properties.get(keys::DESCRIPTION) {
            node.set_attribute("description", description.to_string());
        }
        let categories: Vec<String> = self
            .properties
            .get_all(keys::CATEGORY)
            .iter()
            .map(ToString::to_string)
            .collect();
        if !categories.is_empty() {
            node.set_attribute("categories", categories.join(","));
        }
        parent.add_child(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::TypeName;

    fn parent() -> Arc<ParentInfo> {
        ParentInfo::from_full_name("app.tests.Derived").unwrap().shared()
    }

    fn method(name: &str) -> MethodRef {
        MethodRef::unit(name, TypeName::new("app::tests::Derived"), || {})
    }

    #[test]
    fn test_defaults_carry_no_expectation() {
        let case = TestCase::new(method("adds"), parent()).unwrap();
        assert!(!case.exception_expected());
        assert!(!case.has_expected_result());
        assert_eq!(case.match_mode(), MatchMode::Exact);
        assert_eq!(case.run_state(), &RunState::Runnable);
    }

    #[test]
    fn test_empty_name_is_invalid_argument() {
        let err = TestCase::new(method(" "), parent()).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_id_is_stable_per_full_name() {
        let a = TestCase::new(method("adds"), parent()).unwrap();
        let b = TestCase::new(method("adds"), parent()).unwrap();
        let c = TestCase::new(method("subtracts"), parent()).unwrap();
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn test_expected_fault_name_marks_expectation() {
        let mut case = TestCase::new(method("adds"), parent()).unwrap();
        case.set_expected_fault_name("app::ParseError");
        assert!(case.exception_expected());
        assert_eq!(case.expected_fault_name(), Some("app::ParseError"));
    }

    #[test]
    fn test_ignore_reason_property_fills_empty_reason() {
        let case = TestCase::new(method("adds"), parent())
            .unwrap()
            .with_property(keys::IGNORE_REASON, "waiting on upstream fix")
            .with_run_state(RunState::Ignored {
                reason: String::new(),
            });
        assert_eq!(case.run_state_reason(), Some("waiting on upstream fix"));

        let explicit = case.with_run_state(RunState::Ignored {
            reason: "flaky".to_string(),
        });
        assert_eq!(explicit.run_state_reason(), Some("flaky"));
    }

    #[test]
    fn test_leaf_surface() {
        let case = TestCase::new(method("adds"), parent()).unwrap();
        assert!(!case.has_children());
        assert!(case.children().is_empty());
        assert_eq!(case.element_tag(), TEST_CASE_ELEMENT);
    }
}
