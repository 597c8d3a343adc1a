//! Case results and their report nodes

use crate::affinity::ThreadAffinity;
use crate::descriptor::{CaseId, TestCase};
use crate::evaluation::Verdict;
use chrono::{DateTime, SecondsFormat, Utc};
use std::time::Duration;
use verdict_core::{ReportNode, TEST_CASE_ELEMENT};

/// Outcome of one case run, with timing and identity
#[derive(Debug, Clone)]
pub struct CaseResult {
    id: CaseId,
    name: String,
    full_name: String,
    method_name: String,
    class_name: String,
    run_state: &'static str,
    verdict: Verdict,
    duration: Duration,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    affinity: Option<ThreadAffinity>,
}

impl CaseResult {
    /// Result for `case` with the given verdict and no recorded timing
    pub fn new(case: &TestCase, verdict: Verdict) -> Self {
        let now = Utc::now();
        Self {
            id: case.id(),
            name: case.name().to_string(),
            full_name: case.full_name().to_string(),
            method_name: case.method().name().to_string(),
            class_name: case.method().reflected_type().full_name().to_string(),
            run_state: case.run_state().as_str(),
            verdict,
            duration: Duration::ZERO,
            start_time: now,
            end_time: now,
            affinity: None,
        }
    }

    /// Record when the case ran and for how long
    pub fn with_timing(
        mut self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self.duration = duration;
        self
    }

    /// Record the scheduling decision used
    pub fn with_affinity(mut self, affinity: ThreadAffinity) -> Self {
        self.affinity = Some(affinity);
        self
    }

    /// Case identifier
    pub fn id(&self) -> CaseId {
        self.id
    }

    /// Case name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case full name
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Evaluation verdict
    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    /// Wall-clock duration of the run
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Start timestamp
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// End timestamp
    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    /// Scheduling decision, absent for cases that never ran
    pub fn affinity(&self) -> Option<&ThreadAffinity> {
        self.affinity.as_ref()
    }

    /// Build the leaf report node for this result
    ///
    /// Case nodes never have child elements; failure detail is carried in
    /// attributes and the node text.
    pub fn to_report_node(&self) -> ReportNode {
        let mut node = ReportNode::new(TEST_CASE_ELEMENT);
        node.set_attribute("id", self.id.to_string());
        node.set_attribute("name", self.name.as_str());
        node.set_attribute("fullname", self.full_name.as_str());
        node.set_attribute("methodname", self.method_name.as_str());
        node.set_attribute("classname", self.class_name.as_str());
        node.set_attribute("runstate", self.run_state);
        node.set_attribute("result", self.verdict.status());
        if let Some(label) = self.verdict.label() {
            node.set_attribute("label", label);
        }
        node.set_attribute("duration", format!("{:.6}", self.duration.as_secs_f64()));
        node.set_attribute(
            "start-time",
            self.start_time.to_rfc3339_opts(SecondsFormat::Micros, true),
        );
        node.set_attribute(
            "end-time",
            self.end_time.to_rfc3339_opts(SecondsFormat::Micros, true),
        );
        if let Some(affinity) = &self.affinity {
            node.set_attribute("isolated", affinity.isolate().to_string());
            if let Some(timeout) = affinity.timeout() {
                node.set_attribute("timeout", timeout.as_millis().to_string());
            }
        }

        if let Verdict::Failure(failure) = &self.verdict {
            node.set_attribute("failure-kind", failure.kind().as_str());
            if let Some(fault) = failure.fault() {
                node.set_attribute("fault-type", fault.type_name());
            }
            if let Some(secondary) = failure.secondary_fault() {
                node.set_attribute("secondary-fault", secondary.to_string());
            }
        }
        if let Some(message) = self.verdict.message() {
            node.set_text(message);
        }
        node
    }

    /// Attach this result under `parent` and return the new node
    ///
    /// `recursive` exists for symmetry with suite nodes; a case has no
    /// descendants, so it changes nothing here.
    pub fn add_to_report<'a>(&self, parent: &'a mut ReportNode, recursive: bool) -> &'a mut ReportNode {
        tracing::trace!(case = %self.full_name, recursive, "Adding case result to report");
        parent.add_child(self.to_report_node())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::FailureKind;
    use crate::method::{MethodRef, TypeName};
    use verdict_core::{ParentInfo, TEST_SUITE_ELEMENT};

    fn case() -> TestCase {
        let parent = ParentInfo::from_full_name("app.Fixture").unwrap().shared();
        TestCase::new(MethodRef::unit("runs", TypeName::new("app::Fixture"), || {}), parent).unwrap()
    }

    #[test]
    fn test_success_node() {
        let case = case();
        let mut suite = ReportNode::new(TEST_SUITE_ELEMENT);
        let node = case.make_result(Verdict::Success).add_to_report(&mut suite, true);

        assert_eq!(node.tag(), TEST_CASE_ELEMENT);
        assert_eq!(node.attribute("result"), Some("Passed"));
        assert_eq!(node.attribute("label"), None);
        assert_eq!(node.text(), None);
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_failure_node_carries_detail() {
        let case = case();
        let verdict = Verdict::failure(FailureKind::ResultMismatch, "expected result 42, got 43");
        let node = case.make_result(verdict).to_report_node();

        assert_eq!(node.attribute("result"), Some("Failed"));
        assert_eq!(node.attribute("label"), Some("Failure"));
        assert_eq!(node.attribute("failure-kind"), Some("ResultMismatch"));
        assert_eq!(node.text(), Some("expected result 42, got 43"));
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_duration_formatting() {
        let case = case();
        let start = Utc::now();
        let result = case
            .make_result(Verdict::Success)
            .with_timing(start, start, Duration::from_millis(1500));
        assert_eq!(result.to_report_node().attribute("duration"), Some("1.500000"));
    }
}
