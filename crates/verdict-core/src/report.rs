//! Generic report tree
//!
//! Report nodes form the hierarchical result document: suites hold suites
//! and cases, cases are leaves. Nodes are built completely before they are
//! attached, so a parent never holds a half-populated child.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Element tag of a leaf test case node
pub const TEST_CASE_ELEMENT: &str = "test-case";

/// Element tag of a composite suite or fixture node
pub const TEST_SUITE_ELEMENT: &str = "test-suite";

/// Element tag of the document root
pub const TEST_RUN_ELEMENT: &str = "test-run";

/// A node in the report tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportNode {
    tag: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    attributes: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<ReportNode>,
}

impl ReportNode {
    /// Create an empty node with the given element tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: IndexMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Document root node
    pub fn run_root() -> Self {
        Self::new(TEST_RUN_ELEMENT)
    }

    /// Element tag
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Whether this node is a leaf case node
    pub fn is_case(&self) -> bool {
        self.tag == TEST_CASE_ELEMENT
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Builder-style [`ReportNode::set_attribute`]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// All attributes in insertion order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Text content
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Set text content
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Child nodes
    pub fn children(&self) -> &[ReportNode] {
        &self.children
    }

    /// Attach a fully built child and return a handle to it
    pub fn add_child(&mut self, child: ReportNode) -> &mut ReportNode {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Attach an empty child element and return a handle to it
    pub fn add_element(&mut self, tag: impl Into<String>) -> &mut ReportNode {
        self.add_child(ReportNode::new(tag))
    }

    /// First child with the given tag
    pub fn find_child(&self, tag: &str) -> Option<&ReportNode> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// All case nodes beneath this node, depth first
    pub fn cases(&self) -> Vec<&ReportNode> {
        let mut found = Vec::new();
        self.collect_cases(&mut found);
        found
    }

    fn collect_cases<'a>(&'a self, found: &mut Vec<&'a ReportNode>) {
        for child in &self.children {
            if child.is_case() {
                found.push(child);
            } else {
                child.collect_cases(found);
            }
        }
    }
}
