//! Display tree nodes
//!
//! The tree is plain owned data: every [`DisplayGroup`] exclusively owns its
//! children and nothing points back up.

use serde::Serialize;
use serde_json::Value;
use survey_schema::{RowType, XpathContext};

/// Kind of a display group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    /// Top of the tree
    Root,
    /// One repeat instance
    Repeat,
    /// Group, score or rank block
    Regular,
    /// Grid question
    Matrix,
    /// One grid row, paired to a choice
    MatrixRow,
}

/// Node of the display tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum DisplayNode {
    Group(DisplayGroup),
    Response(DisplayResponse),
}

impl DisplayNode {
    /// Group, if this is one
    #[inline]
    #[must_use]
    pub fn as_group(&self) -> Option<&DisplayGroup> {
        match self {
            Self::Group(group) => Some(group),
            Self::Response(_) => None,
        }
    }

    /// Response, if this is one
    #[inline]
    #[must_use]
    pub fn as_response(&self) -> Option<&DisplayResponse> {
        match self {
            Self::Response(response) => Some(response),
            Self::Group(_) => None,
        }
    }

    /// Node name (`None` for the root)
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Group(group) => group.name.as_deref(),
            Self::Response(response) => Some(&response.name),
        }
    }
}

impl From<DisplayGroup> for DisplayNode {
    fn from(group: DisplayGroup) -> Self {
        Self::Group(group)
    }
}

impl From<DisplayResponse> for DisplayNode {
    fn from(response: DisplayResponse) -> Self {
        Self::Response(response)
    }
}

/// Group of display nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayGroup {
    pub kind: GroupKind,

    /// Translated label
    pub label: Option<String>,

    /// Row or choice name (`None` for the root)
    pub name: Option<String>,

    /// Enclosing groups, this one included (empty for the root)
    pub xpath_context: XpathContext,

    pub children: Vec<DisplayNode>,
}

impl DisplayGroup {
    /// Empty root group
    #[must_use]
    pub fn root() -> Self {
        Self {
            kind: GroupKind::Root,
            label: None,
            name: None,
            xpath_context: XpathContext::root(),
            children: Vec::new(),
        }
    }

    /// Empty named group
    #[must_use]
    pub fn new(
        kind: GroupKind,
        label: impl Into<String>,
        name: impl Into<String>,
        xpath_context: XpathContext,
    ) -> Self {
        Self {
            kind,
            label: Some(label.into()),
            name: Some(name.into()),
            xpath_context,
            children: Vec::new(),
        }
    }

    /// Set the children
    #[inline]
    #[must_use]
    pub fn with_children(mut self, children: Vec<DisplayNode>) -> Self {
        self.children = children;
        self
    }

    /// Child groups, in order
    pub fn groups(&self) -> impl Iterator<Item = &DisplayGroup> {
        self.children.iter().filter_map(DisplayNode::as_group)
    }

    /// Child responses, in order
    pub fn responses(&self) -> impl Iterator<Item = &DisplayResponse> {
        self.children.iter().filter_map(DisplayNode::as_response)
    }

    /// First direct child with the given name
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&DisplayNode> {
        self.children.iter().find(|node| node.name() == Some(name))
    }

    /// Every response in the subtree, depth first
    #[must_use]
    pub fn flatten_responses(&self) -> Vec<&DisplayResponse> {
        let mut out = Vec::new();
        collect_responses(self, &mut out);
        out
    }
}

fn collect_responses<'a>(group: &'a DisplayGroup, out: &mut Vec<&'a DisplayResponse>) {
    for child in &group.children {
        match child {
            DisplayNode::Group(group) => collect_responses(group, out),
            DisplayNode::Response(response) => out.push(response),
        }
    }
}

/// One displayed answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayResponse {
    /// Row type (`None` for supplemental entries)
    pub question_type: Option<RowType>,

    pub label: String,

    /// Row name, or synthetic path for supplemental entries
    pub name: String,

    /// Exact xpath of this question instance
    pub xpath: Option<String>,

    /// Choice list to resolve the answer against
    pub list_name: Option<String>,

    /// Stored answer
    pub data: Option<Value>,
}

impl DisplayResponse {
    /// Whether this entry carries supplemental content
    #[inline]
    #[must_use]
    pub fn is_supplemental(&self) -> bool {
        self.question_type.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use survey_schema::XpathSegment;

    fn response(name: &str) -> DisplayResponse {
        DisplayResponse {
            question_type: Some(RowType::from("text")),
            label: name.to_uppercase(),
            name: name.into(),
            xpath: Some(name.into()),
            list_name: None,
            data: Some(json!("x")),
        }
    }

    #[test]
    fn flatten_is_depth_first() {
        let ctx = XpathContext::root().child(XpathSegment::group("g"));
        let tree = DisplayGroup::root().with_children(vec![
            response("a").into(),
            DisplayGroup::new(GroupKind::Regular, "G", "g", ctx)
                .with_children(vec![response("b").into()])
                .into(),
            response("c").into(),
        ]);

        let names: Vec<_> = tree.flatten_responses().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(tree.groups().count(), 1);
        assert_eq!(tree.responses().count(), 2);
        assert!(tree.child("g").and_then(DisplayNode::as_group).is_some());
    }

    #[test]
    fn serializes_tagged() {
        let value = serde_json::to_value(DisplayNode::from(response("q"))).unwrap();
        assert_eq!(value["node"], json!("response"));
        assert_eq!(value["question_type"], json!("text"));

        let root = serde_json::to_value(DisplayNode::from(DisplayGroup::root())).unwrap();
        assert_eq!(root["kind"], json!("root"));
        assert_eq!(root["xpath_context"], json!([]));
    }
}
