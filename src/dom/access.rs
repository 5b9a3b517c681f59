use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Handle to a node inside one document arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// DOM `nodeType` values the identity pass cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("node {0} does not exist in this document")]
    UnknownNode(NodeId),

    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("invalid attribute name '{0}'")]
    InvalidAttributeName(String),

    /// Failure reported by the underlying DOM implementation.
    #[error("{0}")]
    Platform(String),
}

/// The slice of the DOM API the identity pass runs against.
///
/// `Document` implements it for in-memory trees; callers that front a live browser (or
/// tests that need to inject failures) provide their own.
pub trait DomAccess {
    /// The document node itself.
    fn document(&self) -> NodeId;

    /// `document.body`, if the document has one.
    fn body(&self) -> Option<NodeId>;

    fn node_type(&self, node: NodeId) -> Result<NodeType, DomError>;

    fn parent_node(&self, node: NodeId) -> Result<Option<NodeId>, DomError>;

    fn previous_element_sibling(&self, node: NodeId) -> Result<Option<NodeId>, DomError>;

    /// 1 + the number of preceding element siblings sharing `node`'s local name, when the
    /// implementation can answer without a sibling walk. `None` makes callers count
    /// through `previous_element_sibling`.
    fn same_name_ordinal(&self, _node: NodeId) -> Option<usize> {
        None
    }

    /// `localName`; `None` when the platform hands back something that is not a string.
    fn local_name(&self, node: NodeId) -> Result<Option<String>, DomError>;

    /// `tagName` as the platform reports it (upper-cased for HTML elements).
    fn tag_name(&self, node: NodeId) -> String;

    fn get_attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, DomError>;

    /// `document.getElementById`: first element in light-tree order with that id.
    fn get_element_by_id(&self, id: &str) -> Option<NodeId>;

    fn child_nodes(&self, node: NodeId) -> Result<Vec<NodeId>, DomError>;

    fn shadow_root(&self, node: NodeId) -> Result<Option<NodeId>, DomError>;

    /// `root.querySelectorAll('*')`: descendant elements of `root` in tree order,
    /// without entering shadow trees.
    fn query_all_elements(&self, root: NodeId) -> Vec<NodeId>;

    /// The platform visibility check (`Element.checkVisibility()`).
    fn check_visibility(&self, node: NodeId) -> Result<bool, DomError>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError>;

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), DomError>;
}
