use std::collections::HashSet;

use element_ids::dom::{DomAccess, DomError, Document, NodeId, NodeType};

/// Wraps a `Document` and fails chosen DOM calls on chosen nodes, the way a hostile or
/// half-torn-down page can.
pub struct FaultyDom {
    pub doc: Document,
    pub fail_visibility: HashSet<NodeId>,
    pub fail_local_name: HashSet<NodeId>,
    pub fail_parent: HashSet<NodeId>,
    pub fail_children: HashSet<NodeId>,
    /// `(node, attribute)` pairs whose `setAttribute` throws.
    pub fail_writes: HashSet<(NodeId, String)>,
}

impl FaultyDom {
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            fail_visibility: HashSet::new(),
            fail_local_name: HashSet::new(),
            fail_parent: HashSet::new(),
            fail_children: HashSet::new(),
            fail_writes: HashSet::new(),
        }
    }
}

fn boom(call: &str, node: NodeId) -> DomError {
    DomError::Platform(format!("{call} threw on {node}"))
}

impl DomAccess for FaultyDom {
    fn document(&self) -> NodeId {
        self.doc.document()
    }

    fn body(&self) -> Option<NodeId> {
        self.doc.body()
    }

    fn node_type(&self, node: NodeId) -> Result<NodeType, DomError> {
        self.doc.node_type(node)
    }

    fn parent_node(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        if self.fail_parent.contains(&node) {
            return Err(boom("parentNode", node));
        }
        self.doc.parent_node(node)
    }

    fn previous_element_sibling(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        self.doc.previous_element_sibling(node)
    }

    fn local_name(&self, node: NodeId) -> Result<Option<String>, DomError> {
        if self.fail_local_name.contains(&node) {
            return Err(boom("localName", node));
        }
        self.doc.local_name(node)
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.doc.tag_name(node)
    }

    fn get_attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, DomError> {
        self.doc.get_attribute(node, name)
    }

    fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.doc.get_element_by_id(id)
    }

    fn child_nodes(&self, node: NodeId) -> Result<Vec<NodeId>, DomError> {
        if self.fail_children.contains(&node) {
            return Err(boom("childNodes", node));
        }
        self.doc.child_nodes(node)
    }

    fn shadow_root(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        self.doc.shadow_root(node)
    }

    fn query_all_elements(&self, root: NodeId) -> Vec<NodeId> {
        self.doc.query_all_elements(root)
    }

    fn check_visibility(&self, node: NodeId) -> Result<bool, DomError> {
        if self.fail_visibility.contains(&node) {
            return Err(boom("checkVisibility", node));
        }
        self.doc.check_visibility(node)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        if self.fail_writes.contains(&(node, name.to_string())) {
            return Err(boom("setAttribute", node));
        }
        self.doc.set_attribute(node, name, value)
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), DomError> {
        self.doc.remove_attribute(node, name)
    }
}
