use std::cell::OnceCell;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::dom::access::{DomAccess, DomError, NodeId, NodeType};
use crate::dom::visibility;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowRootMode {
    #[default]
    Open,
    Closed,
}

#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Doctype(String),
    Element(ElementData),
    Text(String),
    Comment(String),
    ShadowRoot { host: NodeId, mode: ShadowRootMode },
}

#[derive(Debug, Clone, Default)]
pub struct ElementData {
    /// `None` models a platform element whose `localName` is not a string.
    pub local_name: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub shadow_root: Option<NodeId>,
    /// Visibility as reported by the browser-side extractor, if any.
    pub reported_visible: Option<bool>,
    /// Extractor-assigned handle used to patch attributes back into a live page.
    pub handle: Option<u64>,
}

impl ElementData {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Arena-backed DOM document.
///
/// Node `0` is always the document node. Nodes created with `create_*` start detached;
/// `append_child` / `insert_before` link them into the tree. Shadow roots hang off their
/// host through `ElementData::shadow_root` and have no parent, as in the platform DOM.
/// `<iframe>` elements may own a nested content document.
#[derive(Debug, Clone)]
pub struct Document {
    pub url: Option<String>,
    pub title: String,
    nodes: Vec<Node>,
    frames: BTreeMap<NodeId, Document>,
    index: OnceCell<TreeIndex>,
}

/// Lookups derived from the tree, built on first use and dropped by any edit that could
/// change them.
#[derive(Debug, Clone, Default)]
struct TreeIndex {
    /// Position of every parented node among its parent's children.
    positions: HashMap<NodeId, usize>,
    /// 1 + preceding element siblings with the same local name.
    ordinals: HashMap<NodeId, usize>,
    /// First holder of each non-empty id, in light-tree order.
    ids: HashMap<String, NodeId>,
}

impl TreeIndex {
    fn build(doc: &Document) -> Self {
        let mut index = TreeIndex::default();
        for node in &doc.nodes {
            let mut names: HashMap<Option<&str>, usize> = HashMap::new();
            for (position, &child) in node.children.iter().enumerate() {
                index.positions.insert(child, position);
                if let Ok(el) = doc.element(child) {
                    let count = names.entry(el.local_name.as_deref()).or_insert(0);
                    *count += 1;
                    index.ordinals.insert(child, *count);
                }
            }
        }
        for el in doc.query_all_elements(doc.document()) {
            if let Some(id) = doc.attribute(el, "id").filter(|id| !id.is_empty()) {
                index.ids.entry(id.to_string()).or_insert(el);
            }
        }
        index
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            url: None,
            title: String::new(),
            nodes: vec![Node {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
            frames: BTreeMap::new(),
            index: OnceCell::new(),
        }
    }

    fn tree_index(&self) -> &TreeIndex {
        self.index.get_or_init(|| TreeIndex::build(self))
    }

    /// Number of nodes in the arena, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes.get(id.0).ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.index.take();
        self.nodes.get_mut(id.0).ok_or(DomError::UnknownNode(id))
    }

    pub fn element(&self, id: NodeId) -> Result<&ElementData, DomError> {
        match &self.node(id)?.data {
            NodeData::Element(el) => Ok(el),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    /// Mutable element access. The caller may rename the element or rewrite its ids, so
    /// the tree index is dropped.
    pub fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        self.index.take();
        self.element_data_mut(id)
    }

    /// Mutable access that leaves the tree index alone; callers must not touch `id`
    /// attributes or the local name through it.
    fn element_data_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.data) {
            Some(NodeData::Element(el)) => Ok(el),
            Some(_) => Err(DomError::NotAnElement(id)),
            None => Err(DomError::UnknownNode(id)),
        }
    }

    /// Attribute lookup that treats unknown nodes and non-elements as "no attribute".
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).ok().and_then(|el| el.attribute(name))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn create_element(&mut self, local_name: &str) -> NodeId {
        self.push(NodeData::Element(ElementData {
            local_name: Some(local_name.to_string()),
            ..ElementData::default()
        }))
    }

    /// Element whose `localName` the platform could not report.
    pub fn create_unnamed_element(&mut self) -> NodeId {
        self.push(NodeData::Element(ElementData::default()))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Comment(text.to_string()))
    }

    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        self.push(NodeData::Doctype(name.to_string()))
    }

    fn can_have_children(&self, id: NodeId) -> Result<bool, DomError> {
        Ok(matches!(
            self.node(id)?.data,
            NodeData::Document | NodeData::Element(_) | NodeData::ShadowRoot { .. }
        ))
    }

    fn check_insertion(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if !self.can_have_children(parent)? {
            return Err(DomError::Platform(format!("node {parent} cannot have children")));
        }
        if matches!(
            self.node(child)?.data,
            NodeData::Document | NodeData::ShadowRoot { .. }
        ) {
            return Err(DomError::Platform(format!("node {child} cannot be inserted")));
        }
        // Refuse cycles: the parent must not sit inside the child's subtree.
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                return Err(DomError::Platform(format!(
                    "inserting {child} under {parent} would create a cycle"
                )));
            }
            cursor = self.node(current)?.parent;
        }
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insertion(parent, child)?;
        self.detach(child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Insert `child` before `reference` (which must be a child of `parent`).
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        self.check_insertion(parent, child)?;
        self.detach(child)?;
        let children = &mut self.node_mut(parent)?.children;
        let position = children.iter().position(|&c| c == reference).ok_or_else(|| {
            DomError::Platform(format!("{reference} is not a child of {parent}"))
        })?;
        children.insert(position, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Unlink a node (and its subtree) from its parent. The node stays in the arena.
    pub fn detach(&mut self, node: NodeId) -> Result<(), DomError> {
        if let Some(parent) = self.node(node)?.parent {
            self.node_mut(parent)?.children.retain(|&c| c != node);
            self.node_mut(node)?.parent = None;
        }
        Ok(())
    }

    /// Create and append an element in one step.
    pub fn append_element(&mut self, parent: NodeId, local_name: &str) -> Result<NodeId, DomError> {
        let el = self.create_element(local_name);
        self.append_child(parent, el)?;
        Ok(el)
    }

    pub fn append_element_with(
        &mut self,
        parent: NodeId,
        local_name: &str,
        attributes: &[(&str, &str)],
    ) -> Result<NodeId, DomError> {
        let el = self.append_element(parent, local_name)?;
        for (name, value) in attributes {
            self.set_attribute(el, name, value)?;
        }
        Ok(el)
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, DomError> {
        let node = self.create_text(text);
        self.append_child(parent, node)?;
        Ok(node)
    }

    pub fn attach_shadow(&mut self, host: NodeId, mode: ShadowRootMode) -> Result<NodeId, DomError> {
        if self.element(host)?.shadow_root.is_some() {
            return Err(DomError::Platform(format!("{host} already hosts a shadow root")));
        }
        let root = self.push(NodeData::ShadowRoot { host, mode });
        self.element_mut(host)?.shadow_root = Some(root);
        Ok(root)
    }

    pub fn shadow_host(&self, root: NodeId) -> Option<NodeId> {
        match self.node(root).ok()?.data {
            NodeData::ShadowRoot { host, .. } => Some(host),
            _ => None,
        }
    }

    pub fn set_frame(&mut self, iframe: NodeId, content: Document) -> Result<(), DomError> {
        self.element(iframe)?;
        self.frames.insert(iframe, content);
        Ok(())
    }

    pub fn frame(&self, iframe: NodeId) -> Option<&Document> {
        self.frames.get(&iframe)
    }

    pub fn frame_mut(&mut self, iframe: NodeId) -> Option<&mut Document> {
        self.frames.get_mut(&iframe)
    }

    pub fn set_reported_visibility(
        &mut self,
        node: NodeId,
        visible: Option<bool>,
    ) -> Result<(), DomError> {
        self.element_data_mut(node)?.reported_visible = visible;
        Ok(())
    }

    /// Parent in the flat tree: shadow root children step out to the host.
    pub fn flat_tree_parent(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.node(node).ok()?.parent?;
        match self.shadow_host(parent) {
            Some(host) => Some(host),
            None => Some(parent),
        }
    }

    /// Whether the node is reachable from the document, through shadow hosts if needed.
    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        let mut steps = 0;
        while let Some(current) = cursor {
            if current == self.document() {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            cursor = match self.node(current) {
                Ok(n) => n.parent.or_else(|| self.shadow_host(current)),
                Err(_) => None,
            };
        }
        false
    }

    /// Every connected node in composed pre-order: a host, then its shadow tree, then its
    /// light children.
    pub fn composed_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.document()];
        while let Some(id) = stack.pop() {
            out.push(id);
            let Ok(node) = self.node(id) else { continue };
            stack.extend(node.children.iter().rev().copied());
            if let NodeData::Element(el) = &node.data {
                if let Some(root) = el.shadow_root {
                    stack.push(root);
                }
            }
        }
        out
    }

    /// Connected elements in composed pre-order, shadow trees included.
    pub fn composed_elements(&self) -> Vec<NodeId> {
        self.composed_nodes()
            .into_iter()
            .filter(|&id| self.element(id).is_ok())
            .collect()
    }

    fn document_element(&self) -> Option<NodeId> {
        self.nodes[0]
            .children
            .iter()
            .copied()
            .find(|&c| self.element(c).is_ok())
    }
}

fn valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '>' | '/' | '=' | '\0'))
}

impl DomAccess for Document {
    fn document(&self) -> NodeId {
        NodeId(0)
    }

    fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.node(html).ok()?.children.iter().copied().find(|&c| {
            self.element(c)
                .ok()
                .and_then(|el| el.local_name.as_deref())
                .is_some_and(|name| name.eq_ignore_ascii_case("body"))
        })
    }

    fn node_type(&self, node: NodeId) -> Result<NodeType, DomError> {
        Ok(match self.node(node)?.data {
            NodeData::Document => NodeType::Document,
            NodeData::Doctype(_) => NodeType::DocumentType,
            NodeData::Element(_) => NodeType::Element,
            NodeData::Text(_) => NodeType::Text,
            NodeData::Comment(_) => NodeType::Comment,
            NodeData::ShadowRoot { .. } => NodeType::DocumentFragment,
        })
    }

    fn parent_node(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        Ok(self.node(node)?.parent)
    }

    fn previous_element_sibling(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        let Some(parent) = self.node(node)?.parent else {
            return Ok(None);
        };
        let Some(&position) = self.tree_index().positions.get(&node) else {
            return Ok(None);
        };
        let siblings = &self.node(parent)?.children;
        Ok(siblings
            .get(..position)
            .unwrap_or_default()
            .iter()
            .rev()
            .copied()
            .find(|&c| self.element(c).is_ok()))
    }

    fn local_name(&self, node: NodeId) -> Result<Option<String>, DomError> {
        Ok(self.element(node)?.local_name.clone())
    }

    fn tag_name(&self, node: NodeId) -> String {
        match self.node(node).map(|n| &n.data) {
            Ok(NodeData::Element(el)) => el
                .local_name
                .as_deref()
                .map(str::to_ascii_uppercase)
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            Ok(NodeData::Document) => "#document".to_string(),
            Ok(NodeData::Doctype(name)) => name.clone(),
            Ok(NodeData::Text(_)) => "#text".to_string(),
            Ok(NodeData::Comment(_)) => "#comment".to_string(),
            Ok(NodeData::ShadowRoot { .. }) => "#document-fragment".to_string(),
            Err(_) => "UNKNOWN".to_string(),
        }
    }

    fn get_attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, DomError> {
        Ok(self.element(node)?.attribute(name).map(str::to_string))
    }

    fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree_index().ids.get(id).copied()
    }

    fn same_name_ordinal(&self, node: NodeId) -> Option<usize> {
        // Detached elements count as first of their name.
        self.node(node).ok()?;
        Some(self.tree_index().ordinals.get(&node).copied().unwrap_or(1))
    }

    fn child_nodes(&self, node: NodeId) -> Result<Vec<NodeId>, DomError> {
        Ok(self.node(node)?.children.clone())
    }

    fn shadow_root(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        match &self.node(node)?.data {
            NodeData::Element(el) => Ok(el.shadow_root),
            _ => Ok(None),
        }
    }

    fn query_all_elements(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let Ok(start) = self.node(root) else {
            return out;
        };
        let mut stack: Vec<NodeId> = start.children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Ok(node) = self.node(id) else { continue };
            if matches!(node.data, NodeData::Element(_)) {
                out.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    fn check_visibility(&self, node: NodeId) -> Result<bool, DomError> {
        visibility::check_visibility(self, node)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        if !valid_attribute_name(name) {
            return Err(DomError::InvalidAttributeName(name.to_string()));
        }
        if name == "id" {
            self.index.take();
        }
        let el = self.element_data_mut(node)?;
        match el.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => el.attributes.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), DomError> {
        if name == "id" {
            self.index.take();
        }
        self.element_data_mut(node)?.attributes.retain(|(k, _)| k != name);
        Ok(())
    }
}
