use std::fmt;

use crate::dom::access::{DomAccess, DomError, NodeId, NodeType};

/// Root-to-element structural path ("pseudo-XPath").
///
/// Segments are either `id("<id>")`, which ends the ascent, or `<localname>[<ordinal>]`.
/// The first segment is empty whenever the ascent ran off the element chain, so a
/// rendered path starts with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementPath {
    segments: Vec<String>,
}

impl ElementPath {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True when the path was cut short by a document-unique `id`.
    pub fn is_id_anchored(&self) -> bool {
        self.segments
            .first()
            .is_some_and(|s| s.starts_with("id(\""))
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// Derive the structural path of `node`.
///
/// Only failures on `node` itself are reported; an ancestor the DOM cannot describe ends
/// the path with an empty segment, same as reaching the document.
pub fn element_path<D: DomAccess + ?Sized>(dom: &D, node: NodeId) -> Result<ElementPath, DomError> {
    let mut reversed = Vec::new();
    let mut cursor = Some(node);

    // Iterative ascent; page-controlled depth must not grow the call stack.
    while let Some(current) = cursor {
        let is_self = current == node;
        match dom.node_type(current) {
            Ok(NodeType::Element) => {}
            Ok(_) => break,
            Err(e) if is_self => return Err(e),
            Err(_) => break,
        }

        let id = match dom.get_attribute(current, "id") {
            Ok(id) => id.filter(|id| !id.is_empty()),
            Err(e) if is_self => return Err(e),
            Err(_) => break,
        };
        if let Some(id) = id {
            if dom.get_element_by_id(&id) == Some(current) {
                reversed.push(format!("id(\"{id}\")"));
                reversed.reverse();
                return Ok(ElementPath { segments: reversed });
            }
        }

        let local_name = match dom.local_name(current) {
            Ok(name) => name,
            Err(e) if is_self => return Err(e),
            Err(_) => break,
        };
        let ordinal = sibling_ordinal(dom, current, local_name.as_deref());
        let name = local_name
            .map(|n| n.to_lowercase())
            .unwrap_or_else(|| "unknown".to_string());
        reversed.push(format!("{name}[{ordinal}]"));

        cursor = match dom.parent_node(current) {
            Ok(parent) => parent,
            Err(e) if is_self => return Err(e),
            Err(_) => None,
        };
    }

    reversed.push(String::new());
    reversed.reverse();
    Ok(ElementPath { segments: reversed })
}

/// 1 + number of preceding element siblings sharing `local_name`.
/// A sibling chain the DOM cannot walk simply stops the count.
fn sibling_ordinal<D: DomAccess + ?Sized>(dom: &D, node: NodeId, local_name: Option<&str>) -> usize {
    if let Some(ordinal) = dom.same_name_ordinal(node) {
        return ordinal;
    }
    let mut ordinal = 1;
    let mut sibling = dom.previous_element_sibling(node).ok().flatten();
    while let Some(current) = sibling {
        if let Ok(name) = dom.local_name(current) {
            if name.as_deref() == local_name {
                ordinal += 1;
            }
        }
        sibling = dom.previous_element_sibling(current).ok().flatten();
    }
    ordinal
}
