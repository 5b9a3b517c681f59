use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dom::access::{DomAccess, DomError, NodeId};
use crate::dom::dom_model::{Document, ElementData, NodeData, ShadowRootMode};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to access snapshot file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("snapshot has no nodes")]
    Empty,

    #[error("malformed snapshot node {index}: {reason}")]
    Malformed { index: usize, reason: String },

    #[error(transparent)]
    Dom(#[from] DomError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotKind {
    Document,
    Doctype,
    Element,
    Text,
    Comment,
    ShadowRoot,
}

/// One node of a flattened DOM snapshot.
///
/// Nodes are listed in pre-order: a node's `parent` (or, for shadow roots, `host`) always
/// has a smaller index, and siblings appear in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub kind: SnapshotKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<usize>,
    /// Local name for elements, doctype name for doctypes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ShadowRootMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<u64>,
    /// Content document of an `<iframe>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<Box<DomSnapshot>>,
}

impl SnapshotNode {
    fn new(kind: SnapshotKind) -> Self {
        Self {
            kind,
            parent: None,
            host: None,
            name: None,
            attributes: Vec::new(),
            text: None,
            mode: None,
            visible: None,
            handle: None,
            frame: None,
        }
    }
}

/// Serialized DOM as produced by the browser-side extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub title: String,
    pub nodes: Vec<SnapshotNode>,
}

impl DomSnapshot {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &str) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(Path::new(path)).map_err(|source| {
            SnapshotError::Io {
                path: path.to_string(),
                source,
            }
        })?;
        Self::from_json(&content)
    }

    pub fn save(&self, path: &str) -> Result<(), SnapshotError> {
        std::fs::write(path, self.to_json_pretty()?).map_err(|source| SnapshotError::Io {
            path: path.to_string(),
            source,
        })
    }

    /// Rebuild the document. Frames become nested content documents.
    pub fn to_document(&self) -> Result<Document, SnapshotError> {
        let first = self.nodes.first().ok_or(SnapshotError::Empty)?;
        if first.kind != SnapshotKind::Document {
            return Err(malformed(0, "first node must be the document"));
        }

        let mut doc = Document::new();
        doc.url = self.url.clone();
        doc.title = self.title.clone();

        // Snapshot index -> arena id.
        let mut ids: Vec<NodeId> = Vec::with_capacity(self.nodes.len());
        ids.push(doc.document());

        for (index, node) in self.nodes.iter().enumerate().skip(1) {
            let id = match node.kind {
                SnapshotKind::Document => {
                    return Err(malformed(index, "only the first node may be a document"));
                }
                SnapshotKind::ShadowRoot => {
                    let host = lookup(&ids, index, node.host, "shadow root without a host")?;
                    doc.attach_shadow(host, node.mode.unwrap_or_default())
                        .map_err(|e| malformed(index, &e.to_string()))?
                }
                kind => {
                    let id = match kind {
                        SnapshotKind::Element => {
                            let id = match &node.name {
                                Some(name) => doc.create_element(name),
                                None => doc.create_unnamed_element(),
                            };
                            let el = doc.element_mut(id)?;
                            el.attributes = node.attributes.clone();
                            el.reported_visible = node.visible;
                            el.handle = node.handle;
                            id
                        }
                        SnapshotKind::Doctype => {
                            doc.create_doctype(node.name.as_deref().unwrap_or("html"))
                        }
                        SnapshotKind::Comment => {
                            doc.create_comment(node.text.as_deref().unwrap_or_default())
                        }
                        _ => doc.create_text(node.text.as_deref().unwrap_or_default()),
                    };
                    let parent = lookup(&ids, index, node.parent, "node without a parent")?;
                    doc.append_child(parent, id)
                        .map_err(|e| malformed(index, &e.to_string()))?;
                    id
                }
            };

            if let Some(frame) = &node.frame {
                doc.set_frame(id, frame.to_document()?)
                    .map_err(|e| malformed(index, &e.to_string()))?;
            }
            ids.push(id);
        }

        Ok(doc)
    }

    /// Serialize the connected part of a document; detached nodes are dropped.
    pub fn from_document(doc: &Document) -> Self {
        let order = doc.composed_nodes();
        let index_of: HashMap<NodeId, usize> =
            order.iter().enumerate().map(|(i, &id)| (id, i)).collect();

        let nodes = order
            .iter()
            .filter_map(|&id| {
                let node = doc.node(id).ok()?;
                let mut out = match &node.data {
                    NodeData::Document => SnapshotNode::new(SnapshotKind::Document),
                    NodeData::Doctype(name) => SnapshotNode {
                        name: Some(name.clone()),
                        ..SnapshotNode::new(SnapshotKind::Doctype)
                    },
                    NodeData::Text(text) => SnapshotNode {
                        text: Some(text.clone()),
                        ..SnapshotNode::new(SnapshotKind::Text)
                    },
                    NodeData::Comment(text) => SnapshotNode {
                        text: Some(text.clone()),
                        ..SnapshotNode::new(SnapshotKind::Comment)
                    },
                    NodeData::ShadowRoot { host, mode } => SnapshotNode {
                        host: index_of.get(host).copied(),
                        mode: Some(*mode),
                        ..SnapshotNode::new(SnapshotKind::ShadowRoot)
                    },
                    NodeData::Element(el) => element_node(el),
                };
                out.parent = node.parent.and_then(|p| index_of.get(&p).copied());
                out.frame = doc
                    .frame(id)
                    .map(|frame| Box::new(DomSnapshot::from_document(frame)));
                Some(out)
            })
            .collect();

        DomSnapshot {
            url: doc.url.clone(),
            title: doc.title.clone(),
            nodes,
        }
    }
}

fn element_node(el: &ElementData) -> SnapshotNode {
    SnapshotNode {
        name: el.local_name.clone(),
        attributes: el.attributes.clone(),
        visible: el.reported_visible,
        handle: el.handle,
        ..SnapshotNode::new(SnapshotKind::Element)
    }
}

fn lookup(
    ids: &[NodeId],
    index: usize,
    reference: Option<usize>,
    missing: &str,
) -> Result<NodeId, SnapshotError> {
    let reference = reference.ok_or_else(|| malformed(index, missing))?;
    if reference >= index {
        return Err(malformed(
            index,
            &format!("reference {reference} does not precede the node"),
        ));
    }
    ids.get(reference)
        .copied()
        .ok_or_else(|| malformed(index, &format!("unknown reference {reference}")))
}

fn malformed(index: usize, reason: &str) -> SnapshotError {
    SnapshotError::Malformed {
        index,
        reason: reason.to_string(),
    }
}
