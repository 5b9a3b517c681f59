use serde::{Deserialize, Serialize};

use crate::dom::access::{DomAccess, NodeId};
use crate::dom::dom_model::{Document, NodeData};
use crate::identity::D_ID_ATTRIBUTE;

/// Elements carrying this marker keep their attributes untouched.
pub const INTERACTABLE_MARKER: &str = "is-interactable-d_id";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripOptions {
    #[serde(default = "default_max_attribute_len")]
    pub max_attribute_len: usize,

    #[serde(default = "default_drop_tags")]
    pub drop_tags: Vec<String>,

    #[serde(default = "default_true")]
    pub keep_ids: bool,
}

impl Default for StripOptions {
    fn default() -> Self {
        Self {
            max_attribute_len: default_max_attribute_len(),
            drop_tags: default_drop_tags(),
            keep_ids: true,
        }
    }
}

fn default_max_attribute_len() -> usize {
    100
}

fn default_true() -> bool {
    true
}

fn default_drop_tags() -> Vec<String> {
    ["head", "script", "style", "path", "polygon", "defs", "svg", "br"]
        .iter()
        .map(|t| t.to_string())
        .collect()
}

/// Return a reduced copy of `doc` suited for downstream consumers.
pub fn mild_strip(doc: &Document, options: &StripOptions) -> Document {
    let mut stripped = doc.clone();
    mild_strip_in_place(&mut stripped, options);
    stripped
}

/// Drop comments, doctypes and noise elements, then shorten attribute values.
/// Frame documents are stripped too.
pub fn mild_strip_in_place(doc: &mut Document, options: &StripOptions) {
    let mut removed = 0usize;
    for id in doc.composed_nodes() {
        let drop = match doc.node(id).map(|n| &n.data) {
            Ok(NodeData::Comment(_)) | Ok(NodeData::Doctype(_)) => true,
            Ok(NodeData::Element(el)) => el.local_name.as_deref().is_some_and(|name| {
                options
                    .drop_tags
                    .iter()
                    .any(|tag| tag.eq_ignore_ascii_case(name))
            }),
            _ => false,
        };
        // Descendants of an already detached subtree are skipped by the connected check.
        if drop && doc.is_connected(id) && doc.detach(id).is_ok() {
            removed += 1;
        }
    }

    let elements = doc.composed_elements();
    for &id in &elements {
        shorten_attributes(doc, id, options);
    }

    let frames: Vec<NodeId> = elements
        .into_iter()
        .filter(|&id| doc.frame(id).is_some())
        .collect();
    for iframe in frames {
        if let Some(frame) = doc.frame_mut(iframe) {
            mild_strip_in_place(frame, options);
        }
    }

    tracing::debug!(removed, "stripped snapshot");
}

fn shorten_attributes(doc: &mut Document, id: NodeId, options: &StripOptions) {
    let Ok(el) = doc.element_mut(id) else { return };
    if el.attribute(INTERACTABLE_MARKER) != Some("true") {
        for (_, value) in el.attributes.iter_mut() {
            if value.chars().count() > options.max_attribute_len {
                *value = value.chars().take(options.max_attribute_len).collect();
            }
        }
    }
    if !options.keep_ids {
        let _ = doc.remove_attribute(id, D_ID_ATTRIBUTE);
    }
}
