use crate::dom::access::NodeId;
use crate::dom::dom_model::Document;
use crate::identity::frames::frame_document;
use crate::identity::{D_ID_ATTRIBUTE, HIDDEN_ATTRIBUTE, HIDDEN_SENTINEL};

/// Element carrying `d_id`, shadow trees included.
pub fn find_by_d_id(doc: &Document, d_id: &str) -> Option<NodeId> {
    doc.composed_elements()
        .into_iter()
        .find(|&id| doc.attribute(id, D_ID_ATTRIBUTE) == Some(d_id))
}

/// Element carrying `d_id` inside the frame addressed by `frame_path`.
pub fn find_in_frame<'a>(
    doc: &'a Document,
    frame_path: &str,
    d_id: &str,
) -> Option<(&'a Document, NodeId)> {
    let frame = frame_document(doc, frame_path)?;
    find_by_d_id(frame, d_id).map(|node| (frame, node))
}

/// d-ids of elements marked hidden by the last pass. `<html>` and `<body>` are never
/// reported.
pub fn invisible_ids(doc: &Document) -> Vec<String> {
    doc.composed_elements()
        .into_iter()
        .filter(|&id| doc.attribute(id, HIDDEN_ATTRIBUTE) == Some(HIDDEN_SENTINEL))
        .filter(|&id| {
            doc.element(id)
                .ok()
                .and_then(|el| el.local_name.as_deref())
                .is_none_or(|name| {
                    !name.eq_ignore_ascii_case("html") && !name.eq_ignore_ascii_case("body")
                })
        })
        .filter_map(|id| doc.attribute(id, D_ID_ATTRIBUTE).map(str::to_string))
        .collect()
}

/// XPath selecting the element with `d_id`.
pub fn d_id_xpath(d_id: &str) -> String {
    format!("//*[@{D_ID_ATTRIBUTE}='{d_id}']")
}

/// One iframe selector per segment of a frame path, outermost first.
pub fn frame_selectors(frame_path: &str) -> Vec<String> {
    frame_path
        .split('|')
        .filter(|s| !s.is_empty())
        .map(|segment| format!("//iframe[@{D_ID_ATTRIBUTE}='{segment}']"))
        .collect()
}
