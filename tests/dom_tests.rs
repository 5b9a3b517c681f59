mod common;

use element_ids::dom::{DomAccess, DomError, Document, NodeType, ShadowRootMode};

use crate::common::{list_page, shadow_page};

// ============================================================================
// Tree construction
// ============================================================================

#[test]
fn body_is_found_under_the_document_element() {
    let page = list_page(1);
    assert_eq!(page.doc.body(), Some(page.body));
    assert_eq!(Document::new().body(), None);
}

#[test]
fn node_types_follow_platform_values() {
    let mut page = shadow_page();
    let text = page.doc.append_text(page.body, "hi").unwrap();
    let doctype = page.doc.create_doctype("html");

    assert_eq!(page.doc.node_type(page.doc.document()), Ok(NodeType::Document));
    assert_eq!(page.doc.node_type(page.host), Ok(NodeType::Element));
    assert_eq!(page.doc.node_type(page.shadow), Ok(NodeType::DocumentFragment));
    assert_eq!(page.doc.node_type(text), Ok(NodeType::Text));
    assert_eq!(page.doc.node_type(doctype), Ok(NodeType::DocumentType));
    assert_eq!(NodeType::Element as u8, 1);
}

#[test]
fn tag_name_is_upper_cased() {
    let mut doc = Document::new();
    let div = doc.create_element("div");
    let unnamed = doc.create_unnamed_element();

    assert_eq!(doc.tag_name(div), "DIV");
    assert_eq!(doc.tag_name(unnamed), "UNKNOWN");
    assert_eq!(doc.local_name(unnamed), Ok(None));
}

#[test]
fn appending_an_ancestor_is_refused() {
    let mut page = list_page(1);
    let err = page.doc.append_child(page.items[0], page.body).unwrap_err();
    assert!(matches!(err, DomError::Platform(_)));
    // The tree is untouched.
    assert_eq!(page.doc.parent_node(page.body), Ok(Some(page.html)));
}

#[test]
fn append_moves_a_node_between_parents() {
    let mut page = list_page(2);
    page.doc.append_child(page.body, page.items[0]).unwrap();

    assert_eq!(page.doc.parent_node(page.items[0]), Ok(Some(page.body)));
    assert_eq!(page.doc.previous_element_sibling(page.items[1]), Ok(None));
    assert_eq!(page.doc.previous_element_sibling(page.items[0]), Ok(Some(page.ul)));
}

#[test]
fn insert_before_places_the_node() {
    let mut page = list_page(2);
    let li = page.doc.create_element("li");
    page.doc.insert_before(page.ul, li, page.items[1]).unwrap();

    assert_eq!(page.doc.previous_element_sibling(page.items[1]), Ok(Some(li)));
    assert_eq!(page.doc.previous_element_sibling(li), Ok(Some(page.items[0])));
}

#[test]
fn detach_disconnects_the_subtree() {
    let mut page = list_page(2);
    page.doc.detach(page.ul).unwrap();

    assert!(!page.doc.is_connected(page.items[0]));
    assert_eq!(page.doc.composed_elements().len(), 3);
    assert_eq!(page.doc.query_all_elements(page.doc.document()).len(), 3);
}

#[test]
fn a_host_takes_one_shadow_root() {
    let mut page = shadow_page();
    assert!(page.doc.attach_shadow(page.host, ShadowRootMode::Open).is_err());
    assert_eq!(page.doc.shadow_root(page.host), Ok(Some(page.shadow)));
    assert_eq!(page.doc.shadow_host(page.shadow), Some(page.host));
    assert_eq!(page.doc.parent_node(page.shadow), Ok(None));
}

#[test]
fn invalid_attribute_names_are_rejected() {
    let mut page = list_page(1);
    let err = page.doc.set_attribute(page.ul, "bad name", "x").unwrap_err();
    assert_eq!(err, DomError::InvalidAttributeName("bad name".into()));
    assert!(page.doc.set_attribute(page.ul, "", "x").is_err());
}

#[test]
fn set_attribute_overwrites_in_place() {
    let mut page = list_page(1);
    page.doc.set_attribute(page.ul, "class", "a").unwrap();
    page.doc.set_attribute(page.ul, "id", "list").unwrap();
    page.doc.set_attribute(page.ul, "class", "b").unwrap();

    let el = page.doc.element(page.ul).unwrap();
    assert_eq!(
        el.attributes,
        vec![("class".to_string(), "b".to_string()), ("id".to_string(), "list".to_string())]
    );
}

#[test]
fn attribute_calls_on_text_nodes_fail() {
    let mut page = list_page(1);
    let text = page.doc.child_nodes(page.items[0]).unwrap()[0];
    assert_eq!(page.doc.get_attribute(text, "id"), Err(DomError::NotAnElement(text)));
    assert!(page.doc.set_attribute(text, "d-id", "x").is_err());
}

// ============================================================================
// Traversal helpers
// ============================================================================

#[test]
fn get_element_by_id_returns_first_light_tree_match() {
    let mut page = shadow_page();
    page.doc.set_attribute(page.inner_div, "id", "x").unwrap();
    assert_eq!(page.doc.get_element_by_id("x"), None);

    page.doc.set_attribute(page.after, "id", "x").unwrap();
    page.doc.set_attribute(page.light_p, "id", "x").unwrap();
    assert_eq!(page.doc.get_element_by_id("x"), Some(page.light_p));
    assert_eq!(page.doc.get_element_by_id(""), None);
}

#[test]
fn id_lookup_follows_later_edits() {
    let mut page = list_page(3);
    page.doc.set_attribute(page.items[2], "id", "row").unwrap();
    assert_eq!(page.doc.get_element_by_id("row"), Some(page.items[2]));

    // An earlier holder takes over.
    page.doc.set_attribute(page.items[0], "id", "row").unwrap();
    assert_eq!(page.doc.get_element_by_id("row"), Some(page.items[0]));

    page.doc.remove_attribute(page.items[0], "id").unwrap();
    assert_eq!(page.doc.get_element_by_id("row"), Some(page.items[2]));

    page.doc.detach(page.items[2]).unwrap();
    assert_eq!(page.doc.get_element_by_id("row"), None);

    page.doc.element_mut(page.ul).unwrap().attributes.push(("id".into(), "row".into()));
    assert_eq!(page.doc.get_element_by_id("row"), Some(page.ul));
}

#[test]
fn sibling_lookups_follow_tree_edits() {
    let mut page = list_page(3);
    assert_eq!(page.doc.previous_element_sibling(page.items[2]).unwrap(), Some(page.items[1]));
    assert_eq!(page.doc.same_name_ordinal(page.items[2]), Some(3));

    let p = page.doc.create_element("p");
    page.doc.insert_before(page.ul, p, page.items[1]).unwrap();
    page.doc.append_text(page.ul, "trailing").unwrap();
    assert_eq!(page.doc.previous_element_sibling(page.items[1]).unwrap(), Some(p));
    assert_eq!(page.doc.previous_element_sibling(p).unwrap(), Some(page.items[0]));
    assert_eq!(page.doc.same_name_ordinal(page.items[2]), Some(3));
    assert_eq!(page.doc.same_name_ordinal(p), Some(1));

    page.doc.detach(page.items[0]).unwrap();
    assert_eq!(page.doc.previous_element_sibling(p).unwrap(), None);
    assert_eq!(page.doc.previous_element_sibling(page.items[0]).unwrap(), None);
    assert_eq!(page.doc.same_name_ordinal(page.items[2]), Some(2));
    assert_eq!(page.doc.same_name_ordinal(page.items[0]), Some(1));

    page.doc.element_mut(page.items[1]).unwrap().local_name = Some("p".into());
    assert_eq!(page.doc.same_name_ordinal(page.items[1]), Some(2));
    assert_eq!(page.doc.same_name_ordinal(page.items[2]), Some(1));
}

#[test]
fn query_all_does_not_enter_shadow_trees() {
    let page = shadow_page();
    let light = page.doc.query_all_elements(page.doc.document());
    assert!(!light.contains(&page.inner_div));
    assert_eq!(page.doc.query_all_elements(page.shadow), vec![page.inner_div, page.inner_span]);
}

#[test]
fn composed_order_visits_shadow_tree_after_host() {
    let page = shadow_page();
    let order = page.doc.composed_elements();
    let pos = |n| order.iter().position(|&x| x == n).unwrap();

    assert!(pos(page.host) < pos(page.inner_div));
    assert!(pos(page.inner_span) < pos(page.light_p));
    assert!(pos(page.light_p) < pos(page.after));
}

// ============================================================================
// Visibility
// ============================================================================

#[test]
fn plain_elements_are_visible() {
    let page = list_page(1);
    assert_eq!(page.doc.check_visibility(page.items[0]), Ok(true));
    assert_eq!(page.doc.check_visibility(page.head), Ok(false));
}

#[test]
fn display_none_hides_descendants() {
    let mut page = list_page(1);
    page.doc.set_attribute(page.ul, "style", "color: red; display:none").unwrap();
    assert_eq!(page.doc.check_visibility(page.items[0]), Ok(false));
}

#[test]
fn nearest_visibility_declaration_wins() {
    let mut page = list_page(1);
    page.doc.set_attribute(page.ul, "style", "visibility: hidden").unwrap();
    assert_eq!(page.doc.check_visibility(page.items[0]), Ok(false));

    page.doc
        .set_attribute(page.items[0], "style", "visibility: visible")
        .unwrap();
    assert_eq!(page.doc.check_visibility(page.items[0]), Ok(true));
    assert_eq!(page.doc.check_visibility(page.ul), Ok(false));
}

#[test]
fn collapse_and_zero_opacity_hide() {
    let mut page = list_page(2);
    page.doc
        .set_attribute(page.items[0], "style", "visibility: collapse")
        .unwrap();
    page.doc.set_attribute(page.items[1], "style", "opacity: 0.0").unwrap();
    assert_eq!(page.doc.check_visibility(page.items[0]), Ok(false));
    assert_eq!(page.doc.check_visibility(page.items[1]), Ok(false));
}

#[test]
fn shadow_content_follows_its_host() {
    let mut page = shadow_page();
    assert_eq!(page.doc.check_visibility(page.inner_span), Ok(true));

    page.doc.set_attribute(page.host, "hidden", "").unwrap();
    assert_eq!(page.doc.check_visibility(page.inner_span), Ok(false));
}

#[test]
fn disconnected_elements_are_not_visible() {
    let mut doc = Document::new();
    let div = doc.create_element("div");
    assert_eq!(doc.check_visibility(div), Ok(false));
}
