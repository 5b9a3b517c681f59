mod common;

use element_ids::assign_snapshot;
use element_ids::dom::{DomAccess, DomSnapshot, NodeId, SnapshotError, SnapshotKind};
use element_ids::identity::pass::{PassOptions, TraversalMode};

use crate::common::{fixture_path, list_page, load_fixture};

// ============================================================================
// Loading
// ============================================================================

#[test]
fn fixture_rebuilds_into_a_document() {
    let snapshot = load_fixture("page.json");
    let doc = snapshot.to_document().unwrap();

    assert_eq!(doc.url.as_deref(), Some("https://shop.example.test/cart"));
    assert_eq!(doc.title, "Demo");
    assert_eq!(doc.composed_elements().len(), 12);
    assert_eq!(doc.body(), Some(NodeId(6)));
    assert_eq!(doc.shadow_root(NodeId(13)), Ok(Some(NodeId(14))));
    assert_eq!(doc.element(NodeId(15)).unwrap().handle, Some(10));

    let frame = doc.frame(NodeId(16)).unwrap();
    assert_eq!(frame.composed_elements().len(), 3);
    assert_eq!(frame.check_visibility(NodeId(3)), Ok(false));
}

#[test]
fn snapshot_survives_a_document_round_trip() {
    let snapshot = load_fixture("page.json");
    let doc = snapshot.to_document().unwrap();
    assert_eq!(DomSnapshot::from_document(&doc), snapshot);
}

#[test]
fn detached_nodes_are_not_serialized() {
    let mut page = list_page(2);
    page.doc.detach(page.items[0]).unwrap();
    let snapshot = DomSnapshot::from_document(&page.doc);

    let elements = snapshot
        .nodes
        .iter()
        .filter(|n| n.kind == SnapshotKind::Element)
        .count();
    assert_eq!(elements, 5);
    // Parent references always point backwards.
    for (index, node) in snapshot.nodes.iter().enumerate() {
        if let Some(parent) = node.parent {
            assert!(parent < index);
        }
    }
}

// ============================================================================
// Malformed input
// ============================================================================

#[test]
fn empty_snapshot_is_rejected() {
    let snapshot = DomSnapshot::from_json(r#"{"nodes": []}"#).unwrap();
    assert!(matches!(snapshot.to_document(), Err(SnapshotError::Empty)));
}

#[test]
fn first_node_must_be_the_document() {
    let snapshot = DomSnapshot::from_json(r#"{"nodes": [{"kind": "element", "name": "div"}]}"#).unwrap();
    assert!(matches!(
        snapshot.to_document(),
        Err(SnapshotError::Malformed { index: 0, .. })
    ));
}

#[test]
fn forward_parent_reference_is_rejected() {
    let json = r#"{"nodes": [
        {"kind": "document"},
        {"kind": "element", "name": "div", "parent": 2},
        {"kind": "element", "name": "span", "parent": 0}
    ]}"#;
    let snapshot = DomSnapshot::from_json(json).unwrap();
    assert!(matches!(
        snapshot.to_document(),
        Err(SnapshotError::Malformed { index: 1, .. })
    ));
}

#[test]
fn shadow_root_needs_a_host() {
    let json = r#"{"nodes": [
        {"kind": "document"},
        {"kind": "shadow_root"}
    ]}"#;
    let snapshot = DomSnapshot::from_json(json).unwrap();
    let err = snapshot.to_document().unwrap_err();
    assert!(err.to_string().contains("shadow root without a host"));
}

#[test]
fn text_cannot_have_children() {
    let json = r#"{"nodes": [
        {"kind": "document"},
        {"kind": "text", "parent": 0, "text": "x"},
        {"kind": "element", "name": "b", "parent": 1}
    ]}"#;
    let snapshot = DomSnapshot::from_json(json).unwrap();
    assert!(matches!(
        snapshot.to_document(),
        Err(SnapshotError::Malformed { index: 2, .. })
    ));
}

#[test]
fn invalid_json_and_missing_files_are_reported() {
    assert!(matches!(DomSnapshot::from_json("{"), Err(SnapshotError::Json(_))));
    assert!(matches!(
        DomSnapshot::load(&fixture_path("does-not-exist.json")),
        Err(SnapshotError::Io { .. })
    ));
}

// ============================================================================
// assign_snapshot
// ============================================================================

#[test]
fn assign_snapshot_annotates_every_document() {
    let snapshot = load_fixture("page.json");
    let (annotated, report) =
        assign_snapshot(&snapshot, &PassOptions::new(TraversalMode::Flat)).unwrap();
    let doc = annotated.to_document().unwrap();

    assert_eq!(doc.attribute(NodeId(7), "d-id"), Some("8d5e1h"));
    assert_eq!(doc.attribute(NodeId(9), "d-id"), Some("-aiwspb"));
    assert_eq!(doc.attribute(NodeId(11), "d-id"), Some("-aiwsog"));
    assert_eq!(doc.attribute(NodeId(11), "data-hidden"), Some("true"));
    assert_eq!(doc.attribute(NodeId(15), "d-id"), Some("-ahuaxm"));
    assert_eq!(doc.attribute(NodeId(16), "d-id"), Some("pgmxo7"));

    let frame = doc.frame(NodeId(16)).unwrap();
    assert_eq!(frame.attribute(NodeId(3), "d-id"), Some("hi5fib"));
    assert_eq!(frame.attribute(NodeId(3), "iframe-path"), Some("pgmxo7"));
    assert_eq!(frame.attribute(NodeId(3), "data-hidden"), Some("true"));

    assert_eq!(report.top.len(), 12);
    assert_eq!(report.frames.len(), 1);
    assert_eq!(report.element_count(), 15);
    // head, title, the display:none item, script, and the frame's <p>.
    assert_eq!(report.hidden_count(), 5);
}

#[test]
fn assign_snapshot_leaves_the_input_untouched() {
    let snapshot = load_fixture("page.json");
    let before = snapshot.clone();
    assign_snapshot(&snapshot, &PassOptions::default()).unwrap();
    assert_eq!(snapshot, before);
}
