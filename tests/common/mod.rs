#![allow(dead_code)]

pub mod faulty_dom;

use element_ids::dom::{DomAccess, Document, DomSnapshot, NodeId, ShadowRootMode};

pub fn fixture_path(name: &str) -> String {
    let base = std::env::current_dir().unwrap();
    base.join("tests")
        .join("fixtures")
        .join(name)
        .display()
        .to_string()
}

pub fn load_fixture(name: &str) -> DomSnapshot {
    DomSnapshot::load(&fixture_path(name)).unwrap()
}

/// Handles into the page built by [`list_page`].
pub struct ListPage {
    pub doc: Document,
    pub html: NodeId,
    pub head: NodeId,
    pub body: NodeId,
    pub ul: NodeId,
    pub items: Vec<NodeId>,
}

/// `<html><head></head><body><ul><li>..</li> x n</ul></body></html>`
pub fn list_page(items: usize) -> ListPage {
    let mut doc = Document::new();
    let root = doc.document();
    let html = doc.append_element(root, "html").unwrap();
    let head = doc.append_element(html, "head").unwrap();
    let body = doc.append_element(html, "body").unwrap();
    let ul = doc.append_element(body, "ul").unwrap();
    let items = (0..items)
        .map(|i| {
            let li = doc.append_element(ul, "li").unwrap();
            doc.append_text(li, &format!("item {i}")).unwrap();
            li
        })
        .collect();

    ListPage {
        doc,
        html,
        head,
        body,
        ul,
        items,
    }
}

/// Handles into the page built by [`shadow_page`].
pub struct ShadowPage {
    pub doc: Document,
    pub body: NodeId,
    pub host: NodeId,
    pub shadow: NodeId,
    pub inner_div: NodeId,
    pub inner_span: NodeId,
    pub light_p: NodeId,
    pub after: NodeId,
}

/// ```text
/// <html><body>
///   <my-widget>
///     #shadow-root: <div><span></span></div>
///     <p></p>
///   </my-widget>
///   <div></div>
/// </body></html>
/// ```
pub fn shadow_page() -> ShadowPage {
    let mut doc = Document::new();
    let root = doc.document();
    let html = doc.append_element(root, "html").unwrap();
    let body = doc.append_element(html, "body").unwrap();
    let host = doc.append_element(body, "my-widget").unwrap();
    let shadow = doc.attach_shadow(host, ShadowRootMode::Open).unwrap();
    let inner_div = doc.append_element(shadow, "div").unwrap();
    let inner_span = doc.append_element(inner_div, "span").unwrap();
    let light_p = doc.append_element(host, "p").unwrap();
    let after = doc.append_element(body, "div").unwrap();

    ShadowPage {
        doc,
        body,
        host,
        shadow,
        inner_div,
        inner_span,
        light_p,
        after,
    }
}

/// `<html><head><title/></head><body>` with `n` empty divs.
pub fn div_page(n: usize) -> (Document, Vec<NodeId>) {
    let mut doc = Document::new();
    let root = doc.document();
    let html = doc.append_element(root, "html").unwrap();
    let head = doc.append_element(html, "head").unwrap();
    doc.append_element(head, "title").unwrap();
    let body = doc.append_element(html, "body").unwrap();
    let divs = (0..n)
        .map(|_| doc.append_element(body, "div").unwrap())
        .collect();
    (doc, divs)
}

/// d-id of every element in composed order.
pub fn d_ids(doc: &Document) -> Vec<String> {
    doc.composed_elements()
        .into_iter()
        .filter_map(|id| doc.attribute(id, "d-id").map(str::to_string))
        .collect()
}
