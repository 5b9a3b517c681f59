use crate::dom::access::{DomError, NodeId};
use crate::dom::dom_model::Document;

/// Elements the user-agent stylesheet renders with `display: none`.
const UA_HIDDEN_TAGS: &[&str] = &[
    "base", "head", "link", "meta", "noscript", "script", "style", "template", "title",
];

/// Visibility check for the in-memory document.
///
/// A visibility reported by the browser-side extractor is authoritative. Without one, the
/// element is visible unless it is disconnected, or it or a flat-tree ancestor is
/// `hidden`, UA-hidden, `display: none` or `opacity: 0`, or its nearest inline
/// `visibility` declaration is `hidden` / `collapse`.
pub fn check_visibility(doc: &Document, node: NodeId) -> Result<bool, DomError> {
    let element = doc.element(node)?;
    if let Some(visible) = element.reported_visible {
        return Ok(visible);
    }
    if !doc.is_connected(node) {
        return Ok(false);
    }

    let mut visibility_decided = false;
    let mut cursor = Some(node);
    while let Some(current) = cursor {
        if let Ok(el) = doc.element(current) {
            if el.attribute("hidden").is_some() {
                return Ok(false);
            }
            if el
                .local_name
                .as_deref()
                .is_some_and(|name| UA_HIDDEN_TAGS.contains(&name.to_ascii_lowercase().as_str()))
            {
                return Ok(false);
            }

            let style = el.attribute("style").map(parse_inline_style).unwrap_or_default();
            for (property, value) in &style {
                match property.as_str() {
                    "display" if value == "none" => return Ok(false),
                    "opacity" if is_zero(value) => return Ok(false),
                    "visibility" if !visibility_decided => {
                        if value == "hidden" || value == "collapse" {
                            return Ok(false);
                        }
                        visibility_decided = true;
                    }
                    _ => {}
                }
            }
        }
        cursor = doc.flat_tree_parent(current);
    }

    Ok(true)
}

/// Split an inline `style` attribute into lower-cased `(property, value)` pairs.
/// `!important` markers are dropped; later declarations win.
pub fn parse_inline_style(style: &str) -> Vec<(String, String)> {
    let mut declarations: Vec<(String, String)> = Vec::new();
    for declaration in style.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = value
            .trim()
            .trim_end_matches("!important")
            .trim()
            .to_ascii_lowercase();
        if property.is_empty() {
            continue;
        }
        declarations.retain(|(p, _)| *p != property);
        declarations.push((property, value));
    }
    declarations
}

fn is_zero(value: &str) -> bool {
    let number = value.trim_end_matches('%');
    number.parse::<f64>().is_ok_and(|n| n == 0.0)
}
