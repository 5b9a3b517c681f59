use crate::dom::access::{DomAccess, DomError, NodeId};
use crate::identity::{HIDDEN_ATTRIBUTE, HIDDEN_SENTINEL};

/// Mark `node` hidden or clear a stale marker. Returns whether the node is hidden.
pub fn tag_visibility<D: DomAccess + ?Sized>(dom: &mut D, node: NodeId) -> Result<bool, DomError> {
    let hidden = !dom.check_visibility(node)?;
    if hidden {
        dom.set_attribute(node, HIDDEN_ATTRIBUTE, HIDDEN_SENTINEL)?;
    } else {
        dom.remove_attribute(node, HIDDEN_ATTRIBUTE)?;
    }
    Ok(hidden)
}
