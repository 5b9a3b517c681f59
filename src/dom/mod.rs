pub mod access;
pub mod dom_model;
pub mod snapshot;
pub mod strip;
pub mod visibility;

pub use access::{DomAccess, DomError, NodeId, NodeType};
pub use dom_model::{Document, ElementData, ShadowRootMode};
pub use snapshot::{DomSnapshot, SnapshotError, SnapshotKind, SnapshotNode};
