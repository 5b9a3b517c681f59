pub mod fingerprint;
pub mod frames;
pub mod lookup;
pub mod pass;
pub mod path;
pub mod registry;
pub mod tagger;

pub use fingerprint::{base_id, fallback_id, hash_code, to_base36};
pub use frames::{FrameReport, FramedReport, run_pass_with_frames};
pub use pass::{Assignment, IdentityError, PassOptions, PassReport, TraversalMode, run_pass};
pub use path::{ElementPath, element_path};
pub use registry::IdRegistry;

/// Attribute carrying the element identifier.
pub const D_ID_ATTRIBUTE: &str = "d-id";

/// Side-channel marker for elements that failed the visibility check.
pub const HIDDEN_ATTRIBUTE: &str = "data-hidden";
pub const HIDDEN_SENTINEL: &str = "true";

/// `|`-joined chain of iframe d-ids leading to an element inside a frame.
pub const FRAME_PATH_ATTRIBUTE: &str = "iframe-path";
