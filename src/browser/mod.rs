pub mod error;
pub mod session;

pub use error::BrowserError;
pub use session::{AttributePatch, BrowserSession, assign_live, collect_patches};
