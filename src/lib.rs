//! Stable structural identifiers ("d-ids") for DOM elements.
//!
//! Every element gets an id derived from its root-to-element path, so repeated passes
//! over a changing page keep handing out the same id to the same structural position.

use crate::{
    dom::snapshot::DomSnapshot,
    identity::{
        frames::{FramedReport, run_pass_with_frames},
        pass::{IdentityError, PassOptions},
    },
};

pub mod browser;
pub mod cli;
pub mod dom;
pub mod events;
pub mod identity;
pub mod report;
pub mod trace;

/// Run an identity pass (frames included) over a snapshot and return the annotated copy.
pub fn assign_snapshot(
    snapshot: &DomSnapshot,
    options: &PassOptions,
) -> Result<(DomSnapshot, FramedReport), IdentityError> {
    let mut doc = snapshot.to_document()?;
    let report = run_pass_with_frames(&mut doc, options)?;
    Ok((DomSnapshot::from_document(&doc), report))
}
