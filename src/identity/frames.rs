use serde::Serialize;
use tracing::{debug, warn};

use crate::dom::access::NodeId;
use crate::dom::dom_model::Document;
use crate::identity::D_ID_ATTRIBUTE;
use crate::identity::pass::{IdentityError, PassOptions, PassReport, run_pass};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    /// `|`-joined d-ids of the iframes leading to this document.
    pub frame_path: String,
    pub report: PassReport,
}

/// A top-level pass plus one pass per reachable iframe document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FramedReport {
    pub top: PassReport,
    pub frames: Vec<FrameReport>,
}

impl FramedReport {
    pub fn element_count(&self) -> usize {
        self.top.len() + self.frames.iter().map(|f| f.report.len()).sum::<usize>()
    }

    pub fn fallback_count(&self) -> usize {
        self.top.fallback_count()
            + self
                .frames
                .iter()
                .map(|f| f.report.fallback_count())
                .sum::<usize>()
    }

    pub fn hidden_count(&self) -> usize {
        self.top.hidden_count()
            + self
                .frames
                .iter()
                .map(|f| f.report.hidden_count())
                .sum::<usize>()
    }

    pub fn frame(&self, frame_path: &str) -> Option<&PassReport> {
        self.frames
            .iter()
            .find(|f| f.frame_path == frame_path)
            .map(|f| &f.report)
    }
}

/// Run a pass over `doc`, then over every iframe document that has a `d-id`.
///
/// Each frame gets its own registry, as a script evaluated inside that frame would, and
/// its elements are stamped with their frame path.
pub fn run_pass_with_frames(
    doc: &mut Document,
    options: &PassOptions,
) -> Result<FramedReport, IdentityError> {
    let top = run_pass(doc, options)?;
    let mut frames = Vec::new();
    expand_frames(doc, options, options.frame_path.as_deref().unwrap_or(""), &mut frames);
    Ok(FramedReport { top, frames })
}

fn expand_frames(
    doc: &mut Document,
    options: &PassOptions,
    parent_path: &str,
    out: &mut Vec<FrameReport>,
) {
    let iframes: Vec<(NodeId, String)> = doc
        .composed_elements()
        .into_iter()
        .filter(|&id| doc.frame(id).is_some())
        .filter_map(|id| {
            let d_id = doc.attribute(id, D_ID_ATTRIBUTE)?.to_string();
            Some((id, d_id))
        })
        .collect();

    for (iframe, d_id) in iframes {
        let frame_path = if parent_path.is_empty() {
            d_id
        } else {
            format!("{parent_path}|{d_id}")
        };
        let Some(frame_doc) = doc.frame_mut(iframe) else {
            continue;
        };

        let frame_options = PassOptions {
            frame_path: Some(frame_path.clone()),
            ..options.clone()
        };
        match run_pass(frame_doc, &frame_options) {
            Ok(report) => {
                debug!(frame_path = %frame_path, elements = report.len(), "frame pass complete");
                out.push(FrameReport {
                    frame_path: frame_path.clone(),
                    report,
                });
                expand_frames(frame_doc, options, &frame_path, out);
            }
            Err(e) => warn!(frame_path = %frame_path, error = %e, "skipping frame"),
        }
    }
}

/// Resolve the document a frame path points at (empty path = `doc` itself).
pub fn frame_document<'a>(doc: &'a Document, frame_path: &str) -> Option<&'a Document> {
    let mut current = doc;
    for segment in frame_path.split('|').filter(|s| !s.is_empty()) {
        let iframe = current.composed_elements().into_iter().find(|&id| {
            current.frame(id).is_some() && current.attribute(id, D_ID_ATTRIBUTE) == Some(segment)
        })?;
        current = current.frame(iframe)?;
    }
    Some(current)
}
