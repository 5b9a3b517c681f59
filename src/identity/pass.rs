use std::collections::{HashSet, VecDeque};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::dom::access::{DomAccess, DomError, NodeId, NodeType};
use crate::dom::snapshot::SnapshotError;
use crate::identity::fingerprint::{fallback_id, hash_code, to_base36};
use crate::identity::path::element_path;
use crate::identity::registry::IdRegistry;
use crate::identity::tagger::tag_visibility;
use crate::identity::{D_ID_ATTRIBUTE, FRAME_PATH_ATTRIBUTE};

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("document has no <body> to start a recursive pass from")]
    MissingBody,

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalMode {
    /// Every element of the document in tree order, then each shadow root reached.
    #[default]
    Flat,
    /// Depth-first descent from `<body>`, shadow roots right after their host, followed
    /// by a sweep for shadow roots the descent never reached.
    Recursive,
}

impl FromStr for TraversalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(TraversalMode::Flat),
            "recursive" => Ok(TraversalMode::Recursive),
            other => Err(format!("unknown traversal mode '{other}' (expected flat or recursive)")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassOptions {
    pub mode: TraversalMode,
    /// Set for passes over an iframe document; written to every element as `iframe-path`.
    pub frame_path: Option<String>,
    /// Keep each element's path and fingerprint in the report.
    pub record_paths: bool,
}

impl PassOptions {
    pub fn new(mode: TraversalMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_frame_path(mut self, frame_path: impl Into<String>) -> Self {
        self.frame_path = Some(frame_path.into());
        self
    }

    pub fn with_paths(mut self) -> Self {
        self.record_paths = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub node: NodeId,
    pub d_id: String,
    pub hidden: bool,
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<i32>,
}

/// Outcome of one pass, in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PassReport {
    pub mode: TraversalMode,
    pub frame_path: Option<String>,
    pub assignments: Vec<Assignment>,
    pub collisions: usize,
}

impl PassReport {
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn get(&self, node: NodeId) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.node == node)
    }

    pub fn d_id(&self, node: NodeId) -> Option<&str> {
        self.get(node).map(|a| a.d_id.as_str())
    }

    pub fn fallback_count(&self) -> usize {
        self.assignments.iter().filter(|a| a.fallback).count()
    }

    pub fn hidden_count(&self) -> usize {
        self.assignments.iter().filter(|a| a.hidden).count()
    }

    /// SHA-1 over the assigned identifiers in traversal order.
    pub fn digest(&self) -> String {
        let mut hasher = Sha1::new();
        for assignment in &self.assignments {
            hasher.update(assignment.d_id.as_bytes());
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Assign a `d-id` to every element reachable in `dom`.
///
/// Element-level failures never abort the pass; only a recursive pass without a `<body>`
/// to start from fails as a whole.
pub fn run_pass<D: DomAccess + ?Sized>(
    dom: &mut D,
    options: &PassOptions,
) -> Result<PassReport, IdentityError> {
    let mut pass = Pass::new(options);

    match options.mode {
        TraversalMode::Flat => pass.run_flat(dom),
        TraversalMode::Recursive => pass.run_recursive(dom)?,
    }

    let report = pass.finish();
    debug!(
        mode = ?report.mode,
        elements = report.len(),
        collisions = report.collisions,
        fallbacks = report.fallback_count(),
        hidden = report.hidden_count(),
        "identity pass complete"
    );
    Ok(report)
}

struct Pass<'a> {
    options: &'a PassOptions,
    registry: IdRegistry,
    assignments: Vec<Assignment>,
    next_index: usize,
}

impl<'a> Pass<'a> {
    fn new(options: &'a PassOptions) -> Self {
        Self {
            options,
            registry: IdRegistry::new(),
            assignments: Vec::new(),
            next_index: 0,
        }
    }

    fn finish(self) -> PassReport {
        PassReport {
            mode: self.options.mode,
            frame_path: self.options.frame_path.clone(),
            collisions: self.registry.collisions(),
            assignments: self.assignments,
        }
    }

    fn run_flat<D: DomAccess + ?Sized>(&mut self, dom: &mut D) {
        let mut roots = VecDeque::from([dom.document()]);
        while let Some(root) = roots.pop_front() {
            for element in dom.query_all_elements(root) {
                self.visit(dom, element);
                if let Ok(Some(shadow)) = dom.shadow_root(element) {
                    roots.push_back(shadow);
                }
            }
        }
    }

    fn run_recursive<D: DomAccess + ?Sized>(&mut self, dom: &mut D) -> Result<(), IdentityError> {
        let body = dom.body().ok_or(IdentityError::MissingBody)?;
        let mut visited_roots = HashSet::new();
        self.descend(dom, body, &mut visited_roots);

        // Shadow roots hosted outside <body> (or under hosts the descent skipped).
        for element in dom.query_all_elements(dom.document()) {
            if let Ok(Some(shadow)) = dom.shadow_root(element) {
                if visited_roots.insert(shadow) {
                    self.descend(dom, shadow, &mut visited_roots);
                }
            }
        }
        Ok(())
    }

    /// Pre-order walk over child nodes with an explicit stack. A host's shadow root is
    /// pushed last so it is walked before the host's light children.
    fn descend<D: DomAccess + ?Sized>(
        &mut self,
        dom: &mut D,
        start: NodeId,
        visited_roots: &mut HashSet<NodeId>,
    ) {
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if matches!(dom.node_type(node), Ok(NodeType::Element)) {
                self.visit(dom, node);
            }

            match dom.child_nodes(node) {
                Ok(children) => stack.extend(children.into_iter().rev()),
                Err(e) => warn!(node = %node, error = %e, "skipping children of unreadable node"),
            }

            if let Ok(Some(shadow)) = dom.shadow_root(node) {
                if visited_roots.insert(shadow) {
                    stack.push(shadow);
                }
            }
        }
    }

    fn visit<D: DomAccess + ?Sized>(&mut self, dom: &mut D, node: NodeId) {
        let index = self.next_index;
        self.next_index += 1;

        match self.identify(dom, node) {
            Ok(assignment) => self.assignments.push(assignment),
            Err(Unidentified { error: err, hidden }) => {
                let tag_name = dom.tag_name(node);
                // Fallbacks go through the same registry so the pass stays collision free.
                let fallback = self.registry.claim(&fallback_id(&tag_name, index));
                error!(
                    element = %describe(dom, node),
                    fallback_id = %fallback,
                    error = %err,
                    "error processing element, using fallback id"
                );
                if let Err(e) = dom.set_attribute(node, D_ID_ATTRIBUTE, &fallback) {
                    warn!(node = %node, error = %e, "could not write fallback id");
                }
                self.assignments.push(Assignment {
                    node,
                    d_id: fallback,
                    hidden,
                    fallback: true,
                    path: None,
                    fingerprint: None,
                });
            }
        }
    }

    fn identify<D: DomAccess + ?Sized>(
        &mut self,
        dom: &mut D,
        node: NodeId,
    ) -> Result<Assignment, Unidentified> {
        let untagged = |error: DomError| Unidentified { error, hidden: false };
        let path = element_path(dom, node).map_err(untagged)?.to_string();
        let fingerprint = hash_code(&path);
        let hidden = tag_visibility(dom, node).map_err(untagged)?;
        let tagged = |error: DomError| Unidentified { error, hidden };

        // Claimed only once every write landed, so a failed element holds no primary id.
        let candidate = to_base36(fingerprint);
        let d_id = self.registry.resolve(&candidate);
        dom.set_attribute(node, D_ID_ATTRIBUTE, &d_id).map_err(tagged)?;
        if let Some(frame_path) = &self.options.frame_path {
            dom.set_attribute(node, FRAME_PATH_ATTRIBUTE, frame_path)
                .map_err(tagged)?;
        }
        let d_id = self.registry.claim(&candidate);

        let record = self.options.record_paths;
        Ok(Assignment {
            node,
            d_id,
            hidden,
            fallback: false,
            path: record.then_some(path),
            fingerprint: record.then_some(fingerprint),
        })
    }
}

/// An element `identify` gave up on, and whether it had already been marked hidden.
struct Unidentified {
    error: DomError,
    hidden: bool,
}

/// Short description of an element for diagnostics, e.g. `<div id="main"> (#12)`.
fn describe<D: DomAccess + ?Sized>(dom: &D, node: NodeId) -> String {
    let name = match dom.local_name(node) {
        Ok(Some(name)) => name,
        _ => dom.tag_name(node).to_lowercase(),
    };
    match dom.get_attribute(node, "id") {
        Ok(Some(id)) if !id.is_empty() => format!("<{name} id=\"{id}\"> ({node})"),
        _ => format!("<{name}> ({node})"),
    }
}
