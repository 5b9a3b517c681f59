use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::identity::pass::{PassReport, TraversalMode};

/// One JSONL line per identity pass.
#[derive(Debug, Serialize)]
pub struct PassTraceEvent {
    pub timestamp_ms: u128,
    pub mode: TraversalMode,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_path: Option<String>,

    pub elements: usize,
    pub collisions: usize,
    pub fallbacks: usize,
    pub hidden: usize,
    pub digest: String,
}

impl PassTraceEvent {
    pub fn from_report(report: &PassReport) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            mode: report.mode,
            url: None,
            frame_path: report.frame_path.clone(),
            elements: report.len(),
            collisions: report.collisions,
            fallbacks: report.fallback_count(),
            hidden: report.hidden_count(),
            digest: report.digest(),
        }
    }

    pub fn with_url(mut self, url: Option<&str>) -> Self {
        self.url = url.map(str::to_string);
        self
    }
}
