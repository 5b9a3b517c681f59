use std::{fs::OpenOptions, io::Write, sync::Mutex};

use tracing::warn;

use crate::identity::frames::FramedReport;
use crate::trace::trace::PassTraceEvent;

/// Appends pass events to a JSONL file. Never fails the caller: problems are logged and
/// the event is dropped.
pub struct TraceLogger {
    file: Option<Mutex<std::fs::File>>,
}

impl TraceLogger {
    pub fn new(path: &str) -> Self {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path);

        match file {
            Ok(f) => Self {
                file: Some(Mutex::new(f)),
            },
            Err(e) => {
                warn!(path, error = %e, "could not open trace file");
                Self { file: None }
            }
        }
    }

    pub fn disabled() -> Self {
        Self { file: None }
    }

    /// Open `path` when given, otherwise a logger that drops everything.
    pub fn from_path(path: Option<&str>) -> Self {
        path.map(Self::new).unwrap_or_else(Self::disabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    pub fn log(&self, event: &PassTraceEvent) {
        let Some(file) = &self.file else { return };

        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "failed to serialize pass event");
                return;
            }
        };

        // Poisoned by a panicking writer; the file itself is still usable.
        let mut file = file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writeln!(file, "{line}") {
            warn!(error = %e, "failed to append pass event");
        }
    }

    /// One event for the top-level pass and one per frame.
    pub fn log_framed(&self, report: &FramedReport, url: Option<&str>) {
        self.log(&PassTraceEvent::from_report(&report.top).with_url(url));
        for frame in &report.frames {
            self.log(&PassTraceEvent::from_report(&frame.report).with_url(url));
        }
    }
}
