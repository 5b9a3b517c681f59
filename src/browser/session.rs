use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::browser::error::BrowserError;
use crate::dom::dom_model::Document;
use crate::dom::snapshot::DomSnapshot;
use crate::identity::frames::{FramedReport, run_pass_with_frames};
use crate::identity::pass::PassOptions;
use crate::identity::{D_ID_ATTRIBUTE, FRAME_PATH_ATTRIBUTE, HIDDEN_ATTRIBUTE};

/// Attribute changes for one live element, addressed by its extractor handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributePatch {
    pub handle: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<String>,
}

/// Request sent to the browser helper over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BrowserRequest {
    Navigate {
        cmd: &'static str,
        url: String,
    },
    Snapshot {
        cmd: &'static str,
    },
    Apply {
        cmd: &'static str,
        patches: Vec<AttributePatch>,
    },
    Quit {
        cmd: &'static str,
    },
}

impl BrowserRequest {
    pub fn navigate(url: &str) -> Self {
        BrowserRequest::Navigate {
            cmd: "navigate",
            url: url.to_string(),
        }
    }

    pub fn snapshot() -> Self {
        BrowserRequest::Snapshot { cmd: "snapshot" }
    }

    pub fn apply(patches: Vec<AttributePatch>) -> Self {
        BrowserRequest::Apply {
            cmd: "apply",
            patches,
        }
    }

    pub fn quit() -> Self {
        BrowserRequest::Quit { cmd: "quit" }
    }
}

/// Response received from the browser helper over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub applied: Option<u32>,
}

/// A persistent browser session backed by a Node.js helper script.
///
/// The helper keeps a Chromium page open, serializes its DOM (shadow roots and iframe
/// documents included) into a `DomSnapshot` on request, and writes attribute patches back
/// by element handle. Commands are NDJSON over stdin, responses NDJSON on stdout.
pub struct BrowserSession {
    script: String,
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
    current_url: Option<String>,
}

impl BrowserSession {
    /// Spawn the helper and wait for its ready signal.
    pub fn launch(script: &str) -> Result<Self, BrowserError> {
        let mut child = Command::new("node")
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BrowserError::SubprocessSpawn {
                script: script.to_string(),
                source: e,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            BrowserError::SessionIO(format!("failed to capture stdin of {script}"))
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            BrowserError::SessionIO(format!("failed to capture stdout of {script}"))
        })?;
        let mut reader = BufReader::new(stdout);

        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| BrowserError::SessionIO(format!("failed to read ready signal: {e}")))?;

        if line.trim().is_empty() {
            // The helper died before saying anything; surface its stderr.
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                let _ = pipe.read_to_string(&mut stderr);
            }
            let status = child
                .wait()
                .map_err(|e| BrowserError::SessionIO(format!("failed to reap {script}: {e}")))?;
            return Err(BrowserError::SubprocessFailed {
                script: script.to_string(),
                status,
                stderr: stderr.trim().to_string(),
            });
        }

        let response: BrowserResponse =
            serde_json::from_str(line.trim()).map_err(|e| BrowserError::JsonParse {
                context: format!("{script} ready signal"),
                source: e,
            })?;

        if !response.ok || response.ready != Some(true) {
            return Err(BrowserError::SessionProtocol {
                command: "launch".into(),
                error: format!("did not receive ready signal from {script}"),
            });
        }

        debug!(script, "browser session ready");
        Ok(BrowserSession {
            script: script.to_string(),
            child,
            stdin,
            reader,
            current_url: None,
        })
    }

    /// Send a request and read the response.
    fn send(&mut self, request: &BrowserRequest) -> Result<BrowserResponse, BrowserError> {
        let json = serde_json::to_string(request).map_err(|e| BrowserError::JsonSerialize {
            context: "BrowserRequest".into(),
            source: e,
        })?;

        writeln!(self.stdin, "{json}").map_err(|e| {
            BrowserError::SessionIO(format!("failed to write to {} stdin: {e}", self.script))
        })?;
        self.stdin.flush().map_err(|e| {
            BrowserError::SessionIO(format!("failed to flush {} stdin: {e}", self.script))
        })?;

        let mut line = String::new();
        self.reader.read_line(&mut line).map_err(|e| {
            BrowserError::SessionIO(format!("failed to read from {} stdout: {e}", self.script))
        })?;

        if line.trim().is_empty() {
            return Err(BrowserError::SessionIO(format!(
                "empty response from {} (process may have died)",
                self.script
            )));
        }

        serde_json::from_str(line.trim()).map_err(|e| BrowserError::JsonParse {
            context: format!("{} response", self.script),
            source: e,
        })
    }

    /// Send a request and verify it succeeded.
    fn send_ok(&mut self, request: &BrowserRequest, command_name: &str) -> Result<BrowserResponse, BrowserError> {
        let response = self.send(request)?;
        if !response.ok {
            return Err(BrowserError::SessionProtocol {
                command: command_name.into(),
                error: response.error.unwrap_or_else(|| "unknown error".into()),
            });
        }
        Ok(response)
    }

    pub fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.send_ok(&BrowserRequest::navigate(url), "navigate")?;
        self.current_url = Some(url.to_string());
        Ok(())
    }

    /// Serialize the current page.
    pub fn snapshot(&mut self) -> Result<DomSnapshot, BrowserError> {
        let response = self.send_ok(&BrowserRequest::snapshot(), "snapshot")?;
        let data = response.data.ok_or_else(|| BrowserError::SessionProtocol {
            command: "snapshot".into(),
            error: "no data in snapshot response".into(),
        })?;
        serde_json::from_value(data).map_err(|e| BrowserError::JsonParse {
            context: "snapshot data".into(),
            source: e,
        })
    }

    /// Write attribute patches into the live page. Returns how many elements were patched.
    pub fn apply(&mut self, patches: Vec<AttributePatch>) -> Result<u32, BrowserError> {
        let expected = patches.len();
        let response = self.send_ok(&BrowserRequest::apply(patches), "apply")?;
        let applied = response.applied.unwrap_or(0);
        if (applied as usize) < expected {
            warn!(applied, expected, "some elements vanished before their ids were written");
        }
        Ok(applied)
    }

    /// Last navigated URL (cached, no browser call).
    pub fn last_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub fn quit(&mut self) -> Result<(), BrowserError> {
        // Best-effort: the process may already be gone.
        let _ = self.send(&BrowserRequest::quit());
        let _ = self.child.wait();
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let _ = self.quit();
    }
}

/// Collect the patches that mirror a finished pass, frames included.
///
/// Elements without an extractor handle cannot be addressed in the live page and are
/// skipped.
pub fn collect_patches(doc: &Document) -> Vec<AttributePatch> {
    let mut patches = Vec::new();
    let mut documents = vec![doc];
    while let Some(current) = documents.pop() {
        for id in current.composed_elements() {
            let Ok(el) = current.element(id) else { continue };
            if let Some(frame) = current.frame(id) {
                documents.push(frame);
            }
            let Some(handle) = el.handle else { continue };
            let Some(d_id) = el.attribute(D_ID_ATTRIBUTE) else { continue };

            let mut set = vec![(D_ID_ATTRIBUTE.to_string(), d_id.to_string())];
            let mut remove = Vec::new();
            match el.attribute(HIDDEN_ATTRIBUTE) {
                Some(value) => set.push((HIDDEN_ATTRIBUTE.to_string(), value.to_string())),
                None => remove.push(HIDDEN_ATTRIBUTE.to_string()),
            }
            if let Some(frame_path) = el.attribute(FRAME_PATH_ATTRIBUTE) {
                set.push((FRAME_PATH_ATTRIBUTE.to_string(), frame_path.to_string()));
            }
            patches.push(AttributePatch { handle, set, remove });
        }
    }
    patches
}

/// Snapshot the live page, assign ids, and write them back.
///
/// Pages mutate while loading, so a failed attempt is retried on a fresh snapshot up to
/// `retries` times before giving up.
pub fn assign_live(
    session: &mut BrowserSession,
    options: &PassOptions,
    retries: u32,
) -> Result<(Document, FramedReport), BrowserError> {
    let attempts = retries.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match assign_once(session, options) {
            Ok(result) => return Ok(result),
            Err(e) => {
                warn!(attempt, attempts, error = %e, "failed to generate d-ids");
                last_error = e.to_string();
            }
        }
    }

    Err(BrowserError::AssignFailed {
        attempts,
        last_error,
    })
}

fn assign_once(
    session: &mut BrowserSession,
    options: &PassOptions,
) -> Result<(Document, FramedReport), BrowserError> {
    let snapshot = session.snapshot()?;
    let mut doc = snapshot.to_document()?;
    let report = run_pass_with_frames(&mut doc, options)?;
    let patches = collect_patches(&doc);
    session.apply(patches)?;
    debug!(elements = report.element_count(), "live identity pass applied");
    Ok((doc, report))
}
