use std::process::ExitStatus;

use thiserror::Error;

use crate::dom::snapshot::SnapshotError;
use crate::identity::pass::IdentityError;

#[derive(Debug, Error)]
pub enum BrowserError {
    /// Node.js helper failed to spawn
    #[error("failed to spawn {script} (is Node.js installed?): {source}")]
    SubprocessSpawn {
        script: String,
        source: std::io::Error,
    },

    /// Node.js helper exited with non-zero status
    #[error("{script} exited with {status}: {stderr}")]
    SubprocessFailed {
        script: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        source: serde_json::Error,
    },

    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        source: serde_json::Error,
    },

    /// Reading from or writing to the helper's pipes failed
    #[error("browser session I/O error: {0}")]
    SessionIO(String),

    /// The helper answered with `ok: false` or an incomplete response
    #[error("browser command '{command}' failed: {error}")]
    SessionProtocol { command: String, error: String },

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Every attempt of a live identity pass failed
    #[error("failed to add d-ids to the page after {attempts} attempts: {last_error}")]
    AssignFailed { attempts: u32, last_error: String },
}
