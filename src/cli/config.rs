use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::dom::strip::StripOptions;
use crate::identity::pass::TraversalMode;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "element-ids",
    version,
    about = "Stable structural identifiers for DOM elements"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: element-ids.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Append one JSON line per pass to this file
    #[arg(long, global = true)]
    pub trace: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assign d-ids to every element of a DOM snapshot
    Assign {
        /// Snapshot JSON file
        #[arg(short, long)]
        input: String,

        /// Traversal mode: flat or recursive
        #[arg(long)]
        mode: Option<TraversalMode>,

        /// Where to write the annotated snapshot (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show path, fingerprint and d-id for every element of a snapshot
    Inspect {
        /// Snapshot JSON file
        #[arg(short, long)]
        input: String,

        /// Traversal mode: flat or recursive
        #[arg(long)]
        mode: Option<TraversalMode>,
    },

    /// Hash a structural path the way the identity pass does
    Hash {
        /// Path text, e.g. /html[1]/body[1]/div[2]
        text: String,
    },

    /// Reduce an annotated snapshot for downstream consumers
    Strip {
        /// Snapshot JSON file
        #[arg(short, long)]
        input: String,

        /// Remove d-id attributes as well
        #[arg(long, default_value_t = false)]
        drop_ids: bool,

        /// Where to write the reduced snapshot (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Assign d-ids inside a live browser page
    Live {
        /// URL to open
        #[arg(long)]
        url: String,

        /// Traversal mode: flat or recursive
        #[arg(long)]
        mode: Option<TraversalMode>,

        /// Node.js helper script driving the browser
        #[arg(long)]
        script: Option<String>,

        /// Where to write the annotated snapshot
        #[arg(short, long)]
        output: Option<String>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `element-ids.yaml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub pass: PassConfig,
    #[serde(default)]
    pub strip: StripOptions,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassConfig {
    #[serde(default)]
    pub mode: TraversalMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_script")]
    pub script: String,

    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            script: default_script(),
            retries: default_retries(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceConfig {
    pub path: Option<String>,
}

// Serde default helpers
fn default_script() -> String { "node/browser_server.js".to_string() }
fn default_retries() -> u32 { 3 }

// ============================================================================
// Config File Loading
// ============================================================================

pub const DEFAULT_CONFIG_PATH: &str = "element-ids.yaml";

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => parse_config(&content),
        Err(_) => AppConfig::default(),
    }
}

/// Parse YAML config text, falling back to defaults when it does not parse.
pub fn parse_config(content: &str) -> AppConfig {
    match serde_yaml::from_str(content) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed config");
            AppConfig::default()
        }
    }
}

// ============================================================================
// Resolution (CLI > config > defaults)
// ============================================================================

pub fn resolve_mode(cli_mode: Option<TraversalMode>, config: &AppConfig) -> TraversalMode {
    cli_mode.unwrap_or(config.pass.mode)
}

pub fn resolve_trace_path<'a>(cli_trace: Option<&'a str>, config: &'a AppConfig) -> Option<&'a str> {
    cli_trace.or(config.trace.path.as_deref())
}
