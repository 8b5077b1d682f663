//! JSON output types for machine-readable CLI output.
//!
//! Used by the `--json` flag on `generate`, `atlas` and `prefs show`.

use mineclone2d_core::terrain::ColumnSample;
use mineclone2d_core::{AtlasOffset, Sampling};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Error codes for CLI operations.
///
/// These codes are stable and can be used for programmatic error handling.
pub mod error_codes {
    /// Atlas could not be loaded
    pub const ATLAS_LOAD: &str = "CLI_001";
    /// Preferences could not be read or repaired
    pub const PREFS: &str = "CLI_002";
    /// Terrain generation failed
    pub const GENERATION: &str = "CLI_003";
    /// Output file could not be written
    pub const WRITE: &str = "CLI_004";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "CLI_001")
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl JsonError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Output of `generate --json`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JsonError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GenerateResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResult {
    pub seed: u32,
    pub sampling: Sampling,
    pub output: String,
    pub width: u32,
    pub height: u32,
    /// BLAKE3 hash of the written PNG.
    pub hash: String,
    pub columns: Vec<ColumnSample>,
}

/// Output of `atlas --json`.
#[derive(Debug, Clone, Serialize)]
pub struct AtlasOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JsonError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AtlasResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AtlasResult {
    pub path: String,
    pub tile_size: u32,
    pub width: u32,
    pub height: u32,
    pub columns: u32,
    pub tile_count: usize,
    pub offsets: Vec<AtlasOffset>,
}

/// Output of `prefs show --json`.
#[derive(Debug, Clone, Serialize)]
pub struct PrefsOutput {
    pub path: Option<String>,
    pub values: BTreeMap<String, String>,
}
