//! Sequence descriptors and atlas grid math.
//!
//! A sequence descriptor is a small JSON attribute list that configures one
//! `FrameSequencer`:
//!
//! ```json
//! { "version": "0.1", "enabled": true, "repeat": true,
//!   "rows": 3, "cols": 3, "numFrames": 9, "timePerFrame": 40 }
//! ```
//!
//! Every attribute except `version` is optional and falls back to the
//! component defaults (all zero / false). `timePerFrame` is in milliseconds.

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Attribute set of a `FrameSequencer`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequencerConfig {
    /// Start ticking as soon as the sequencer is bound to its targets.
    pub enabled: bool,
    pub repeat: bool,
    pub rows: u32,
    pub cols: u32,
    /// Cells actually used; the last atlas row may be partial.
    pub num_frames: u32,
    pub time_per_frame_ms: u32,
}

impl SequencerConfig {
    pub fn grid(&self) -> AtlasGrid {
        AtlasGrid {
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Frame hold time in microseconds.
    pub fn time_per_frame_us(&self) -> u64 {
        u64::from(self.time_per_frame_ms) * 1000
    }
}

/// `rows` x `cols` subdivision of an atlas texture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AtlasGrid {
    pub rows: u32,
    pub cols: u32,
}

impl AtlasGrid {
    pub fn cell_count(&self) -> u64 {
        u64::from(self.rows) * u64::from(self.cols)
    }

    /// Row/column of a frame index. Not wrapped to `rows`: indices past the
    /// last row map to rows that do not exist in the texture.
    pub fn cell_coords(&self, index: u32) -> Option<(u32, u32)> {
        let row = index.checked_div(self.cols)?;
        let col = index.checked_rem(self.cols)?;
        Some((row, col))
    }

    /// UV rect `[u0, v0, u1, v1]` of a cell, with v growing downwards.
    pub fn cell_uv_rect(&self, row: u32, col: u32) -> Option<[f32; 4]> {
        if self.rows == 0 || self.cols == 0 {
            return None;
        }
        let cell_w = 1.0 / self.cols as f32;
        let cell_h = 1.0 / self.rows as f32;
        let u0 = col as f32 * cell_w;
        let v0 = row as f32 * cell_h;
        Some([u0, v0, u0 + cell_w, v0 + cell_h])
    }
}

// --- JSON deserialization types (private) ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SequenceDescriptorJson {
    version: String,
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    repeat: bool,
    #[serde(default)]
    rows: u32,
    #[serde(default)]
    cols: u32,
    #[serde(default)]
    num_frames: u32,
    #[serde(default)]
    time_per_frame: u32,
}

/// Parse a descriptor from a JSON string. `origin` is only used in error text.
pub fn parse_sequence_descriptor(raw: &str, origin: &str) -> Result<SequencerConfig, String> {
    let json: SequenceDescriptorJson = serde_json::from_str(raw)
        .map_err(|e| format!("Failed to parse sequence descriptor {origin}: {e}"))?;
    validate_descriptor(&json, origin)?;

    Ok(SequencerConfig {
        enabled: json.enabled,
        repeat: json.repeat,
        rows: json.rows,
        cols: json.cols,
        num_frames: json.num_frames,
        time_per_frame_ms: json.time_per_frame,
    })
}

/// Load a sequence descriptor file from disk.
pub fn load_sequence_descriptor(path: &Path) -> Result<SequencerConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read sequence descriptor {}: {e}", path.display()))?;
    parse_sequence_descriptor(&raw, &path.display().to_string())
}

fn validate_descriptor(json: &SequenceDescriptorJson, origin: &str) -> Result<(), String> {
    if json.version != "0.1" {
        return Err(format!(
            "Sequence validation failed ({origin}): unsupported version '{}'",
            json.version
        ));
    }
    if json.num_frames > 0 && json.cols == 0 {
        return Err(format!(
            "Sequence validation failed ({origin}): numFrames is {} but cols is 0",
            json.num_frames
        ));
    }
    let cells = u64::from(json.rows) * u64::from(json.cols);
    if u64::from(json.num_frames) > cells {
        log::warn!(
            "Sequence {origin}: numFrames {} exceeds the {}x{} grid; trailing frames map outside the atlas",
            json.num_frames,
            json.rows,
            json.cols
        );
    }
    Ok(())
}
