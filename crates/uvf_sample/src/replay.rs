//! Scripted key presses for the headless sample.
//!
//! ```json
//! { "fixed_dt": 0.016666667,
//!   "frames": [ { "repeat": 90 }, { "press": ["e"] }, { "repeat": 120 } ] }
//! ```
//!
//! Each frame entry covers `repeat` fixed steps. Keys listed in `press` are
//! tapped (down at the start, up at the end) on the first of those steps only.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use uvf_core::input::Key;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub press: Vec<String>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    /// Keys tapped on each fixed step, one entry per step.
    pub fn expanded_presses(&self) -> Vec<Vec<Key>> {
        let mut out = Vec::new();
        for frame in &self.frames {
            let keys: Vec<Key> = frame
                .press
                .iter()
                .filter_map(|name| Key::from_name(name))
                .collect();
            out.push(keys);
            for _ in 1..frame.repeat.max(1) {
                out.push(Vec::new());
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt.is_nan() || replay.fixed_dt <= 0.0 {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    for (i, frame) in replay.frames.iter().enumerate() {
        for name in &frame.press {
            if Key::from_name(name).is_none() {
                return Err(format!(
                    "Replay validation failed: frame {i} presses unknown key '{name}'"
                ));
            }
        }
    }
    Ok(())
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}
