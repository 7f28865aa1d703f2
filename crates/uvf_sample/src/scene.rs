//! Gallery scene descriptor: which sequences to show and where their
//! descriptors live.
//!
//! ```json
//! { "version": "0.1", "scene_id": "uvframe_gallery",
//!   "sequences": [
//!     { "id": "fire1", "material": "bigfire_alpha",
//!       "descriptor": "assets/uvframe/sequences/bigfire.json" } ] }
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use uvf_core::{
    load_sequence_descriptor, Drawable, DrawableKind, FrameSequencer, Material, Node, World,
};

use crate::gallery::{Gallery, GalleryEntry};

#[derive(Debug, Deserialize, Clone)]
pub struct SceneFile {
    pub version: String,
    pub scene_id: String,
    pub sequences: Vec<SceneSequence>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SceneSequence {
    pub id: String,
    pub material: String,
    pub descriptor: String,
    #[serde(default)]
    pub kind: TargetKind,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    #[default]
    Billboard,
    StaticModel,
}

impl From<TargetKind> for DrawableKind {
    fn from(kind: TargetKind) -> Self {
        match kind {
            TargetKind::Billboard => DrawableKind::Billboard,
            TargetKind::StaticModel => DrawableKind::StaticModel,
        }
    }
}

pub fn load_scene_from_path(scene_path: &Path) -> Result<SceneFile, String> {
    let raw = fs::read_to_string(scene_path)
        .map_err(|e| format!("Failed to read scene file {}: {e}", scene_path.display()))?;
    let scene: SceneFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse scene JSON {}: {e}", scene_path.display()))?;
    validate_scene(&scene)?;
    Ok(scene)
}

fn validate_scene(scene: &SceneFile) -> Result<(), String> {
    if scene.version != "0.1" {
        return Err(format!(
            "Scene validation failed: unsupported version '{}'",
            scene.version
        ));
    }
    if scene.sequences.is_empty() {
        return Err("Scene validation failed: sequences array is empty".to_string());
    }

    let mut ids = HashSet::new();
    for sequence in &scene.sequences {
        if !ids.insert(sequence.id.as_str()) {
            return Err(format!(
                "Scene validation failed: duplicate sequence id '{}'",
                sequence.id
            ));
        }
        if sequence.descriptor.is_empty() {
            return Err(format!(
                "Scene validation failed: sequence '{}' has an empty descriptor path",
                sequence.id
            ));
        }
    }

    Ok(())
}

/// Create one disabled node per sequence, each carrying a drawable with its
/// own material and an unbound frame sequencer.
pub fn build_gallery(scene: &SceneFile) -> Result<Gallery, String> {
    let mut world = World::new();
    let mut entries = Vec::with_capacity(scene.sequences.len());

    for sequence in &scene.sequences {
        let config = load_sequence_descriptor(Path::new(&sequence.descriptor))
            .map_err(|e| format!("Sequence '{}': {e}", sequence.id))?;

        let material = world.materials.insert(Material::new(&sequence.material));
        let drawable = world
            .drawables
            .insert(Drawable::new(sequence.kind.into(), Some(material)));

        let mut node = Node::new(&sequence.id);
        node.enabled = false;
        node.attach_drawable(drawable);

        log::debug!(
            "Sequence '{}': {}x{} grid, {} frames, {}ms/frame, repeat={}",
            sequence.id,
            config.rows,
            config.cols,
            config.num_frames,
            config.time_per_frame_ms,
            config.repeat
        );

        entries.push(GalleryEntry {
            node,
            sequencer: FrameSequencer::new(config),
        });
    }

    log::info!(
        "Scene '{}' built with {} sequences",
        scene.scene_id,
        entries.len()
    );
    Ok(Gallery::new(world, entries))
}
