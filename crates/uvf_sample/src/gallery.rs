//! One-at-a-time showcase of the loaded sequences.
//!
//! Exactly one node is enabled. Q and E step backwards/forwards through the
//! list (debounced), which hides the current node and shows and restarts the
//! next one. R restarts the current sequence, Space pauses/resumes it.

use glam::Vec2;
use uvf_core::input::{InputState, Key};
use uvf_core::{run_update, FrameSequencer, Node, World, CUR_ROW_COL_PARAM};

use crate::selector::CyclicSelector;

/// Minimum simulated time between two selection changes.
pub const SELECT_DEBOUNCE_US: u64 = 250_000;

pub struct GalleryEntry {
    pub node: Node,
    pub sequencer: FrameSequencer,
}

pub struct Gallery {
    pub world: World,
    entries: Vec<GalleryEntry>,
    selector: CyclicSelector,
    since_last_select_us: u64,
}

impl Gallery {
    /// Takes ownership of the nodes and shows the first one.
    pub fn new(world: World, entries: Vec<GalleryEntry>) -> Self {
        let mut gallery = Self {
            world,
            selector: CyclicSelector::new(entries.len()),
            entries,
            since_last_select_us: 0,
        };
        for entry in &mut gallery.entries {
            entry.node.enabled = false;
        }
        if let Some(first) = gallery.entries.first_mut() {
            first.node.enabled = true;
        }
        gallery
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    pub fn selected_index(&self) -> usize {
        self.selector.index()
    }

    pub fn selected(&self) -> Option<&GalleryEntry> {
        self.entries.get(self.selector.index())
    }

    /// React to this frame's key presses. `dt_us` feeds the selection debounce.
    pub fn handle_input(&mut self, input: &InputState, dt_us: u64) {
        self.since_last_select_us = self.since_last_select_us.saturating_add(dt_us);

        if input.is_just_pressed(Key::Q) && self.since_last_select_us > SELECT_DEBOUNCE_US {
            self.select(self.selector.previous());
        }
        if input.is_just_pressed(Key::E) && self.since_last_select_us > SELECT_DEBOUNCE_US {
            self.select(self.selector.next());
        }
        if input.is_just_pressed(Key::R) {
            if let Some(entry) = self.entries.get_mut(self.selector.index()) {
                entry.sequencer.reset(&mut self.world);
                log::info!("'{}' restarted", entry.node.name);
            }
        }
        if input.is_just_pressed(Key::Space) {
            if let Some(entry) = self.entries.get_mut(self.selector.index()) {
                let enable = !entry.sequencer.is_enabled();
                if entry.sequencer.set_enabled(enable) {
                    log::info!(
                        "'{}' {}",
                        entry.node.name,
                        if enable { "resumed" } else { "paused" }
                    );
                }
            }
        }
    }

    /// Hide the current node, then show and restart the node at `index`.
    pub fn select(&mut self, index: usize) {
        if self.entries.is_empty() {
            return;
        }
        if let Some(current) = self.entries.get_mut(self.selector.index()) {
            current.node.enabled = false;
        }
        self.selector.select(index);
        let entry = &mut self.entries[self.selector.index()];
        entry.node.enabled = true;
        entry.sequencer.set_enabled(true);
        entry.sequencer.reset(&mut self.world);
        self.since_last_select_us = 0;

        log::info!(
            "Showing '{}' ({}/{})",
            entry.node.name,
            self.selector.index() + 1,
            self.selector.len()
        );
    }

    /// Stand-in for visibility culling: a drawable is in view iff its node is
    /// enabled.
    pub fn update_visibility(&mut self) {
        for entry in &self.entries {
            for &handle in entry.node.drawables() {
                if let Some(drawable) = self.world.drawables.get_mut(handle) {
                    drawable.set_in_view(entry.node.enabled);
                }
            }
        }
    }

    /// One frame of the update pass.
    pub fn update(&mut self, time_step: f32) {
        self.update_visibility();
        for entry in &mut self.entries {
            run_update(&entry.node, &mut entry.sequencer, time_step, &mut self.world);
        }
    }

    /// Last `CurRowCol` committed to the entry's material.
    pub fn committed_row_col(&self, entry: &GalleryEntry) -> Option<Vec2> {
        let material = entry.sequencer.material()?;
        self.world
            .materials
            .get(material)?
            .shader_parameter(CUR_ROW_COL_PARAM)
    }

    pub fn log_summary(&self) {
        for (i, entry) in self.entries.iter().enumerate() {
            let marker = if i == self.selected_index() { '*' } else { ' ' };
            let row_col = self
                .committed_row_col(entry)
                .map(|v| format!("({}, {})", v.x, v.y))
                .unwrap_or_else(|| "-".to_string());
            let uv = entry
                .sequencer
                .current_row_col()
                .and_then(|(row, col)| entry.sequencer.config().grid().cell_uv_rect(row, col));
            log::info!(
                "{marker} {:<10} frame {:>3}/{:<3} {}={} uv={:?}{}",
                entry.node.name,
                entry.sequencer.current_frame(),
                entry.sequencer.config().num_frames,
                CUR_ROW_COL_PARAM,
                row_col,
                uv,
                if entry.sequencer.is_finished() {
                    " (finished)"
                } else {
                    ""
                }
            );
        }
    }
}
