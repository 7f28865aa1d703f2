//! Texture-atlas UV frame sequencer.
//!
//! A `FrameSequencer` sits on a scene node next to a billboard or static model
//! and steps through the cells of an atlas texture. On every frame change it
//! writes the current `(row, col)` into the bound material as the
//! `CurRowCol` shader parameter; the material's shader does the UV offset.
//!
//! Timing is accumulated from the per-frame time step in integer microseconds,
//! so a sequencer that is disabled or out of view does not accrue time. A frame
//! is held while the accumulated time is `<= timePerFrame` and advances on the
//! first tick that pushes it past.
//!
//! Targets are held as registry handles and re-resolved on every use. A
//! material or drawable that the host destroys simply turns the corresponding
//! writes or visibility checks into no-ops.

use glam::Vec2;

use crate::config::SequencerConfig;
use crate::host::{Drawable, DrawableKind, Material, Node, World};
use crate::registry::Handle;
use crate::update::Tickable;

/// Shader parameter receiving the current cell as `Vec2(row, col)`.
pub const CUR_ROW_COL_PARAM: &str = "CurRowCol";

/// Visual target kinds, in binding preference order.
const TARGET_PREFERENCE: [DrawableKind; 2] = [DrawableKind::Billboard, DrawableKind::StaticModel];

#[derive(Debug, Clone)]
pub struct FrameSequencer {
    config: SequencerConfig,
    current_frame: u32,
    elapsed_us: u64,
    /// Whether the host should deliver ticks. Tracks `config.enabled` except
    /// right after binding, where a disabled config suppresses delivery.
    ticking: bool,
    bound: bool,
    finished: bool,
    material: Option<Handle<Material>>,
    drawable: Option<Handle<Drawable>>,
}

impl FrameSequencer {
    pub fn new(config: SequencerConfig) -> Self {
        Self {
            config,
            current_frame: 0,
            elapsed_us: 0,
            ticking: true,
            bound: false,
            finished: false,
            material: None,
            drawable: None,
        }
    }

    /// Replace the attribute set. A grid with fewer frames than cells is
    /// valid. Once bound, tick delivery follows the new `enabled` flag.
    pub fn configure(
        &mut self,
        rows: u32,
        cols: u32,
        num_frames: u32,
        time_per_frame_ms: u32,
        repeat: bool,
        enabled: bool,
    ) {
        self.config = SequencerConfig {
            enabled,
            repeat,
            rows,
            cols,
            num_frames,
            time_per_frame_ms,
        };
        if self.bound {
            self.ticking = enabled;
        }
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Resolve the visual target on `node` (billboard first, then static
    /// model), capture its material, and reset to frame 0.
    pub fn bind_targets(&mut self, node: &Node, world: &mut World) {
        self.drawable = TARGET_PREFERENCE
            .iter()
            .find_map(|&kind| node.find_drawable(world, kind));
        self.material = self
            .drawable
            .and_then(|handle| world.drawables.get(handle))
            .and_then(Drawable::material);

        match self.drawable.and_then(|handle| world.drawables.get(handle)) {
            Some(drawable) => log::debug!(
                "Node '{}': frame sequencer bound to {}",
                node.name,
                drawable.kind()
            ),
            None => log::warn!(
                "Node '{}': no billboard or static model to animate; sequencer stays idle",
                node.name
            ),
        }

        if self.config.cols == 0 && self.config.num_frames > 0 {
            log::warn!(
                "Node '{}': sequencer has {} frames but cols = 0; no cell will be committed",
                node.name,
                self.config.num_frames
            );
        }

        self.bound = true;
        self.reset(world);

        if !self.config.enabled {
            self.ticking = false;
        }
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn material(&self) -> Option<Handle<Material>> {
        self.material
    }

    pub fn drawable(&self) -> Option<Handle<Drawable>> {
        self.drawable
    }

    /// Returns `false` when `enable` matches the current state and nothing
    /// changed.
    pub fn set_enabled(&mut self, enable: bool) -> bool {
        if enable == self.config.enabled {
            return false;
        }
        self.config.enabled = enable;
        self.ticking = enable;
        true
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Whether ticks are currently delivered.
    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    /// Back to frame 0 with a fresh hold timer. Always succeeds.
    pub fn reset(&mut self, world: &mut World) -> bool {
        self.current_frame = 0;
        self.elapsed_us = 0;
        self.finished = false;
        self.commit_frame(0, world);
        true
    }

    /// Per-frame entry point with the host's time step in seconds.
    pub fn tick(&mut self, time_step: f32, world: &mut World) {
        self.tick_us(time_step_to_us(time_step), world);
    }

    pub fn tick_us(&mut self, dt_us: u64, world: &mut World) {
        if !self.ticking {
            return;
        }
        let in_view = self
            .drawable
            .and_then(|handle| world.drawables.get(handle))
            .is_some_and(Drawable::is_in_view);
        if !in_view {
            return;
        }

        self.elapsed_us = self.elapsed_us.saturating_add(dt_us);
        self.advance(world);
    }

    /// Step to the next frame once the hold time has been exceeded.
    pub fn advance(&mut self, world: &mut World) {
        if self.elapsed_us <= self.config.time_per_frame_us() {
            return;
        }

        let next = self.current_frame.saturating_add(1);
        if next < self.config.num_frames {
            self.current_frame = next;
            self.commit_frame(next, world);
        } else if self.config.repeat {
            self.current_frame = 0;
            self.commit_frame(0, world);
        } else {
            // The last frame stays on screen; it was committed on the previous advance.
            self.finished = true;
            self.set_enabled(false);
            self.ticking = false;
        }

        self.elapsed_us = 0;
    }

    /// Write the cell of `index` into the bound material.
    pub fn commit_frame(&self, index: u32, world: &mut World) {
        let Some(handle) = self.material else {
            return;
        };
        let Some((row, col)) = self.config.grid().cell_coords(index) else {
            log::trace!("Frame {index} has no cell with cols = 0");
            return;
        };
        match world.materials.get_mut(handle) {
            Some(material) => {
                material.set_shader_parameter(CUR_ROW_COL_PARAM, Vec2::new(row as f32, col as f32));
                log::trace!(
                    "Material '{}': {CUR_ROW_COL_PARAM} = ({row}, {col})",
                    material.name()
                );
            }
            None => log::debug!("Bound material was released; frame {index} not committed"),
        }
    }

    /// Index of the frame on display. Stays on the last frame once a
    /// non-repeating sequence has finished.
    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    pub fn current_row_col(&self) -> Option<(u32, u32)> {
        self.config.grid().cell_coords(self.current_frame)
    }

    /// Time accrued since the last frame change, in microseconds.
    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_us
    }

    /// A non-repeating sequence ran past its last frame and disabled itself.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Tickable for FrameSequencer {
    fn is_started(&self) -> bool {
        self.bound
    }

    fn delayed_start(&mut self, node: &Node, world: &mut World) {
        self.bind_targets(node, world);
    }

    fn wants_update(&self) -> bool {
        self.ticking
    }

    fn update(&mut self, time_step: f32, world: &mut World) {
        self.tick(time_step, world);
    }
}

fn time_step_to_us(time_step: f32) -> u64 {
    if time_step.is_finite() && time_step > 0.0 {
        (f64::from(time_step) * 1_000_000.0).round() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        world: World,
        node: Node,
        material: Handle<Material>,
        drawable: Handle<Drawable>,
    }

    /// One node with a single in-view billboard.
    fn fixture() -> Fixture {
        let mut world = World::new();
        let material = world.materials.insert(Material::new("atlas"));
        let drawable = world.drawables.insert(Drawable::billboard(material));
        world
            .drawables
            .get_mut(drawable)
            .expect("fresh drawable")
            .set_in_view(true);
        let mut node = Node::new("fx");
        node.attach_drawable(drawable);
        Fixture {
            world,
            node,
            material,
            drawable,
        }
    }

    fn config(rows: u32, cols: u32, num_frames: u32, ms: u32, repeat: bool) -> SequencerConfig {
        SequencerConfig {
            enabled: true,
            repeat,
            rows,
            cols,
            num_frames,
            time_per_frame_ms: ms,
        }
    }

    fn bound(fx: &mut Fixture, config: SequencerConfig) -> FrameSequencer {
        let mut seq = FrameSequencer::new(config);
        seq.bind_targets(&fx.node, &mut fx.world);
        seq
    }

    fn row_col(fx: &Fixture) -> Option<Vec2> {
        fx.world
            .materials
            .get(fx.material)
            .and_then(|m| m.shader_parameter(CUR_ROW_COL_PARAM))
    }

    #[test]
    fn bind_commits_frame_zero() {
        let mut fx = fixture();
        let seq = bound(&mut fx, config(2, 2, 4, 10, true));
        assert!(seq.is_bound());
        assert_eq!(seq.current_frame(), 0);
        assert_eq!(seq.material(), Some(fx.material));
        assert_eq!(seq.drawable(), Some(fx.drawable));
        assert_eq!(row_col(&fx), Some(Vec2::ZERO));
    }

    #[test]
    fn repeat_wraps_to_zero() {
        let mut fx = fixture();
        let mut seq = bound(&mut fx, config(2, 2, 4, 10, true));

        let mut visited = Vec::new();
        for _ in 0..8 {
            seq.tick_us(11_000, &mut fx.world);
            visited.push(seq.current_frame());
        }
        assert_eq!(visited, vec![1, 2, 3, 0, 1, 2, 3, 0]);
        assert!(seq.is_enabled());
        assert!(!seq.is_finished());
    }

    #[test]
    fn non_repeat_disables_after_last_frame() {
        let mut fx = fixture();
        let mut seq = bound(&mut fx, config(1, 3, 3, 10, false));

        seq.tick_us(11_000, &mut fx.world);
        seq.tick_us(11_000, &mut fx.world);
        assert_eq!(seq.current_frame(), 2);
        assert_eq!(row_col(&fx), Some(Vec2::new(0.0, 2.0)));

        seq.tick_us(11_000, &mut fx.world);
        assert!(!seq.is_enabled());
        assert!(!seq.is_ticking());
        assert!(seq.is_finished());
        assert_eq!(seq.current_frame(), 2);

        // Further ticks change nothing, including the committed cell.
        for _ in 0..5 {
            seq.tick_us(50_000, &mut fx.world);
        }
        assert_eq!(seq.current_frame(), 2);
        assert_eq!(seq.elapsed_us(), 0);
        assert_eq!(row_col(&fx), Some(Vec2::new(0.0, 2.0)));
    }

    #[test]
    fn frame_is_held_until_time_per_frame_is_exceeded() {
        let mut fx = fixture();
        let mut seq = bound(&mut fx, config(2, 2, 4, 100, true));

        seq.tick_us(60_000, &mut fx.world);
        assert_eq!(seq.current_frame(), 0);
        // Exactly at the hold time: still held.
        seq.tick_us(40_000, &mut fx.world);
        assert_eq!(seq.current_frame(), 0);
        seq.tick_us(1, &mut fx.world);
        assert_eq!(seq.current_frame(), 1);
        assert_eq!(seq.elapsed_us(), 0);
    }

    #[test]
    fn tick_converts_seconds() {
        let mut fx = fixture();
        let mut seq = bound(&mut fx, config(2, 2, 4, 10, true));
        seq.tick(0.005, &mut fx.world);
        assert_eq!(seq.elapsed_us(), 5_000);
        seq.tick(0.006, &mut fx.world);
        assert_eq!(seq.current_frame(), 1);

        // Negative or NaN steps accrue nothing.
        seq.tick(-1.0, &mut fx.world);
        seq.tick(f32::NAN, &mut fx.world);
        assert_eq!(seq.elapsed_us(), 0);
    }

    #[test]
    fn reset_returns_to_frame_zero() {
        let mut fx = fixture();
        let mut seq = bound(&mut fx, config(2, 2, 4, 10, true));
        seq.tick_us(11_000, &mut fx.world);
        seq.tick_us(11_000, &mut fx.world);
        seq.tick_us(4_000, &mut fx.world);
        assert_eq!(seq.current_frame(), 2);

        assert!(seq.reset(&mut fx.world));
        assert_eq!(seq.current_frame(), 0);
        assert_eq!(seq.elapsed_us(), 0);
        assert_eq!(row_col(&fx), Some(Vec2::ZERO));
    }

    #[test]
    fn reset_does_not_re_enable_finished_sequence() {
        let mut fx = fixture();
        let mut seq = bound(&mut fx, config(1, 2, 2, 1, false));
        seq.tick_us(2_000, &mut fx.world);
        seq.tick_us(2_000, &mut fx.world);
        assert!(seq.is_finished());

        assert!(seq.reset(&mut fx.world));
        assert!(!seq.is_finished());
        assert!(!seq.is_ticking());

        assert!(seq.set_enabled(true));
        seq.tick_us(2_000, &mut fx.world);
        assert_eq!(seq.current_frame(), 1);
    }

    #[test]
    fn set_enabled_is_idempotent() {
        let mut fx = fixture();
        let mut seq = bound(&mut fx, config(2, 2, 4, 10, true));
        seq.tick_us(4_000, &mut fx.world);

        assert!(!seq.set_enabled(true));
        assert!(seq.is_ticking());
        assert_eq!(seq.elapsed_us(), 4_000);

        assert!(seq.set_enabled(false));
        assert!(!seq.is_ticking());
        assert!(!seq.set_enabled(false));
    }

    #[test]
    fn disabled_sequencer_accrues_no_time() {
        let mut fx = fixture();
        let mut seq = bound(&mut fx, config(2, 2, 4, 10, true));
        seq.set_enabled(false);
        seq.tick_us(1_000_000, &mut fx.world);
        assert_eq!(seq.elapsed_us(), 0);

        seq.set_enabled(true);
        seq.tick_us(1_000, &mut fx.world);
        assert_eq!(seq.current_frame(), 0);
        assert_eq!(seq.elapsed_us(), 1_000);
    }

    #[test]
    fn disabled_config_suppresses_ticks_after_bind() {
        let mut fx = fixture();
        let mut cfg = config(2, 2, 4, 10, true);
        cfg.enabled = false;
        let mut seq = FrameSequencer::new(cfg);
        assert!(seq.is_ticking());

        seq.bind_targets(&fx.node, &mut fx.world);
        assert!(!seq.is_ticking());
        assert!(!seq.is_enabled());
        // Frame 0 is still committed on bind.
        assert_eq!(row_col(&fx), Some(Vec2::ZERO));

        seq.tick_us(50_000, &mut fx.world);
        assert_eq!(seq.current_frame(), 0);

        assert!(seq.set_enabled(true));
        seq.tick_us(11_000, &mut fx.world);
        assert_eq!(seq.current_frame(), 1);
    }

    #[test]
    fn out_of_view_ticks_are_skipped() {
        let mut fx = fixture();
        let mut seq = bound(&mut fx, config(2, 2, 4, 10, true));
        fx.world
            .drawables
            .get_mut(fx.drawable)
            .expect("live drawable")
            .set_in_view(false);

        seq.tick_us(500_000, &mut fx.world);
        assert_eq!(seq.current_frame(), 0);
        assert_eq!(seq.elapsed_us(), 0);
    }

    #[test]
    fn coordinate_mapping_uses_cols() {
        let mut fx = fixture();
        let seq = bound(&mut fx, config(3, 3, 9, 10, true));
        seq.commit_frame(7, &mut fx.world);
        assert_eq!(row_col(&fx), Some(Vec2::new(2.0, 1.0)));
    }

    #[test]
    fn prefers_billboard_over_static_model() {
        let mut world = World::new();
        let model_mat = world.materials.insert(Material::new("plane"));
        let bb_mat = world.materials.insert(Material::new("fire"));
        let model = world.drawables.insert(Drawable::static_model(model_mat));
        let billboard = world.drawables.insert(Drawable::billboard(bb_mat));
        let mut node = Node::new("both");
        node.attach_drawable(model);
        node.attach_drawable(billboard);

        let mut seq = FrameSequencer::new(config(2, 2, 4, 10, true));
        seq.bind_targets(&node, &mut world);
        assert_eq!(seq.drawable(), Some(billboard));
        assert_eq!(seq.material(), Some(bb_mat));
        assert!(world
            .materials
            .get(model_mat)
            .and_then(|m| m.shader_parameter(CUR_ROW_COL_PARAM))
            .is_none());
    }

    #[test]
    fn falls_back_to_static_model() {
        let mut world = World::new();
        let mat = world.materials.insert(Material::new("plane"));
        let model = world.drawables.insert(Drawable::static_model(mat));
        let mut node = Node::new("plane");
        node.attach_drawable(model);

        let mut seq = FrameSequencer::new(config(2, 2, 4, 10, true));
        seq.bind_targets(&node, &mut world);
        assert_eq!(seq.drawable(), Some(model));
        assert_eq!(seq.material(), Some(mat));
    }

    #[test]
    fn node_without_visual_target_stays_idle() {
        let mut world = World::new();
        let node = Node::new("empty");
        let mut seq = FrameSequencer::new(config(2, 2, 4, 10, true));
        seq.bind_targets(&node, &mut world);

        assert!(seq.is_bound());
        assert!(seq.drawable().is_none());
        assert!(seq.material().is_none());
        seq.tick_us(1_000_000, &mut world);
        assert_eq!(seq.current_frame(), 0);
    }

    #[test]
    fn released_material_turns_commits_into_no_ops() {
        let mut fx = fixture();
        let mut seq = bound(&mut fx, config(2, 2, 4, 10, true));
        fx.world.materials.remove(fx.material);

        seq.tick_us(11_000, &mut fx.world);
        assert_eq!(seq.current_frame(), 1);
        assert!(row_col(&fx).is_none());
    }

    #[test]
    fn released_drawable_stops_ticks() {
        let mut fx = fixture();
        let mut seq = bound(&mut fx, config(2, 2, 4, 10, true));
        fx.world.drawables.remove(fx.drawable);

        seq.tick_us(11_000, &mut fx.world);
        assert_eq!(seq.current_frame(), 0);
    }

    #[test]
    fn zero_cols_never_panics() {
        let mut fx = fixture();
        let mut seq = bound(&mut fx, config(0, 0, 3, 1, true));
        for _ in 0..4 {
            seq.tick_us(2_000, &mut fx.world);
        }
        assert_eq!(seq.current_frame(), 1);
        assert!(seq.current_row_col().is_none());
        assert!(row_col(&fx).is_none());
    }

    #[test]
    fn frame_index_stays_in_range() {
        let mut fx = fixture();
        let mut seq = bound(&mut fx, config(4, 3, 11, 7, true));

        // Deterministic pseudo-random time steps between 0 and ~20ms.
        let mut x: u64 = 0x2545_f491;
        for _ in 0..2_000 {
            x = x.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            seq.tick_us((x >> 33) % 20_000, &mut fx.world);
            assert!(seq.current_frame() < 11);
        }
    }

    #[test]
    fn configure_disabled_after_bind_stops_ticks() {
        let mut fx = fixture();
        let mut seq = bound(&mut fx, config(2, 2, 4, 10, true));

        seq.configure(2, 2, 4, 10, true, false);
        assert!(!seq.is_enabled());
        assert!(!seq.is_ticking());

        seq.tick_us(11_000, &mut fx.world);
        assert_eq!(seq.current_frame(), 0);
        assert!(!seq.set_enabled(false));

        assert!(seq.set_enabled(true));
        seq.tick_us(11_000, &mut fx.world);
        assert_eq!(seq.current_frame(), 1);
    }

    #[test]
    fn configure_enabled_revives_finished_sequence() {
        let mut fx = fixture();
        let mut seq = bound(&mut fx, config(1, 2, 2, 1, false));
        seq.tick_us(2_000, &mut fx.world);
        seq.tick_us(2_000, &mut fx.world);
        assert!(seq.is_finished());
        assert!(!seq.is_ticking());

        seq.configure(1, 2, 2, 1, false, true);
        assert!(seq.is_ticking());
        assert!(seq.reset(&mut fx.world));
        seq.tick_us(2_000, &mut fx.world);
        assert_eq!(seq.current_frame(), 1);

        // Delivery and flag stay in step afterwards.
        assert!(seq.set_enabled(false));
        assert!(!seq.is_ticking());
    }

    #[test]
    fn configure_before_bind_leaves_suppression_to_bind() {
        let mut fx = fixture();
        let mut seq = FrameSequencer::new(SequencerConfig::default());
        seq.configure(2, 2, 4, 10, true, false);
        assert!(seq.is_ticking());

        seq.bind_targets(&fx.node, &mut fx.world);
        assert!(!seq.is_ticking());
    }

    #[test]
    fn drawable_without_material_binds_but_never_commits() {
        let mut fx = fixture();
        fx.world
            .drawables
            .get_mut(fx.drawable)
            .expect("live drawable")
            .set_material(None);

        let mut seq = bound(&mut fx, config(2, 2, 4, 10, true));
        assert_eq!(seq.drawable(), Some(fx.drawable));
        assert!(seq.material().is_none());

        seq.tick_us(11_000, &mut fx.world);
        assert_eq!(seq.current_frame(), 1);
        assert!(row_col(&fx).is_none());
    }

    #[test]
    fn empty_sequence_without_columns_keeps_cycling_quietly() {
        let mut fx = fixture();
        let mut seq = bound(&mut fx, config(0, 0, 0, 1, true));
        for _ in 0..100 {
            seq.tick_us(2_000, &mut fx.world);
        }
        assert_eq!(seq.current_frame(), 0);
        assert!(seq.is_ticking());
        assert!(row_col(&fx).is_none());
    }

    #[test]
    fn configure_replaces_attributes() {
        let mut seq = FrameSequencer::new(SequencerConfig::default());
        seq.configure(4, 3, 10, 25, true, true);
        assert_eq!(*seq.config(), config(4, 3, 10, 25, true));
        assert!(!seq.is_bound());
    }
}
