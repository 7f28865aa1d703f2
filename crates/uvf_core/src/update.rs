//! Per-frame update pass for node components.
//!
//! Components do no scheduling of their own. The host walks its nodes once per
//! frame and calls `run_update` for each attached component. A component is
//! started lazily: `delayed_start` runs right before its first update, once the
//! node's siblings exist, and never again.

use crate::host::{Node, World};

/// Capability of a component that the per-frame driver can update.
pub trait Tickable {
    /// `delayed_start` has already run.
    fn is_started(&self) -> bool;

    /// One-time binding to sibling components on `node`.
    fn delayed_start(&mut self, node: &Node, world: &mut World);

    /// Whether the component currently wants update calls.
    fn wants_update(&self) -> bool;

    fn update(&mut self, time_step: f32, world: &mut World);
}

/// Drive one component for one frame. Components on disabled nodes are
/// neither started nor updated.
pub fn run_update<T: Tickable + ?Sized>(
    node: &Node,
    component: &mut T,
    time_step: f32,
    world: &mut World,
) {
    if !node.enabled {
        return;
    }
    if !component.is_started() {
        component.delayed_start(node, world);
    }
    if component.wants_update() {
        component.update(time_step, world);
    }
}
