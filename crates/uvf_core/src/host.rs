//! Minimal model of the objects a hosting engine hands to node components.
//!
//! The renderer, scene graph and resource cache all live outside this crate.
//! What a component needs from them is small: a material that accepts named
//! shader parameters, a drawable that reports whether it was in view last
//! frame, and a node that can list its sibling drawables. The host owns all of
//! these through `World`; components only ever see `Handle`s.

use std::collections::HashMap;

use glam::Vec2;

use crate::registry::{Handle, Registry};

/// Named shader parameter table. Only two-component vectors are modelled.
#[derive(Debug, Clone)]
pub struct Material {
    name: String,
    shader_parameters: HashMap<String, Vec2>,
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            shader_parameters: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_shader_parameter(&mut self, name: &str, value: Vec2) {
        self.shader_parameters.insert(name.to_string(), value);
    }

    pub fn shader_parameter(&self, name: &str) -> Option<Vec2> {
        self.shader_parameters.get(name).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawableKind {
    /// Camera-facing quad set.
    Billboard,
    StaticModel,
}

impl DrawableKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Billboard => "billboard",
            Self::StaticModel => "static model",
        }
    }
}

impl std::fmt::Display for DrawableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub struct Drawable {
    kind: DrawableKind,
    material: Option<Handle<Material>>,
    in_view: bool,
}

impl Drawable {
    pub fn new(kind: DrawableKind, material: Option<Handle<Material>>) -> Self {
        Self {
            kind,
            material,
            in_view: false,
        }
    }

    pub fn billboard(material: Handle<Material>) -> Self {
        Self::new(DrawableKind::Billboard, Some(material))
    }

    pub fn static_model(material: Handle<Material>) -> Self {
        Self::new(DrawableKind::StaticModel, Some(material))
    }

    pub fn kind(&self) -> DrawableKind {
        self.kind
    }

    pub fn material(&self) -> Option<Handle<Material>> {
        self.material
    }

    pub fn set_material(&mut self, material: Option<Handle<Material>>) {
        self.material = material;
    }

    /// Whether the drawable passed visibility culling on the last frame.
    pub fn is_in_view(&self) -> bool {
        self.in_view
    }

    pub fn set_in_view(&mut self, in_view: bool) {
        self.in_view = in_view;
    }
}

/// Host-owned storage for everything components may reference.
#[derive(Default)]
pub struct World {
    pub materials: Registry<Material>,
    pub drawables: Registry<Drawable>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A scene node as seen by its components: a name, an enabled flag and the
/// sibling drawables attached to it.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub enabled: bool,
    drawables: Vec<Handle<Drawable>>,
}

impl Node {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
            drawables: Vec::new(),
        }
    }

    pub fn attach_drawable(&mut self, drawable: Handle<Drawable>) {
        self.drawables.push(drawable);
    }

    pub fn drawables(&self) -> &[Handle<Drawable>] {
        &self.drawables
    }

    /// First live drawable of `kind` attached to this node, in attach order.
    pub fn find_drawable(&self, world: &World, kind: DrawableKind) -> Option<Handle<Drawable>> {
        self.drawables.iter().copied().find(|&handle| {
            world
                .drawables
                .get(handle)
                .is_some_and(|drawable| drawable.kind() == kind)
        })
    }
}
