//! Closed set of trackable resources

use std::fmt;
use std::rc::Rc;

use crate::render::api::NativeHandle;
use crate::render::resources::{Geometry, Material, OutlineGeometry, ResourceId, Texture};

/// Any resource the tracker can count
///
/// Cloning a `Resource` clones the `Rc`, so the clone is the same resource.
#[derive(Debug, Clone)]
pub enum Resource {
    /// Triangle geometry
    Geometry(Rc<Geometry>),
    /// Outline line buffer
    OutlineGeometry(Rc<OutlineGeometry>),
    /// Material, owning its textures
    Material(Rc<Material>),
    /// Texture
    Texture(Rc<Texture>),
}

impl Resource {
    /// Identity used as the tracking key
    pub fn id(&self) -> ResourceId {
        match self {
            Self::Geometry(r) => r.id(),
            Self::OutlineGeometry(r) => r.id(),
            Self::Material(r) => r.id(),
            Self::Texture(r) => r.id(),
        }
    }

    /// Backend handle released on disposal
    pub fn native(&self) -> NativeHandle {
        match self {
            Self::Geometry(r) => r.native(),
            Self::OutlineGeometry(r) => r.native(),
            Self::Material(r) => r.native(),
            Self::Texture(r) => r.native(),
        }
    }

    /// Category name for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Geometry(_) => "geometry",
            Self::OutlineGeometry(_) => "outline",
            Self::Material(_) => "material",
            Self::Texture(_) => "texture",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.category(), self.id())
    }
}

impl From<Rc<Geometry>> for Resource {
    fn from(value: Rc<Geometry>) -> Self {
        Self::Geometry(value)
    }
}

impl From<Rc<OutlineGeometry>> for Resource {
    fn from(value: Rc<OutlineGeometry>) -> Self {
        Self::OutlineGeometry(value)
    }
}

impl From<Rc<Material>> for Resource {
    fn from(value: Rc<Material>) -> Self {
        Self::Material(value)
    }
}

impl From<Rc<Texture>> for Resource {
    fn from(value: Rc<Texture>) -> Self {
        Self::Texture(value)
    }
}
