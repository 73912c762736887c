//! Uploaded triangle geometry

use std::rc::Rc;

use crate::render::api::{NativeHandle, RenderBackend};
use crate::render::primitives::GeometryData;
use crate::render::resources::ResourceId;

/// Indexed triangle geometry living on the backend
///
/// The CPU copy of the data is kept so outlines can be derived from it.
#[derive(Debug)]
pub struct Geometry {
    id: ResourceId,
    label: String,
    data: GeometryData,
    native: NativeHandle,
}

impl Geometry {
    /// Upload `data` and wrap it in a shared handle
    pub fn upload(backend: &mut dyn RenderBackend, label: impl Into<String>, data: GeometryData) -> Rc<Self> {
        let native = backend.create_geometry(&data);
        let geometry = Self {
            id: ResourceId::next(),
            label: label.into(),
            data,
            native,
        };
        log::debug!("Uploaded geometry '{}' as {}", geometry.label, geometry.id);
        Rc::new(geometry)
    }

    /// Resource identity
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Debug label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// CPU-side vertex and index data
    pub fn data(&self) -> &GeometryData {
        &self.data
    }

    /// Backend handle
    pub fn native(&self) -> NativeHandle {
        self.native
    }

    /// Number of triangles drawn per instance
    pub fn triangle_count(&self) -> usize {
        self.data.triangle_count()
    }
}
