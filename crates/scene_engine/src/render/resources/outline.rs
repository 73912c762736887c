//! Outline line buffers derived from a geometry

use std::rc::Rc;

use crate::render::api::{NativeHandle, RenderBackend};
use crate::render::primitives::extract_edges;
use crate::render::resources::{Geometry, ResourceId};

/// Line segments tracing the feature edges of a [`Geometry`]
#[derive(Debug)]
pub struct OutlineGeometry {
    id: ResourceId,
    source: ResourceId,
    positions: Vec<[f32; 3]>,
    native: NativeHandle,
}

impl OutlineGeometry {
    /// Extract the outline of `geometry` and upload it
    ///
    /// Edges whose adjoining faces meet at less than `threshold_deg` are
    /// dropped.
    pub fn from_geometry(backend: &mut dyn RenderBackend, geometry: &Geometry, threshold_deg: f32) -> Rc<Self> {
        let positions = extract_edges(geometry.data(), threshold_deg);
        let native = backend.create_line_geometry(&positions);
        let outline = Self {
            id: ResourceId::next(),
            source: geometry.id(),
            positions,
            native,
        };
        log::debug!(
            "Derived outline {} from {} ({} segments)",
            outline.id,
            outline.source,
            outline.segment_count()
        );
        Rc::new(outline)
    }

    /// Resource identity
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Identity of the geometry the outline was derived from
    pub fn source(&self) -> ResourceId {
        self.source
    }

    /// Segment endpoints, two per segment
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Number of line segments
    pub fn segment_count(&self) -> usize {
        self.positions.len() / 2
    }

    /// Backend handle
    pub fn native(&self) -> NativeHandle {
        self.native
    }
}
