//! Renderer singleton and its host surface
//!
//! The renderer owns one output surface attached to a [`HostSurface`], the
//! container the application embeds it in. It has a single owner and no
//! reference counting; tearing it down goes through
//! [`crate::scene::disposal::dispose_renderer`].

use crate::core::RendererConfig;
use crate::render::api::{DrawCall, RenderBackend, Topology};
use crate::render::resources::Color;
use crate::scene::{Node, Scene};

/// Container the output surface is attached to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSurface {
    elements: Vec<String>,
}

impl HostSurface {
    /// Create an empty host
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an element
    pub fn append(&mut self, element: impl Into<String>) {
        self.elements.push(element.into());
    }

    /// Detach an element; returns whether it was attached
    pub fn remove(&mut self, element: &str) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| e != element);
        self.elements.len() != before
    }

    /// Detach everything
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Attached elements
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// Whether `element` is attached
    pub fn contains(&self, element: &str) -> bool {
        self.elements.iter().any(|e| e == element)
    }
}

/// The output surface
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSurface {
    /// Element id in the host
    pub element: String,
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels
    pub height: u32,
    /// Device pixel ratio, already clamped
    pub pixel_ratio: f32,
    /// Clear color
    pub clear_color: Color,
}

impl OutputSurface {
    /// Backing store size in device pixels
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        (
            (self.width as f32 * self.pixel_ratio).round() as u32,
            (self.height as f32 * self.pixel_ratio).round() as u32,
        )
    }
}

/// Draws a [`Scene`] through a [`RenderBackend`]
#[derive(Debug)]
pub struct Renderer {
    surface: OutputSurface,
}

impl Renderer {
    /// Create the renderer and attach its surface to `host`
    ///
    /// Anything already attached to the host is removed first, so a
    /// re-created renderer never stacks surfaces.
    pub fn new(config: &RendererConfig, host: &mut HostSurface) -> Self {
        if !host.elements().is_empty() {
            log::debug!("Removing {} stale host elements", host.elements().len());
            host.clear();
        }

        let surface = OutputSurface {
            element: format!("canvas-{}", uuid::Uuid::new_v4()),
            width: config.width,
            height: config.height,
            pixel_ratio: config.effective_pixel_ratio(),
            clear_color: Color::from_hex(config.clear_color),
        };
        host.append(surface.element.clone());
        log::info!(
            "Renderer attached {} ({}x{} @ {})",
            surface.element,
            surface.width,
            surface.height,
            surface.pixel_ratio
        );

        Self { surface }
    }

    /// The output surface
    pub fn surface(&self) -> &OutputSurface {
        &self.surface
    }

    /// Resize the output surface
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface.width = width.max(1);
        self.surface.height = height.max(1);
    }

    /// Render one frame: one draw per mesh material, per outline and per visible helper
    pub fn render(&mut self, scene: &Scene, backend: &mut dyn RenderBackend) {
        let mut draws = Vec::new();
        for node in scene.children() {
            collect_draws(node, &mut draws);
        }
        draws.sort_by_key(|(order, _)| *order);

        backend.begin_frame();
        for (_, call) in draws {
            backend.draw(call);
        }
        backend.end_frame();
    }
}

fn collect_draws(node: &Node, out: &mut Vec<(i32, DrawCall)>) {
    match node {
        Node::Group(group) => {
            for child in &group.children {
                collect_draws(child, out);
            }
        }
        Node::Mesh(mesh) => {
            let triangles = mesh.geometry.triangle_count() as u32;
            for material in &mesh.materials {
                out.push((
                    mesh.render_order,
                    DrawCall {
                        geometry: mesh.geometry.native(),
                        material: material.native(),
                        topology: Topology::Triangles(triangles),
                    },
                ));
            }
        }
        Node::Lines(lines) => out.push((
            lines.render_order,
            DrawCall {
                geometry: lines.geometry.native(),
                material: lines.material.native(),
                topology: Topology::Lines(lines.geometry.segment_count() as u32),
            },
        )),
        Node::Helper(helper) if helper.visible => out.push((
            i32::MAX,
            DrawCall {
                geometry: helper.geometry,
                material: helper.material,
                topology: Topology::Lines(helper.segments),
            },
        )),
        Node::Helper(_) | Node::Light(_) => {}
    }
}
