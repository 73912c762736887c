//! Materials
//!
//! A material binds a shared program to its own parameter block. Parameters
//! are interior-mutable so hover and selection styling can change while the
//! material is shared through `Rc` between the scene graph and the tracker.
//!
//! Textures referenced by a material, either through a slot or through a
//! uniform, are owned by that material alone and are released with it. A
//! texture replaced through [`Material::set_texture`] or
//! [`Material::set_uniform`] is released at that point unless the material
//! still references it elsewhere.

use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use crate::render::api::{NativeHandle, ProgramKey, RenderBackend};
use crate::render::resources::{ResourceId, Texture};

/// Uniform holding the face base color
pub const U_BASE_COLOR: &str = "uBaseColor";
/// Uniform holding the light position
pub const U_LIGHT_POSITION: &str = "uLightPosition";
/// Uniform set to 1.0 while selected
pub const U_SELECTED: &str = "uSelected";
/// Uniform set to 1.0 while hovered
pub const U_HOVER: &str = "uHover";

/// Linear RGB color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
}

impl Color {
    /// White
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0 };

    /// Create a color from components
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a color from `0xRRGGBB`
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    /// Pack back into `0xRRGGBB`
    pub fn to_hex(self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }
}

/// Value stored in a material's uniform table
#[derive(Debug, Clone)]
pub enum UniformValue {
    /// Scalar
    Float(f32),
    /// Vector
    Vec3(Vec3),
    /// Color
    Color(Color),
    /// Sampled texture
    Texture(Rc<Texture>),
}

/// Fixed texture slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSlot {
    /// Albedo map
    Map,
    /// Normal map
    NormalMap,
    /// Alpha map
    AlphaMap,
}

/// Material parameter block
#[derive(Debug, Clone)]
pub struct MaterialParams {
    /// Base color
    pub color: Color,
    /// Albedo map
    pub map: Option<Rc<Texture>>,
    /// Normal map
    pub normal_map: Option<Rc<Texture>>,
    /// Alpha map
    pub alpha_map: Option<Rc<Texture>>,
    /// Named uniforms
    pub uniforms: BTreeMap<String, UniformValue>,
}

impl MaterialParams {
    /// Create an empty parameter block
    pub fn new() -> Self {
        Self {
            color: Color::WHITE,
            map: None,
            normal_map: None,
            alpha_map: None,
            uniforms: BTreeMap::new(),
        }
    }

    /// Set the base color
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Attach a texture to a slot
    ///
    /// The material takes ownership of the texture. Do not attach one texture
    /// to two materials: it is freed with whichever is disposed first.
    pub fn with_texture(mut self, slot: TextureSlot, texture: Rc<Texture>) -> Self {
        *self.slot_mut(slot) = Some(texture);
        self
    }

    /// Add a uniform
    pub fn with_uniform(mut self, name: impl Into<String>, value: UniformValue) -> Self {
        self.uniforms.insert(name.into(), value);
        self
    }

    fn slot_mut(&mut self, slot: TextureSlot) -> &mut Option<Rc<Texture>> {
        match slot {
            TextureSlot::Map => &mut self.map,
            TextureSlot::NormalMap => &mut self.normal_map,
            TextureSlot::AlphaMap => &mut self.alpha_map,
        }
    }
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self::new()
    }
}

/// A material instance bound to a backend program
#[derive(Debug)]
pub struct Material {
    id: ResourceId,
    program: ProgramKey,
    native: NativeHandle,
    params: RefCell<MaterialParams>,
}

impl Material {
    /// Allocate a material for `program` with the given parameters
    pub fn create(backend: &mut dyn RenderBackend, program: ProgramKey, params: MaterialParams) -> Rc<Self> {
        let native = backend.create_material(program);
        Rc::new(Self {
            id: ResourceId::next(),
            program,
            native,
            params: RefCell::new(params),
        })
    }

    /// Lit face material with hover and selection uniforms
    pub fn face(backend: &mut dyn RenderBackend, base_color: Color, light_position: Vec3) -> Rc<Self> {
        let params = MaterialParams::new()
            .with_color(base_color)
            .with_uniform(U_BASE_COLOR, UniformValue::Color(base_color))
            .with_uniform(U_LIGHT_POSITION, UniformValue::Vec3(light_position))
            .with_uniform(U_SELECTED, UniformValue::Float(0.0))
            .with_uniform(U_HOVER, UniformValue::Float(0.0));
        Self::create(backend, ProgramKey::Face, params)
    }

    /// Unlit line material
    pub fn line_basic(backend: &mut dyn RenderBackend, color: Color) -> Rc<Self> {
        Self::create(backend, ProgramKey::LineBasic, MaterialParams::new().with_color(color))
    }

    /// Resource identity
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Program family
    pub fn program(&self) -> ProgramKey {
        self.program
    }

    /// Backend handle
    pub fn native(&self) -> NativeHandle {
        self.native
    }

    /// Borrow the parameter block
    pub fn params(&self) -> Ref<'_, MaterialParams> {
        self.params.borrow()
    }

    /// Current base color
    pub fn color(&self) -> Color {
        self.params.borrow().color
    }

    /// Change the base color
    pub fn set_color(&self, color: Color) {
        let mut params = self.params.borrow_mut();
        params.color = color;
        if let Some(UniformValue::Color(c)) = params.uniforms.get_mut(U_BASE_COLOR) {
            *c = color;
        }
    }

    /// Set or replace a uniform
    ///
    /// A texture value that gets replaced is released through `backend`.
    pub fn set_uniform(&self, backend: &mut dyn RenderBackend, name: impl Into<String>, value: UniformValue) {
        let replaced = self.params.borrow_mut().uniforms.insert(name.into(), value);
        if let Some(UniformValue::Texture(old)) = replaced {
            self.release_detached(backend, &old);
        }
    }

    /// Read a scalar uniform
    pub fn float_uniform(&self, name: &str) -> Option<f32> {
        match self.params.borrow().uniforms.get(name) {
            Some(UniformValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    /// Toggle the hover highlight
    pub fn set_hovered(&self, hovered: bool) {
        self.set_flag(U_HOVER, hovered);
    }

    /// Toggle the selection highlight
    pub fn set_selected(&self, selected: bool) {
        self.set_flag(U_SELECTED, selected);
    }

    /// Move the light used for shading
    pub fn set_light_position(&self, position: Vec3) {
        self.write_value_uniform(U_LIGHT_POSITION, UniformValue::Vec3(position));
    }

    /// Attach or detach a texture slot
    ///
    /// The previous texture in the slot is released through `backend`. The
    /// same ownership rule as [`MaterialParams::with_texture`] applies.
    pub fn set_texture(&self, backend: &mut dyn RenderBackend, slot: TextureSlot, texture: Option<Rc<Texture>>) {
        let replaced = std::mem::replace(self.params.borrow_mut().slot_mut(slot), texture);
        if let Some(old) = replaced {
            self.release_detached(backend, &old);
        }
    }

    /// Every texture this material references, slots first, then uniforms
    ///
    /// A texture referenced from more than one place appears more than once.
    pub fn textures(&self) -> Vec<Rc<Texture>> {
        let params = self.params.borrow();
        let slots = [&params.map, &params.normal_map, &params.alpha_map]
            .into_iter()
            .flatten()
            .cloned();
        let uniforms = params.uniforms.values().filter_map(|value| match value {
            UniformValue::Texture(texture) => Some(Rc::clone(texture)),
            _ => None,
        });
        slots.chain(uniforms).collect()
    }

    fn set_flag(&self, name: &str, on: bool) {
        if self.program != ProgramKey::Face {
            log::trace!("Ignoring {} on {:?} material {}", name, self.program, self.id);
            return;
        }
        self.write_value_uniform(name, UniformValue::Float(if on { 1.0 } else { 0.0 }));
    }

    /// Write a non-texture uniform without ever dropping a texture
    fn write_value_uniform(&self, name: &str, value: UniformValue) {
        let mut params = self.params.borrow_mut();
        if let Some(UniformValue::Texture(_)) = params.uniforms.get(name) {
            log::warn!("Uniform {} on material {} holds a texture, not overwriting", name, self.id);
            return;
        }
        params.uniforms.insert(name.to_string(), value);
    }

    /// Release a texture just removed from this material, unless it is still
    /// referenced from another slot or uniform
    fn release_detached(&self, backend: &mut dyn RenderBackend, texture: &Rc<Texture>) {
        if self.textures().iter().any(|held| held.id() == texture.id()) {
            return;
        }
        if texture.release(backend) {
            log::debug!("Released texture {} detached from material {}", texture.id(), self.id);
        }
    }
}
