//! Textures

use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

use crate::render::api::{NativeHandle, RenderBackend, TextureDesc};
use crate::render::resources::ResourceId;

/// A texture allocation
///
/// Textures are owned by the material that references them and are released
/// together with it. The native handle is freed at most once, however many
/// holders ask for it.
#[derive(Debug)]
pub struct Texture {
    id: ResourceId,
    desc: TextureDesc,
    native: NativeHandle,
    released: Cell<bool>,
}

impl Texture {
    /// Allocate an empty texture
    pub fn create(backend: &mut dyn RenderBackend, desc: TextureDesc) -> Rc<Self> {
        let native = backend.create_texture(&desc);
        Rc::new(Self {
            id: ResourceId::next(),
            desc,
            native,
            released: Cell::new(false),
        })
    }

    /// Upload a decoded RGBA image
    pub fn from_image(backend: &mut dyn RenderBackend, image: &image::RgbaImage) -> Rc<Self> {
        Self::create(backend, TextureDesc::rgba8(image.width(), image.height()))
    }

    /// Decode an image file into RGBA pixels, ready for [`Texture::from_image`]
    pub fn decode(path: impl AsRef<Path>) -> Result<image::RgbaImage, image::ImageError> {
        let image = image::open(path.as_ref())?.to_rgba8();
        log::debug!("Decoded image {} ({}x{})", path.as_ref().display(), image.width(), image.height());
        Ok(image)
    }

    /// Resource identity
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Creation parameters
    pub fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    /// Backend handle
    pub fn native(&self) -> NativeHandle {
        self.native
    }

    /// Whether the native handle has been freed
    pub fn is_released(&self) -> bool {
        self.released.get()
    }

    /// Free the native handle; returns `false` if it was already freed
    pub(crate) fn release(&self, backend: &mut dyn RenderBackend) -> bool {
        if self.released.replace(true) {
            log::warn!("Texture {} already released, skipping", self.id);
            return false;
        }
        backend.release(self.native);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessBackend;

    #[test]
    fn test_from_image_uses_image_dimensions() {
        let mut backend = HeadlessBackend::new();
        let image = image::RgbaImage::new(8, 4);
        let texture = Texture::from_image(&mut backend, &image);
        assert_eq!(texture.desc().width, 8);
        assert_eq!(texture.desc().height, 4);
        assert_eq!(backend.info().memory.textures, 1);
    }

    #[test]
    fn test_decode_missing_file_fails() {
        assert!(Texture::decode("does/not/exist.png").is_err());
    }

    #[test]
    fn test_release_frees_once() {
        let mut backend = HeadlessBackend::new();
        let texture = Texture::create(&mut backend, TextureDesc::rgba8(2, 2));

        assert!(texture.release(&mut backend));
        assert!(!texture.release(&mut backend));
        assert!(texture.is_released());
        assert_eq!(backend.info().memory.textures, 0);
        assert_eq!(backend.info().invalid_releases, 0);
    }
}
