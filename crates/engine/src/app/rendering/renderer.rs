use std::path::PathBuf;
use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture, TextureError};
use winit::window::Window;

use super::surface::{FrameSurface, ImageCache};

/// Presents a fixed-size RGBA drawing surface on a window, scaled by `pixels`.
pub struct Renderer {
    pixels: Pixels<'static>,
    surface_width: u32,
    surface_height: u32,
    images: ImageCache,
}

impl Renderer {
    pub fn new(
        window: Arc<Window>,
        surface_width: u32,
        surface_height: u32,
        asset_root: PathBuf,
    ) -> Result<Self, Error> {
        let size = window.inner_size();
        let texture = SurfaceTexture::new(size.width.max(1), size.height.max(1), window);
        let pixels = Pixels::new(surface_width, surface_height, texture)?;
        Ok(Self {
            pixels,
            surface_width,
            surface_height,
            images: ImageCache::new(asset_root),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)
    }

    pub fn surface(&mut self) -> FrameSurface<'_> {
        FrameSurface::new(
            self.pixels.frame_mut(),
            self.surface_width,
            self.surface_height,
            &mut self.images,
        )
    }

    pub fn present(&self) -> Result<(), Error> {
        self.pixels.render()
    }
}
