mod renderer;
mod surface;

pub use renderer::Renderer;
pub use surface::{
    Background, Color, ColorParseError, FrameSurface, ImageCache, Surface, SurfaceSize,
};
