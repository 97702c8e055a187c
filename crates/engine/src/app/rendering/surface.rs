use std::collections::HashMap;
use std::path::PathBuf;

use image::ImageReader;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const BLACK: Color = Color([0, 0, 0, 255]);
    pub const WHITE: Color = Color([255, 255, 255, 255]);
    pub const TRANSPARENT: Color = Color([0, 0, 0, 0]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn parse(token: &str) -> Result<Self, ColorParseError> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(ColorParseError::Empty);
        }
        let Some(digits) = trimmed.strip_prefix('#') else {
            return Err(ColorParseError::MissingHash {
                token: trimmed.to_string(),
            });
        };
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit {
                token: trimmed.to_string(),
            });
        }

        let nibble = |index: usize| -> u8 {
            let value = u8::from_str_radix(&digits[index..index + 1], 16).unwrap_or(0);
            value * 17
        };
        let byte = |index: usize| -> u8 {
            u8::from_str_radix(&digits[index..index + 2], 16).unwrap_or(0)
        };

        match digits.len() {
            3 => Ok(Self([nibble(0), nibble(1), nibble(2), 255])),
            6 => Ok(Self([byte(0), byte(2), byte(4), 255])),
            8 => Ok(Self([byte(0), byte(2), byte(4), byte(6)])),
            len => Err(ColorParseError::InvalidLength {
                token: trimmed.to_string(),
                len,
            }),
        }
    }

    pub fn alpha(self) -> u8 {
        self.0[3]
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("colour token is empty")]
    Empty,
    #[error("colour token {token:?} must start with '#'")]
    MissingHash { token: String },
    #[error("colour token {token:?} contains a non-hex digit")]
    InvalidDigit { token: String },
    #[error("colour token {token:?} has {len} digits; expected 3, 6 or 8")]
    InvalidLength { token: String, len: usize },
}

/// What a scene paints before its objects: a solid fill or an image stretched
/// over the whole surface. Tokens starting with `#` are colours, anything else is
/// an image source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Background {
    Color(Color),
    Image(String),
}

impl Background {
    pub fn parse(token: &str) -> Result<Self, ColorParseError> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(ColorParseError::Empty);
        }
        if trimmed.starts_with('#') {
            Color::parse(trimmed).map(Background::Color)
        } else {
            Ok(Background::Image(trimmed.to_string()))
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Color(Color::BLACK)
    }
}

impl TryFrom<String> for Background {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Background::parse(&value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Canvas-style drawing target handed down through scene and object rendering.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn fill_style(&self) -> Color;
    fn set_fill_style(&mut self, color: Color);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    fn draw_image(&mut self, source: &str, x: f32, y: f32, width: f32, height: f32);

    fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width() as f32, self.height() as f32)
    }
}

pub(crate) struct LoadedImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

/// Decoded images keyed by source. Failed loads are remembered as missing so
/// the warning is logged once per source.
pub struct ImageCache {
    root: PathBuf,
    entries: HashMap<String, Option<LoadedImage>>,
}

impl ImageCache {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get(&mut self, source: &str) -> Option<&LoadedImage> {
        if !self.entries.contains_key(source) {
            let loaded = self.load(source);
            self.entries.insert(source.to_string(), loaded);
        }
        self.entries.get(source).and_then(Option::as_ref)
    }

    fn load(&self, source: &str) -> Option<LoadedImage> {
        let path = self.root.join(source);
        let decoded = ImageReader::open(&path)
            .map_err(|error| error.to_string())
            .and_then(|reader| reader.decode().map_err(|error| error.to_string()));
        match decoded {
            Ok(image) => {
                let rgba = image.to_rgba8();
                Some(LoadedImage {
                    width: rgba.width(),
                    height: rgba.height(),
                    rgba: rgba.into_raw(),
                })
            }
            Err(error) => {
                warn!(
                    source,
                    path = %path.display(),
                    error = %error,
                    "background_image_load_failed"
                );
                None
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn insert_rgba(&mut self, source: &str, width: u32, height: u32, rgba: Vec<u8>) {
        self.entries.insert(
            source.to_string(),
            Some(LoadedImage {
                width,
                height,
                rgba,
            }),
        );
    }
}

/// Software surface over an RGBA8 frame buffer.
pub struct FrameSurface<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
    fill_style: Color,
    images: &'a mut ImageCache,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelSpan {
    x0: usize,
    x1: usize,
    y0: usize,
    y1: usize,
}

impl<'a> FrameSurface<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32, images: &'a mut ImageCache) -> Self {
        Self {
            frame,
            width,
            height,
            fill_style: Color::BLACK,
            images,
        }
    }

    fn clip(&self, x: f32, y: f32, width: f32, height: f32) -> Option<PixelSpan> {
        if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
            return None;
        }
        let clamp_x = |value: f32| value.round().clamp(0.0, self.width as f32) as usize;
        let clamp_y = |value: f32| value.round().clamp(0.0, self.height as f32) as usize;
        let span = PixelSpan {
            x0: clamp_x(x.min(x + width)),
            x1: clamp_x(x.max(x + width)),
            y0: clamp_y(y.min(y + height)),
            y1: clamp_y(y.max(y + height)),
        };
        (span.x0 < span.x1 && span.y0 < span.y1).then_some(span)
    }

    fn pixel_mut(&mut self, x: usize, y: usize) -> Option<&mut [u8]> {
        let index = (y * self.width as usize + x) * 4;
        self.frame.get_mut(index..index + 4)
    }
}

impl Surface for FrameSurface<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_style(&self) -> Color {
        self.fill_style
    }

    fn set_fill_style(&mut self, color: Color) {
        self.fill_style = color;
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let Some(span) = self.clip(x, y, width, height) else {
            return;
        };
        let color = self.fill_style;
        for py in span.y0..span.y1 {
            for px in span.x0..span.x1 {
                if let Some(pixel) = self.pixel_mut(px, py) {
                    blend_over(pixel, color.0);
                }
            }
        }
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let Some(span) = self.clip(x, y, width, height) else {
            return;
        };
        for py in span.y0..span.y1 {
            for px in span.x0..span.x1 {
                if let Some(pixel) = self.pixel_mut(px, py) {
                    pixel.copy_from_slice(&Color::TRANSPARENT.0);
                }
            }
        }
    }

    fn draw_image(&mut self, source: &str, x: f32, y: f32, width: f32, height: f32) {
        let Some(span) = self.clip(x, y, width, height) else {
            return;
        };
        let frame_width = self.width as usize;
        let Some(image) = self.images.get(source) else {
            return;
        };
        if image.width == 0 || image.height == 0 {
            return;
        }
        let dest_x = x.min(x + width);
        let dest_y = y.min(y + height);
        let scale_x = image.width as f32 / width.abs().max(f32::EPSILON);
        let scale_y = image.height as f32 / height.abs().max(f32::EPSILON);

        for py in span.y0..span.y1 {
            let sy = (((py as f32 + 0.5 - dest_y) * scale_y) as u32).min(image.height - 1);
            for px in span.x0..span.x1 {
                let sx = (((px as f32 + 0.5 - dest_x) * scale_x) as u32).min(image.width - 1);
                let src_index = ((sy * image.width + sx) * 4) as usize;
                let Some(src) = image.rgba.get(src_index..src_index + 4) else {
                    continue;
                };
                let dst_index = (py * frame_width + px) * 4;
                if let Some(pixel) = self.frame.get_mut(dst_index..dst_index + 4) {
                    blend_over(pixel, [src[0], src[1], src[2], src[3]]);
                }
            }
        }
    }
}

fn blend_over(dst: &mut [u8], src: [u8; 4]) {
    let alpha = src[3] as u32;
    if alpha == 255 {
        dst.copy_from_slice(&src);
        return;
    }
    if alpha == 0 {
        return;
    }
    let inverse = 255 - alpha;
    for channel in 0..3 {
        dst[channel] = ((src[channel] as u32 * alpha + dst[channel] as u32 * inverse) / 255) as u8;
    }
    dst[3] = (alpha + dst[3] as u32 * inverse / 255).min(255) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(frame: &[u8], width: u32, x: usize, y: usize) -> [u8; 4] {
        let index = (y * width as usize + x) * 4;
        [
            frame[index],
            frame[index + 1],
            frame[index + 2],
            frame[index + 3],
        ]
    }

    #[test]
    fn color_parse_accepts_short_long_and_alpha_forms() {
        assert_eq!(Color::parse("#000").expect("short"), Color::BLACK);
        assert_eq!(
            Color::parse("#1a2B3c").expect("long"),
            Color([0x1a, 0x2b, 0x3c, 255])
        );
        assert_eq!(
            Color::parse("#ffffff80").expect("alpha"),
            Color([255, 255, 255, 0x80])
        );
    }

    #[test]
    fn color_parse_reports_malformed_tokens() {
        assert_eq!(Color::parse(""), Err(ColorParseError::Empty));
        assert!(matches!(
            Color::parse("fff"),
            Err(ColorParseError::MissingHash { .. })
        ));
        assert!(matches!(
            Color::parse("#ggg"),
            Err(ColorParseError::InvalidDigit { .. })
        ));
        assert!(matches!(
            Color::parse("#12345"),
            Err(ColorParseError::InvalidLength { len: 5, .. })
        ));
    }

    #[test]
    fn background_token_starting_with_hash_is_a_colour() {
        assert_eq!(
            Background::parse("#000").expect("colour"),
            Background::Color(Color::BLACK)
        );
        assert_eq!(
            Background::parse("backgrounds/sky.png").expect("image"),
            Background::Image("backgrounds/sky.png".to_string())
        );
        assert_eq!(Background::parse("  "), Err(ColorParseError::Empty));
    }

    #[test]
    fn fill_rect_is_clipped_to_the_frame() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut images = ImageCache::new(PathBuf::new());
        let mut surface = FrameSurface::new(&mut frame, 4, 4, &mut images);
        surface.set_fill_style(Color::rgb(10, 20, 30));
        surface.fill_rect(-2.0, 2.0, 4.0, 10.0);

        assert_eq!(pixel(&frame, 4, 0, 2), [10, 20, 30, 255]);
        assert_eq!(pixel(&frame, 4, 1, 3), [10, 20, 30, 255]);
        assert_eq!(pixel(&frame, 4, 2, 2), [0, 0, 0, 0]);
        assert_eq!(pixel(&frame, 4, 0, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn clear_rect_resets_to_transparent() {
        let mut frame = vec![255u8; 2 * 2 * 4];
        let mut images = ImageCache::new(PathBuf::new());
        let mut surface = FrameSurface::new(&mut frame, 2, 2, &mut images);
        surface.clear_rect(0.0, 0.0, 2.0, 1.0);

        assert_eq!(pixel(&frame, 2, 1, 0), [0, 0, 0, 0]);
        assert_eq!(pixel(&frame, 2, 1, 1), [255, 255, 255, 255]);
    }

    #[test]
    fn translucent_fill_blends_with_existing_pixels() {
        let mut frame = vec![0u8; 4];
        frame[3] = 255;
        let mut images = ImageCache::new(PathBuf::new());
        let mut surface = FrameSurface::new(&mut frame, 1, 1, &mut images);
        surface.set_fill_style(Color([255, 255, 255, 128]));
        surface.fill_rect(0.0, 0.0, 1.0, 1.0);

        assert_eq!(pixel(&frame, 1, 0, 0)[0], 128);
        assert_eq!(pixel(&frame, 1, 0, 0)[3], 255);
    }

    #[test]
    fn draw_image_scales_nearest_neighbour() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut images = ImageCache::new(PathBuf::new());
        images.insert_rgba(
            "checker",
            2,
            1,
            vec![255, 0, 0, 255, 0, 0, 255, 255],
        );
        let mut surface = FrameSurface::new(&mut frame, 4, 4, &mut images);
        surface.draw_image("checker", 0.0, 0.0, 4.0, 4.0);

        assert_eq!(pixel(&frame, 4, 0, 0), [255, 0, 0, 255]);
        assert_eq!(pixel(&frame, 4, 1, 3), [255, 0, 0, 255]);
        assert_eq!(pixel(&frame, 4, 2, 0), [0, 0, 255, 255]);
        assert_eq!(pixel(&frame, 4, 3, 3), [0, 0, 255, 255]);
    }

    #[test]
    fn missing_image_is_cached_and_draws_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut frame = vec![7u8; 2 * 2 * 4];
        let mut images = ImageCache::new(dir.path().to_path_buf());
        {
            let mut surface = FrameSurface::new(&mut frame, 2, 2, &mut images);
            surface.draw_image("missing.png", 0.0, 0.0, 2.0, 2.0);
            surface.draw_image("missing.png", 0.0, 0.0, 2.0, 2.0);
        }
        assert!(frame.iter().all(|byte| *byte == 7));
        assert_eq!(images.len(), 1);
    }
}
