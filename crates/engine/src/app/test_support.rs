use super::rendering::{Color, Surface};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DrawCall {
    SetFillStyle(Color),
    FillRect(f32, f32, f32, f32),
    ClearRect(f32, f32, f32, f32),
    DrawImage(String, f32, f32, f32, f32),
}

#[derive(Debug)]
pub(crate) struct RecordingSurface {
    width: u32,
    height: u32,
    fill_style: Color,
    pub(crate) calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fill_style: Color::BLACK,
            calls: Vec::new(),
        }
    }

    pub(crate) fn fill_rects(&self) -> Vec<(f32, f32, f32, f32)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::FillRect(x, y, w, h) => Some((*x, *y, *w, *h)),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
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
        self.calls.push(DrawCall::SetFillStyle(color));
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.calls.push(DrawCall::FillRect(x, y, width, height));
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.calls.push(DrawCall::ClearRect(x, y, width, height));
    }

    fn draw_image(&mut self, source: &str, x: f32, y: f32, width: f32, height: f32) {
        self.calls
            .push(DrawCall::DrawImage(source.to_string(), x, y, width, height));
    }
}
