//! A surface that records draw calls, for layout tests.

use image::RgbaImage;

use super::{FontSpec, Point, Rect, Surface, approximate_text_width};
use crate::cover::CoverImage;
use crate::error::Result;
use crate::palettes::Color;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DrawOp {
    Gradient { rect: Rect, start: Color, end: Color },
    Fill { rect: Rect, color: Color, opacity: f32 },
    StrokeRect { rect: Rect, color: Color, line_width: f32 },
    Polyline { points: Vec<Point>, color: Color, line_width: f32 },
    Text { text: String, top_center: Point, font: FontSpec, color: Color, opacity: f32 },
}

/// Records every operation and measures text with fixed per-character metrics.
pub(crate) struct RecordingSurface {
    width: u32,
    height: u32,
    pub(crate) ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub(crate) fn texts(&self) -> Vec<&DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Text { .. }))
            .collect()
    }

    pub(crate) fn fills(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Fill { .. }))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_gradient_rect(&mut self, rect: Rect, start: Color, end: Color) {
        self.ops.push(DrawOp::Gradient { rect, start, end });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color, opacity: f32) {
        self.ops.push(DrawOp::Fill { rect, color, opacity });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        self.ops.push(DrawOp::StrokeRect { rect, color, line_width });
    }

    fn stroke_polyline(&mut self, points: &[Point], color: Color, line_width: f32) {
        self.ops.push(DrawOp::Polyline {
            points: points.to_vec(),
            color,
            line_width,
        });
    }

    fn measure_text(&self, text: &str, font: &FontSpec) -> f32 {
        approximate_text_width(text, font)
    }

    fn draw_text(
        &mut self,
        text: &str,
        top_center: Point,
        font: &FontSpec,
        color: Color,
        opacity: f32,
    ) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            top_center,
            font: font.clone(),
            color,
            opacity,
        });
    }

    fn encode(&self) -> Result<CoverImage> {
        CoverImage::encode(&RgbaImage::new(self.width, self.height))
    }
}
