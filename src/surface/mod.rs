//! Backend-agnostic drawing surface.
//!
//! The cover algorithm draws exclusively through the [`Surface`] trait, so it
//! can target any 2D rasterizer. [`PixmapSurface`] is the software backend
//! shipped with this crate.

pub mod pixmap;

#[cfg(test)]
pub(crate) mod recording;

pub use pixmap::PixmapSurface;

use crate::cover::CoverImage;
use crate::error::Result;
use crate::palettes::Color;

// ============================================================================
// Geometry
// ============================================================================

/// A point in surface coordinates (pixels, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Creates a rectangle at the origin covering `width x height`.
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Returns the rectangle shrunk by `amount` on every side.
    pub fn inset(&self, amount: f32) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            self.width - 2.0 * amount,
            self.height - 2.0 * amount,
        )
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

// ============================================================================
// Fonts
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Font selection for drawing and measuring text.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// CSS-style family list, e.g. `Georgia, serif`.
    pub family: String,
    /// Font size in pixels.
    pub size: f32,
    pub weight: FontWeight,
    pub style: FontStyle,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
        }
    }

    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    pub fn italic(mut self) -> Self {
        self.style = FontStyle::Italic;
        self
    }

    /// Returns the same font at a different size.
    pub fn with_size(&self, size: f32) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }
}

/// Estimates the advance width of `text` without font metrics.
///
/// Used when no font faces are available: half an em per character, a
/// little wider for bold.
pub fn approximate_text_width(text: &str, font: &FontSpec) -> f32 {
    let em = match font.weight {
        FontWeight::Normal => 0.5,
        FontWeight::Bold => 0.55,
    };
    text.chars().count() as f32 * font.size * em
}

// ============================================================================
// Surface
// ============================================================================

/// A 2D drawing surface the cover renderer paints onto.
///
/// Implementations own their pixels; [`encode`](Self::encode) snapshots them
/// into a [`CoverImage`].
pub trait Surface {
    /// Surface width in pixels.
    fn width(&self) -> u32;

    /// Surface height in pixels.
    fn height(&self) -> u32;

    /// Fills `rect` with a linear gradient from `start` at its top-left corner
    /// to `end` at its bottom-right corner.
    fn fill_gradient_rect(&mut self, rect: Rect, start: Color, end: Color);

    /// Fills `rect` with a solid color at the given opacity (0.0-1.0).
    fn fill_rect(&mut self, rect: Rect, color: Color, opacity: f32);

    /// Strokes the outline of `rect`, centered on its edges.
    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32);

    /// Strokes an open polyline through `points`.
    fn stroke_polyline(&mut self, points: &[Point], color: Color, line_width: f32);

    /// Returns the advance width of `text` in pixels.
    fn measure_text(&self, text: &str, font: &FontSpec) -> f32;

    /// Draws one line of text horizontally centered on `top_center.x`, with
    /// the top of its line box at `top_center.y`.
    fn draw_text(
        &mut self,
        text: &str,
        top_center: Point,
        font: &FontSpec,
        color: Color,
        opacity: f32,
    );

    /// Encodes the current contents as a lossless image.
    fn encode(&self) -> Result<CoverImage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_inset() {
        let rect = Rect::from_size(200.0, 300.0).inset(12.0);
        assert_eq!(rect, Rect::new(12.0, 12.0, 176.0, 276.0));
        assert_eq!(rect.right(), 188.0);
        assert_eq!(rect.bottom(), 288.0);
    }

    #[test]
    fn font_spec_builders() {
        let font = FontSpec::new("serif", 20.0).bold().italic();
        assert_eq!(font.weight, FontWeight::Bold);
        assert_eq!(font.style, FontStyle::Italic);

        let smaller = font.with_size(12.0);
        assert_eq!(smaller.size, 12.0);
        assert_eq!(smaller.weight, FontWeight::Bold);
    }

    #[test]
    fn approximate_width_scales_with_size_and_weight() {
        let regular = FontSpec::new("serif", 10.0);
        assert_eq!(approximate_text_width("abcd", &regular), 20.0);
        assert!(approximate_text_width("abcd", &regular.clone().bold()) > 20.0);
        assert_eq!(approximate_text_width("", &regular), 0.0);
    }
}
