//! Software rendering backend using tiny-skia and resvg.
//!
//! Shapes are drawn directly with tiny-skia. Text goes through usvg: each
//! line becomes a one-element SVG document that is shaped with the
//! [`FontLibrary`] and rasterized over the pixmap, so text is measured and
//! drawn by the same machinery.

use std::cell::RefCell;
use std::collections::HashMap;

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{
    self as sk, GradientStop, LinearGradient, Paint, PathBuilder, Pixmap, SpreadMode, Stroke,
    Transform,
};
use resvg::usvg::{Options, Tree};
use tracing::trace;

use super::{FontSpec, FontStyle, FontWeight, Point, Rect, Surface, approximate_text_width};
use crate::cover::CoverImage;
use crate::error::{CoverError, Result};
use crate::fonts::FontLibrary;
use crate::palettes::{Color, to_hex};

/// Size at which text widths are measured and cached. Widths at other sizes
/// are scaled linearly from it.
const MEASURE_SIZE: f32 = 100.0;

/// Approximate ascent as a fraction of the font size, used to place the
/// baseline below the top of a line box.
const ASCENT: f32 = 0.8;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MeasureKey {
    text: String,
    family: String,
    weight: FontWeight,
    style: FontStyle,
}

/// A raster surface backed by a tiny-skia [`Pixmap`].
pub struct PixmapSurface {
    pixmap: Pixmap,
    fonts: FontLibrary,
    widths: RefCell<HashMap<MeasureKey, f32>>,
}

impl PixmapSurface {
    /// Allocates a transparent `width x height` surface.
    ///
    /// Fails with [`CoverError::SurfaceAllocation`] for zero or oversized
    /// dimensions.
    pub fn new(width: u32, height: u32, fonts: FontLibrary) -> Result<Self> {
        let pixmap = Pixmap::new(width, height)
            .ok_or(CoverError::SurfaceAllocation { width, height })?;
        Ok(Self {
            pixmap,
            fonts,
            widths: RefCell::new(HashMap::new()),
        })
    }

    /// Returns the current contents as an unpremultiplied RGBA image.
    pub fn to_rgba_image(&self) -> RgbaImage {
        pixmap_to_rgba_image(&self.pixmap)
    }

    /// Parses a single `<text>` element into a usvg tree.
    #[allow(clippy::too_many_arguments)]
    fn text_tree(
        &self,
        text: &str,
        x: f32,
        baseline: f32,
        anchor: &str,
        font: &FontSpec,
        fill: &str,
        opacity: f32,
    ) -> Option<Tree> {
        let svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><text x="{x}" y="{baseline}" text-anchor="{anchor}" font-family="{family}" font-size="{size}" font-weight="{weight}" font-style="{style}" fill="{fill}" fill-opacity="{opacity}" xml:space="preserve">{text}</text></svg>"#,
            w = self.pixmap.width(),
            h = self.pixmap.height(),
            family = escape_xml(&font.family),
            size = font.size,
            weight = match font.weight {
                FontWeight::Normal => "normal",
                FontWeight::Bold => "bold",
            },
            style = match font.style {
                FontStyle::Normal => "normal",
                FontStyle::Italic => "italic",
            },
            text = escape_xml(text),
        );

        let options = Options {
            fontdb: self.fonts.database(),
            ..Options::default()
        };
        Tree::from_str(&svg, &options).ok()
    }

    /// Measures `text` at [`MEASURE_SIZE`] using shaped glyph outlines.
    fn measure_shaped(&self, text: &str, font: &FontSpec) -> f32 {
        let reference = font.with_size(MEASURE_SIZE);
        let Some(tree) = self.text_tree(text, 0.0, MEASURE_SIZE, "start", &reference, "#000000", 1.0)
        else {
            return approximate_text_width(text, &reference);
        };

        let root = tree.root();
        if !root.has_children() {
            // No face could render the text.
            return approximate_text_width(text, &reference);
        }
        root.abs_bounding_box().width()
    }
}

impl Surface for PixmapSurface {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn fill_gradient_rect(&mut self, rect: Rect, start: Color, end: Color) {
        let Some(area) = to_sk_rect(rect) else {
            return;
        };

        let shader = LinearGradient::new(
            sk::Point::from_xy(rect.x, rect.y),
            sk::Point::from_xy(rect.right(), rect.bottom()),
            vec![
                GradientStop::new(0.0, to_sk_color(start, 1.0)),
                GradientStop::new(1.0, to_sk_color(end, 1.0)),
            ],
            SpreadMode::Pad,
            Transform::identity(),
        );

        let mut paint = Paint::default();
        match shader {
            Some(shader) => paint.shader = shader,
            None => paint.set_color(to_sk_color(start, 1.0)),
        }
        self.pixmap
            .fill_rect(area, &paint, Transform::identity(), None);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color, opacity: f32) {
        let Some(area) = to_sk_rect(rect) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(to_sk_color(color, opacity));
        self.pixmap
            .fill_rect(area, &paint, Transform::identity(), None);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        let Some(area) = to_sk_rect(rect) else {
            return;
        };
        let path = PathBuilder::from_rect(area);
        let mut paint = Paint::default();
        paint.set_color(to_sk_color(color, 1.0));
        let stroke = Stroke {
            width: line_width,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    fn stroke_polyline(&mut self, points: &[Point], color: Color, line_width: f32) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };

        let mut builder = PathBuilder::new();
        builder.move_to(first.x, first.y);
        for point in rest {
            builder.line_to(point.x, point.y);
        }
        let Some(path) = builder.finish() else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(to_sk_color(color, 1.0));
        let stroke = Stroke {
            width: line_width,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    fn measure_text(&self, text: &str, font: &FontSpec) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        if self.fonts.is_empty() {
            return approximate_text_width(text, font);
        }

        let key = MeasureKey {
            text: text.to_string(),
            family: font.family.clone(),
            weight: font.weight,
            style: font.style,
        };
        if let Some(width) = self.widths.borrow().get(&key) {
            return width * font.size / MEASURE_SIZE;
        }

        let width = self.measure_shaped(text, font);
        trace!(text, width, "measured text");
        self.widths.borrow_mut().insert(key, width);
        width * font.size / MEASURE_SIZE
    }

    fn draw_text(
        &mut self,
        text: &str,
        top_center: Point,
        font: &FontSpec,
        color: Color,
        opacity: f32,
    ) {
        if text.trim().is_empty() || self.fonts.is_empty() {
            return;
        }

        let baseline = top_center.y + font.size * ASCENT;
        let fill = to_hex(color);
        let Some(tree) = self.text_tree(
            text,
            top_center.x,
            baseline,
            "middle",
            font,
            &fill,
            opacity.clamp(0.0, 1.0),
        ) else {
            return;
        };

        resvg::render(&tree, Transform::identity(), &mut self.pixmap.as_mut());
    }

    fn encode(&self) -> Result<CoverImage> {
        CoverImage::encode(&self.to_rgba_image())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn to_sk_rect(rect: Rect) -> Option<sk::Rect> {
    sk::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height)
}

fn to_sk_color(color: Color, opacity: f32) -> sk::Color {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    sk::Color::from_rgba8(color.red, color.green, color.blue, alpha)
}

/// Escapes text for use in SVG character data and attribute values.
fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(c),
            // Not allowed anywhere in an XML document.
            c if c.is_control() || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Converts a premultiplied tiny-skia pixmap to an `image::RgbaImage`.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let width = pixmap.width();
    let mut img = RgbaImage::new(width, pixmap.height());

    for (i, pixel) in pixmap.pixels().iter().enumerate() {
        let color = pixel.demultiply();
        let i = i as u32;
        img.put_pixel(
            i % width,
            i / width,
            Rgba([color.red(), color.green(), color.blue(), color.alpha()]),
        );
    }

    img
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use palette::Srgb;

    fn surface(width: u32, height: u32) -> PixmapSurface {
        PixmapSurface::new(width, height, FontLibrary::empty()).unwrap()
    }

    #[test]
    fn zero_size_fails_allocation() {
        let result = PixmapSurface::new(0, 10, FontLibrary::empty());
        assert!(matches!(
            result,
            Err(CoverError::SurfaceAllocation { width: 0, height: 10 })
        ));
    }

    #[test]
    fn gradient_runs_corner_to_corner() {
        let mut surface = surface(50, 50);
        surface.fill_gradient_rect(
            Rect::from_size(50.0, 50.0),
            Srgb::new(255, 0, 0),
            Srgb::new(0, 0, 255),
        );

        let img = surface.to_rgba_image();
        let top_left = img.get_pixel(0, 0);
        let bottom_right = img.get_pixel(49, 49);
        assert!(top_left[0] > top_left[2], "top-left should be red");
        assert!(bottom_right[2] > bottom_right[0], "bottom-right should be blue");
        assert_eq!(top_left[3], 255);
    }

    #[test]
    fn translucent_fill_blends() {
        let mut surface = surface(4, 4);
        surface.fill_rect(Rect::from_size(4.0, 4.0), Srgb::new(255, 255, 255), 1.0);
        surface.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), Srgb::new(0, 0, 0), 0.5);

        let img = surface.to_rgba_image();
        let blended = img.get_pixel(0, 0);
        assert!(blended[0] > 100 && blended[0] < 155, "got {blended:?}");
        assert_eq!(img.get_pixel(3, 3).0, [255, 255, 255, 255]);
    }

    #[test]
    fn stroke_rect_leaves_interior() {
        let mut surface = surface(20, 20);
        surface.stroke_rect(Rect::new(2.0, 2.0, 16.0, 16.0), Srgb::new(0, 255, 0), 2.0);

        let img = surface.to_rgba_image();
        assert!(img.get_pixel(2, 10)[1] > 0, "edge should be stroked");
        assert_eq!(img.get_pixel(10, 10)[3], 0, "interior should stay empty");
    }

    #[test]
    fn polyline_draws_and_ignores_empty() {
        let mut surface = surface(20, 20);
        surface.stroke_polyline(&[], Srgb::new(255, 0, 0), 2.0);
        surface.stroke_polyline(
            &[Point::new(2.0, 10.0), Point::new(18.0, 10.0)],
            Srgb::new(255, 0, 0),
            2.0,
        );

        let img = surface.to_rgba_image();
        assert!(img.get_pixel(10, 10)[0] > 0);
        assert_eq!(img.get_pixel(10, 2)[3], 0);
    }

    #[test]
    fn text_without_fonts_measures_approximately() {
        let surface = surface(10, 10);
        let font = FontSpec::new("serif", 10.0);
        assert_eq!(surface.measure_text("abcd", &font), 20.0);
        assert_eq!(surface.measure_text("", &font), 0.0);
    }

    #[test]
    fn system_font_widths_grow_with_text() {
        let surface = PixmapSurface::new(10, 10, FontLibrary::system()).unwrap();
        let font = FontSpec::new("serif", 20.0);
        let short = surface.measure_text("Moby", &font);
        let long = surface.measure_text("Moby Dick and the whale", &font);
        assert!(long > short);
        // Cached widths scale with size.
        let doubled = surface.measure_text("Moby", &font.with_size(40.0));
        assert!((doubled - 2.0 * short).abs() < 0.01);
    }

    #[test]
    fn escape_xml_special_chars() {
        assert_eq!(escape_xml("Tom & Jerry <3"), "Tom &amp; Jerry &lt;3");
        assert_eq!(escape_xml(r#"say "hi""#), "say &quot;hi&quot;");
    }

    #[test]
    fn escape_xml_drops_illegal_chars() {
        assert_eq!(escape_xml("Moby\u{0}Dick\u{7}"), "MobyDick");
        assert_eq!(escape_xml("a\tb\nc"), "a\tb\nc");
        assert_eq!(escape_xml("\u{FFFE}x\u{85}"), "x");
    }

    #[test]
    fn control_chars_still_parse() {
        let surface = surface(50, 50);
        let font = FontSpec::new("serif", 12.0);
        let tree = surface.text_tree("Moby\u{0}Dick", 0.0, 12.0, "start", &font, "#000000", 1.0);
        assert!(tree.is_some());
    }

    #[test]
    fn measure_keys_distinguish_weight_and_style() {
        let key = |weight, style| MeasureKey {
            text: "Moby".to_string(),
            family: "serif".to_string(),
            weight,
            style,
        };
        let keys: HashSet<MeasureKey> = [
            key(FontWeight::Normal, FontStyle::Normal),
            key(FontWeight::Bold, FontStyle::Normal),
            key(FontWeight::Normal, FontStyle::Italic),
            key(FontWeight::Normal, FontStyle::Normal),
        ]
        .into_iter()
        .collect();
        assert_eq!(keys.len(), 3);

        let surface = PixmapSurface::new(10, 10, FontLibrary::system()).unwrap();
        if surface.fonts.is_empty() {
            return;
        }
        let font = FontSpec::new("serif", 20.0);
        surface.measure_text("Moby", &font);
        surface.measure_text("Moby", &font.clone().bold());
        surface.measure_text("Moby", &font.clone().italic());
        surface.measure_text("Moby", &font.with_size(30.0));
        assert_eq!(surface.widths.borrow().len(), 3);
    }

    #[test]
    fn encode_produces_png_of_surface_size() {
        let surface = surface(7, 9);
        let cover = surface.encode().unwrap();
        let decoded = cover.decode().unwrap();
        assert_eq!(decoded.dimensions(), (7, 9));
    }
}
