//! Cover rendering engine.

use std::num::NonZeroUsize;
use std::time::Instant;

use lru::LruCache;

use palette::Srgb;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::cover::CoverImage;
use crate::error::Result;
use crate::fonts::FontLibrary;
use crate::layout::{CoverLayout, TextBlock};
use crate::palettes::{Color, PaletteEntry, resolve_palette};
use crate::request::CoverRequest;
use crate::style::CoverStyle;
use crate::surface::{PixmapSurface, Point, Rect, Surface};

// ============================================================================
// CacheKey
// ============================================================================

/// Number of covers a renderer keeps by default.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Key for cached covers: the full request plus the grain seed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    request: CoverRequest,
    seed: u64,
}

// ============================================================================
// CoverRenderer
// ============================================================================

/// Renders covers with a fixed style and font library.
///
/// When the style carries a noise seed, rendering is fully deterministic and
/// finished covers are cached per request, keeping the most recently used
/// [`DEFAULT_CACHE_CAPACITY`] covers. Unseeded renders draw fresh grain every
/// time and are never cached.
///
/// # Example
///
/// ```no_run
/// use bookcover_renderer::{CoverRenderer, CoverRequest, CoverStyle};
///
/// let mut renderer = CoverRenderer::with_style(CoverStyle::new().with_noise_seed(1))?;
/// let request = CoverRequest::new("Moby Dick", "Herman Melville")
///     .with_year("1851")
///     .with_genres(["Adventure"]);
///
/// let cover = renderer.render(&request)?;
/// std::fs::write("moby_dick.png", cover.bytes())?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct CoverRenderer {
    style: CoverStyle,
    fonts: FontLibrary,
    cache: LruCache<CacheKey, CoverImage>,
}

impl Default for CoverRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl CoverRenderer {
    /// Creates a renderer with the default style and the system fonts.
    pub fn new() -> Self {
        Self {
            style: CoverStyle::default(),
            fonts: FontLibrary::system(),
            cache: LruCache::new(
                NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            ),
        }
    }

    /// Creates a renderer with a validated style and the system fonts.
    pub fn with_style(style: CoverStyle) -> Result<Self> {
        style.validate()?;
        Ok(Self {
            style,
            ..Self::new()
        })
    }

    /// Replaces the font library. Clears the cache.
    pub fn with_fonts(mut self, fonts: FontLibrary) -> Self {
        debug!(faces = fonts.face_count(), "cover renderer fonts replaced");
        self.fonts = fonts;
        self.cache.clear();
        self
    }

    /// Sets how many covers the cache keeps. Evicts the least recently used
    /// covers if it shrinks.
    pub fn with_cache_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.cache.resize(capacity);
        self
    }

    pub fn style(&self) -> &CoverStyle {
        &self.style
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    /// Sets the style. Returns true if it changed.
    ///
    /// Clears the cache if the style differs.
    pub fn set_style(&mut self, style: CoverStyle) -> Result<bool> {
        style.validate()?;
        if style == self.style {
            return Ok(false);
        }
        self.style = style;
        self.cache.clear();
        Ok(true)
    }

    /// Number of cached covers.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache.cap().get()
    }

    /// Drops all cached covers.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Renders a cover and encodes it as PNG.
    pub fn render(&mut self, request: &CoverRequest) -> Result<CoverImage> {
        let key = self.style.noise_seed.map(|seed| CacheKey {
            request: request.clone(),
            seed,
        });

        if let Some(cover) = key.as_ref().and_then(|key| self.cache.get(key)) {
            debug!(title = %request.title, "cover cache hit");
            return Ok(cover.clone());
        }

        let start = Instant::now();
        let mut surface = PixmapSurface::new(request.width, request.height, self.fonts.clone())?;
        self.render_on(&mut surface, request);
        let cover = surface.encode()?;

        debug!(
            title = %request.title,
            width = request.width,
            height = request.height,
            bytes = cover.bytes().len(),
            duration_us = start.elapsed().as_micros() as u64,
            "rendered cover"
        );

        if let Some(key) = key {
            self.cache.put(key, cover.clone());
        }
        Ok(cover)
    }

    /// Paints a cover onto any surface and returns its layout.
    ///
    /// Does not encode; call [`Surface::encode`] afterwards if needed.
    pub fn render_on<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        request: &CoverRequest,
    ) -> CoverLayout {
        let palette = resolve_palette(&request.title, &request.genres).entry;
        let bounds = Rect::from_size(surface.width() as f32, surface.height() as f32);

        surface.fill_gradient_rect(bounds, palette.background_start, palette.background_end);

        let mut rng = match self.style.noise_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        paint_grain(surface, &self.style, &mut rng);
        paint_frame(surface, palette.border, &self.style);

        let layout = CoverLayout::compute(surface, request, &self.style);
        paint_text(surface, &layout, &palette, &self.style);
        layout
    }
}

/// Renders a cover with the default style and the system fonts.
///
/// Grain is unseeded, so repeated calls differ only in texture noise.
pub fn render_cover(request: &CoverRequest) -> Result<CoverImage> {
    CoverRenderer::new().render(request)
}

// ============================================================================
// Painting steps
// ============================================================================

const BLACK: Color = Srgb::new(0, 0, 0);
const WHITE: Color = Srgb::new(255, 255, 255);

/// Scatters faint 1-2px speckles, alternating black and white.
fn paint_grain<S: Surface + ?Sized>(surface: &mut S, style: &CoverStyle, rng: &mut StdRng) {
    let (width, height) = (surface.width(), surface.height());
    if width == 0 || height == 0 {
        return;
    }

    for i in 0..style.grain_speckles {
        let x = rng.gen_range(0..width) as f32;
        let y = rng.gen_range(0..height) as f32;
        let size = if rng.gen_bool(0.5) { 1.0 } else { 2.0 };
        let color = if i % 2 == 0 { BLACK } else { WHITE };
        surface.fill_rect(Rect::new(x, y, size, size), color, style.grain_opacity);
    }
}

/// Draws the outer border, the inner border and the four corner ornaments.
fn paint_frame<S: Surface + ?Sized>(surface: &mut S, color: Color, style: &CoverStyle) {
    let w = surface.width() as f32;
    let h = surface.height() as f32;
    let bounds = Rect::from_size(w, h);

    surface.stroke_rect(
        bounds.inset(style.outer_border_width / 2.0),
        color,
        style.outer_border_width,
    );
    surface.stroke_rect(
        bounds.inset(style.inner_border_margin),
        color,
        style.inner_border_width,
    );

    for corner in corner_ornaments(w, h, style.corner_inset, style.corner_arm) {
        surface.stroke_polyline(&corner, color, style.corner_width);
    }
}

/// L-shaped ornaments, one per corner, each a three-point polyline whose
/// middle point is the corner.
fn corner_ornaments(w: f32, h: f32, inset: f32, arm: f32) -> [[Point; 3]; 4] {
    let (left, top, right, bottom) = (inset, inset, w - inset, h - inset);
    [
        [
            Point::new(left, top + arm),
            Point::new(left, top),
            Point::new(left + arm, top),
        ],
        [
            Point::new(right - arm, top),
            Point::new(right, top),
            Point::new(right, top + arm),
        ],
        [
            Point::new(left, bottom - arm),
            Point::new(left, bottom),
            Point::new(left + arm, bottom),
        ],
        [
            Point::new(right - arm, bottom),
            Point::new(right, bottom),
            Point::new(right, bottom - arm),
        ],
    ]
}

/// Draws the year, title, divider and author in that order.
fn paint_text<S: Surface + ?Sized>(
    surface: &mut S,
    layout: &CoverLayout,
    palette: &PaletteEntry,
    style: &CoverStyle,
) {
    if let Some(year) = &layout.year {
        draw_block(surface, year, layout.center_x, palette.text);
    }

    draw_block(surface, &layout.title, layout.center_x, palette.text);

    surface.stroke_polyline(
        &[layout.divider_start, layout.divider_end],
        palette.border,
        style.divider_width,
    );

    draw_block(surface, &layout.author, layout.center_x, palette.text);
}

fn draw_block<S: Surface + ?Sized>(surface: &mut S, block: &TextBlock, center_x: f32, color: Color) {
    for (line, anchor) in block.positioned(center_x) {
        surface.draw_text(line, anchor, &block.font, color, block.opacity);
    }
}

// ============================================================================
// Tests
// ============================================================================
