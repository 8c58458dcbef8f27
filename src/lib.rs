//! bookcover-renderer: deterministic procedural book covers
//!
//! This crate renders stylized cover images from book metadata. A cover's
//! palette is chosen from its genres and a hash of its title, so the same
//! book always gets the same colors; the title is sized to fit, and the
//! result is encoded as PNG.
//!
//! # Example
//!
//! ```
//! use bookcover_renderer::{select_palette, CoverRenderer, CoverRequest, CoverStyle, FontLibrary};
//!
//! let request = CoverRequest::new("Moby Dick", "Herman Melville")
//!     .with_year("1851")
//!     .with_genres(["Adventure"]);
//!
//! // Same title and genres, same palette.
//! assert_eq!(
//!     select_palette(&request.title, &request.genres),
//!     select_palette("Moby Dick", &["adventure"]),
//! );
//!
//! let mut renderer = CoverRenderer::with_style(CoverStyle::new().with_noise_seed(42))
//!     .unwrap()
//!     .with_fonts(FontLibrary::empty());
//! let cover = renderer.render(&request).unwrap();
//! assert_eq!((cover.width(), cover.height()), (200, 300));
//! ```
//!
//! # Custom backends
//!
//! The cover algorithm only talks to the [`Surface`] trait. Implement it for
//! another rasterizer and paint with [`CoverRenderer::render_on`].
//!
//! # Feature Flags
//!
//! - `jsonschema`: derives JSON Schemas for [`CoverRequest`] and [`CoverStyle`].
//! - `clap`: builds the `bookcover` command-line tool.

mod cover;
mod error;
mod fonts;
mod layout;
mod palettes;
mod renderer;
mod request;
mod style;
mod surface;

pub use cover::CoverImage;
pub use error::{CoverError, Result};
pub use fonts::FontLibrary;
pub use layout::{CoverLayout, TextBlock, TitleFit, fit_title_font, wrap_text};
pub use palettes::{
    Color, PaletteCategory, PaletteEntry, PaletteSelection, category_for_genres, resolve_palette,
    select_palette, title_hash, to_hex,
};
pub use renderer::{CacheKey, CoverRenderer, DEFAULT_CACHE_CAPACITY, render_cover};
pub use request::{BookRecord, CoverRequest, DEFAULT_HEIGHT, DEFAULT_WIDTH};
pub use style::{CoverStyle, MAX_GRAIN_SPECKLES, MAX_TITLE_SIZES};
pub use surface::{
    FontSpec, FontStyle, FontWeight, PixmapSurface, Point, Rect, Surface, approximate_text_width,
};
