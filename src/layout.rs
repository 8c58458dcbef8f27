//! Text wrapping and cover layout.
//!
//! Layout is computed against a [`Surface`] only for text measurement, so the
//! same geometry drives every backend. All vertical positions are the top of
//! a line box.

use tracing::{debug, trace};

use crate::request::CoverRequest;
use crate::style::CoverStyle;
use crate::surface::{FontSpec, Point, Surface};

/// Title and author blocks wrap to this fraction of the cover width.
pub const TEXT_WIDTH_RATIO: f32 = 0.75;
/// The title block must fit in this fraction of the cover height.
pub const TITLE_HEIGHT_RATIO: f32 = 0.25;
/// Top of the first title line, as a fraction of the cover height.
pub const TITLE_TOP_RATIO: f32 = 0.35;
/// Top of the year line, as a fraction of the cover height.
pub const YEAR_TOP_RATIO: f32 = 0.12;
pub const YEAR_SIZE_RATIO: f32 = 0.07;
pub const YEAR_OPACITY: f32 = 0.7;
pub const AUTHOR_SIZE_RATIO: f32 = 0.075;
pub const AUTHOR_OPACITY: f32 = 0.85;
/// Horizontal extent of the divider, as fractions of the cover width.
pub const DIVIDER_SPAN: (f32, f32) = (0.25, 0.75);

// ============================================================================
// Wrapping
// ============================================================================

/// Greedily wraps `text` into lines no wider than `max_width`.
///
/// Each word is appended to the current line if the result still fits,
/// otherwise it starts a new line. A word wider than `max_width` gets a line
/// of its own and is never split. At most `max_lines` lines are returned;
/// the rest is dropped.
pub fn wrap_text<S: Surface + ?Sized>(
    surface: &S,
    text: &str,
    font: &FontSpec,
    max_width: f32,
    max_lines: usize,
) -> Vec<String> {
    let mut lines = Vec::new();
    if max_lines == 0 {
        return lines;
    }
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let candidate = format!("{current} {word}");
        if surface.measure_text(&candidate, font) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
            if lines.len() == max_lines {
                return lines;
            }
        }
    }

    if !current.is_empty() && lines.len() < max_lines {
        lines.push(current);
    }
    lines
}

// ============================================================================
// Title fitting
// ============================================================================

/// The chosen title font size and the title wrapped at that size.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleFit {
    pub size: u32,
    pub lines: Vec<String>,
}

/// Finds the largest title font size whose wrapped block fits the title area.
///
/// Sizes are tried from `style.title_max_size` down to `style.title_min_size`.
/// The title wraps (bold) to 75% of `width`, and the block height
/// `lines * size * line_height` must not exceed 25% of `height`. When no size
/// fits, the minimum size is used and the block may overflow.
pub fn fit_title_font<S: Surface + ?Sized>(
    surface: &S,
    title: &str,
    width: f32,
    height: f32,
    style: &CoverStyle,
) -> TitleFit {
    let max_width = width * TEXT_WIDTH_RATIO;
    let max_height = height * TITLE_HEIGHT_RATIO;
    let font = FontSpec::new(style.font_family.as_str(), style.title_max_size as f32).bold();

    for size in (style.title_min_size..=style.title_max_size).rev() {
        let font = font.with_size(size as f32);
        let lines = wrap_text(surface, title, &font, max_width, style.max_lines);
        let block_height = lines.len() as f32 * size as f32 * style.line_height;
        trace!(size, lines = lines.len(), block_height, "tried title size");

        if block_height <= max_height {
            return TitleFit { size, lines };
        }
    }

    let size = style.title_min_size;
    let lines = wrap_text(
        surface,
        title,
        &font.with_size(size as f32),
        max_width,
        style.max_lines,
    );
    debug!(size, "title does not fit, using minimum size");
    TitleFit { size, lines }
}

// ============================================================================
// CoverLayout
// ============================================================================

/// A block of centered text lines.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub font: FontSpec,
    /// Top of the first line.
    pub top: f32,
    /// Distance between consecutive line tops.
    pub line_height: f32,
    pub opacity: f32,
}

impl TextBlock {
    /// Bottom of the last line (equal to `top` for an empty block).
    pub fn bottom(&self) -> f32 {
        self.top + self.lines.len() as f32 * self.line_height
    }

    /// Yields each line with its top-center anchor at horizontal center `x`.
    pub fn positioned(&self, x: f32) -> impl Iterator<Item = (&str, Point)> + '_ {
        self.lines.iter().enumerate().map(move |(i, line)| {
            (
                line.as_str(),
                Point::new(x, self.top + i as f32 * self.line_height),
            )
        })
    }
}

/// Positions of every text element and the divider on a cover.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverLayout {
    /// Horizontal center all text is aligned on.
    pub center_x: f32,
    pub year: Option<TextBlock>,
    pub title: TextBlock,
    pub divider_start: Point,
    pub divider_end: Point,
    pub author: TextBlock,
}

impl CoverLayout {
    /// Lays out a cover for `request` on `surface`.
    pub fn compute<S: Surface + ?Sized>(
        surface: &S,
        request: &CoverRequest,
        style: &CoverStyle,
    ) -> Self {
        let width = surface.width() as f32;
        let height = surface.height() as f32;
        let family = style.font_family.as_str();

        let year = request.display_year().map(|year| {
            let font = FontSpec::new(family, width * YEAR_SIZE_RATIO);
            TextBlock {
                lines: vec![year.to_string()],
                line_height: font.size * style.line_height,
                font,
                top: height * YEAR_TOP_RATIO,
                opacity: YEAR_OPACITY,
            }
        });

        let fit = fit_title_font(surface, &request.title, width, height, style);
        let title_font = FontSpec::new(family, fit.size as f32).bold();
        let title = TextBlock {
            lines: fit.lines,
            line_height: title_font.size * style.line_height,
            font: title_font,
            top: height * TITLE_TOP_RATIO,
            opacity: 1.0,
        };

        let divider_y = title.bottom() + style.divider_gap;
        let (span_start, span_end) = DIVIDER_SPAN;

        let author_font = FontSpec::new(family, width * AUTHOR_SIZE_RATIO).italic();
        let author = TextBlock {
            lines: wrap_text(
                surface,
                &request.author,
                &author_font,
                width * TEXT_WIDTH_RATIO,
                style.max_lines,
            ),
            line_height: author_font.size * style.line_height,
            font: author_font,
            top: divider_y + style.author_gap,
            opacity: AUTHOR_OPACITY,
        };

        debug!(
            title_size = title.font.size,
            title_lines = title.lines.len(),
            author_lines = author.lines.len(),
            divider_y,
            "computed cover layout"
        );

        Self {
            center_x: width / 2.0,
            year,
            title,
            divider_start: Point::new(width * span_start, divider_y),
            divider_end: Point::new(width * span_end, divider_y),
            author,
        }
    }

    /// Vertical position of the divider line.
    pub fn divider_y(&self) -> f32 {
        self.divider_start.y
    }
}

// ============================================================================
// Tests
// ============================================================================
