//! Cover palettes and deterministic palette selection.
//!
//! Palettes are grouped by [`PaletteCategory`]. A book's genres pick the
//! category, and a 32-bit hash of its title picks the palette within it, so
//! the same `(title, genres)` pair always yields the same colors.

use std::fmt;

use palette::Srgb;
use serde::{Serialize, Serializer};
use tracing::debug;

/// An 8-bit sRGB color.
pub type Color = Srgb<u8>;

const fn rgb(hex: u32) -> Color {
    Srgb::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// Formats a color as a `#rrggbb` hex string.
pub fn to_hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

fn serialize_hex<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_hex(*color))
}

// ============================================================================
// PaletteEntry
// ============================================================================

/// A fixed four-color set used to theme one cover.
///
/// Serializes with colors as hex strings:
///
/// ```json
/// { "backgroundStart": "#2c3e50", "backgroundEnd": "#4a6741",
///   "border": "#c9a96e", "text": "#f5ecd7" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteEntry {
    /// Gradient color at the top-left corner.
    #[serde(serialize_with = "serialize_hex")]
    pub background_start: Color,
    /// Gradient color at the bottom-right corner.
    #[serde(serialize_with = "serialize_hex")]
    pub background_end: Color,
    /// Frame, ornament and divider color.
    #[serde(serialize_with = "serialize_hex")]
    pub border: Color,
    /// Title, author and year color.
    #[serde(serialize_with = "serialize_hex")]
    pub text: Color,
}

impl PaletteEntry {
    const fn from_hex(background_start: u32, background_end: u32, border: u32, text: u32) -> Self {
        Self {
            background_start: rgb(background_start),
            background_end: rgb(background_end),
            border: rgb(border),
            text: rgb(text),
        }
    }
}

const CLASSIC: &[PaletteEntry] = &[
    PaletteEntry::from_hex(0x2c3e50, 0x4a6741, 0xc9a96e, 0xf5ecd7),
    PaletteEntry::from_hex(0x5d1a1a, 0x2b0f0f, 0xd4af37, 0xf4e4c1),
    PaletteEntry::from_hex(0x1b2a49, 0x3c4f76, 0xc0a062, 0xf0e6d2),
];

const GOTHIC: &[PaletteEntry] = &[
    PaletteEntry::from_hex(0x1a1a2e, 0x16213e, 0x8b0000, 0xe0d5c1),
    PaletteEntry::from_hex(0x0f0f0f, 0x2d1b2e, 0x6b4c7a, 0xd8cfe0),
    PaletteEntry::from_hex(0x232323, 0x3e2723, 0xa1887f, 0xefebe9),
];

const ROMANCE: &[PaletteEntry] = &[
    PaletteEntry::from_hex(0x8e2e4a, 0xd67b8f, 0xf8d7da, 0xfff5f7),
    PaletteEntry::from_hex(0x6a2c70, 0xb83b5e, 0xf9ed69, 0xfff8e7),
    PaletteEntry::from_hex(0xc06c84, 0xf67280, 0xfde2e4, 0xffffff),
];

const ADVENTURE: &[PaletteEntry] = &[
    PaletteEntry::from_hex(0x0b3d2e, 0x1f6f50, 0xe1b15a, 0xfdf6e3),
    PaletteEntry::from_hex(0x1e3d59, 0x3e7cb1, 0xf5b971, 0xfefefe),
    PaletteEntry::from_hex(0x5b3a1a, 0xa0692f, 0xf2d096, 0xfff8e1),
];

const DEFAULT: &[PaletteEntry] = &[
    PaletteEntry::from_hex(0x34495e, 0x2c3e50, 0xbdc3c7, 0xecf0f1),
    PaletteEntry::from_hex(0x4b4453, 0x845ec2, 0xd5cabd, 0xf9f9f9),
    PaletteEntry::from_hex(0x37474f, 0x607d8b, 0xcfd8dc, 0xffffff),
    PaletteEntry::from_hex(0x3d5a80, 0x293241, 0x98c1d9, 0xe0fbfc),
];

// ============================================================================
// PaletteCategory
// ============================================================================

/// A named group of palettes associated with genre keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteCategory {
    Classic,
    Gothic,
    Romance,
    Adventure,
    Default,
}

impl PaletteCategory {
    /// Every category, in declaration order.
    pub const ALL: [PaletteCategory; 5] = [
        Self::Classic,
        Self::Gothic,
        Self::Romance,
        Self::Adventure,
        Self::Default,
    ];

    /// Returns the palettes belonging to this category. Never empty.
    pub fn palettes(self) -> &'static [PaletteEntry] {
        match self {
            Self::Classic => CLASSIC,
            Self::Gothic => GOTHIC,
            Self::Romance => ROMANCE,
            Self::Adventure => ADVENTURE,
            Self::Default => DEFAULT,
        }
    }

    /// Returns the lower-case category name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Gothic => "gothic",
            Self::Romance => "romance",
            Self::Adventure => "adventure",
            Self::Default => "default",
        }
    }

    /// Looks up the category for a single genre (case-insensitive).
    pub fn for_genre(genre: &str) -> Option<Self> {
        let genre = genre.trim().to_lowercase();
        GENRE_CATEGORIES
            .iter()
            .find(|(name, _)| *name == genre)
            .map(|(_, category)| *category)
    }
}

impl fmt::Display for PaletteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-cased genre keyword to category. Genres not listed map to `Default`.
const GENRE_CATEGORIES: &[(&str, PaletteCategory)] = &[
    ("classic", PaletteCategory::Classic),
    ("literary fiction", PaletteCategory::Classic),
    ("historical fiction", PaletteCategory::Classic),
    ("philosophy", PaletteCategory::Classic),
    ("poetry", PaletteCategory::Classic),
    ("gothic", PaletteCategory::Gothic),
    ("horror", PaletteCategory::Gothic),
    ("mystery", PaletteCategory::Gothic),
    ("thriller", PaletteCategory::Gothic),
    ("romance", PaletteCategory::Romance),
    ("adventure", PaletteCategory::Adventure),
    ("fantasy", PaletteCategory::Adventure),
    ("science fiction", PaletteCategory::Adventure),
];

// ============================================================================
// Selection
// ============================================================================

/// The outcome of palette selection: the category, the index within it, and
/// the palette itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaletteSelection {
    pub category: PaletteCategory,
    pub index: usize,
    pub entry: PaletteEntry,
}

/// Resolves the category for a genre list: the first known genre wins.
pub fn category_for_genres<S: AsRef<str>>(genres: &[S]) -> PaletteCategory {
    genres
        .iter()
        .find_map(|genre| PaletteCategory::for_genre(genre.as_ref()))
        .unwrap_or(PaletteCategory::Default)
}

/// Hashes a title to a signed 32-bit integer.
///
/// Iterates UTF-16 code units, computing `hash * 31 + unit` with wrapping
/// 32-bit arithmetic at every step.
pub fn title_hash(title: &str) -> i32 {
    title.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

/// Selects the palette for a title and genre list, with its category and index.
pub fn resolve_palette<S: AsRef<str>>(title: &str, genres: &[S]) -> PaletteSelection {
    let category = category_for_genres(genres);
    let palettes = category.palettes();
    let hash = title_hash(title);
    let index = (hash.unsigned_abs() as usize) % palettes.len();

    debug!(%category, hash, index, "selected cover palette");

    PaletteSelection {
        category,
        index,
        entry: palettes[index],
    }
}

/// Selects the palette for a title and genre list.
pub fn select_palette<S: AsRef<str>>(title: &str, genres: &[S]) -> PaletteEntry {
    resolve_palette(title, genres).entry
}

// ============================================================================
// Tests
// ============================================================================
