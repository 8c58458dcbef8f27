//! Cover request types.
//!
//! A [`CoverRequest`] carries the book metadata and pixel dimensions of a
//! cover to render. [`BookRecord`] mirrors the book JSON served by the
//! library backend and converts into a request.

use serde::{Deserialize, Serialize};

/// Default cover width in pixels.
pub const DEFAULT_WIDTH: u32 = 200;
/// Default cover height in pixels.
pub const DEFAULT_HEIGHT: u32 = 300;

/// Metadata and dimensions for one cover.
///
/// # JSON Format
///
/// ```json
/// {
///   "title": "Moby Dick",
///   "author": "Herman Melville",
///   "year": "1851",
///   "genres": ["Adventure"],
///   "width": 200,
///   "height": 300
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct CoverRequest {
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

impl CoverRequest {
    /// Creates a request at the default 200x300 size with no year or genres.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year: None,
            genres: Vec::new(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }

    /// Sets the publication year.
    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    /// Sets the genres, in priority order.
    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the pixel dimensions.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Returns the year if present and not blank.
    pub fn display_year(&self) -> Option<&str> {
        self.year.as_deref().map(str::trim).filter(|y| !y.is_empty())
    }

    /// Parses a request from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A book as served by the library backend.
///
/// Only the fields a cover needs are kept; everything else in the record
/// (slug, description, file paths, ...) is ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub slug: Option<String>,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl BookRecord {
    /// Parses a record from the backend's book JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Builds a cover request for this book at the given size.
    pub fn to_request(&self, width: u32, height: u32) -> CoverRequest {
        CoverRequest {
            title: self.title.clone(),
            author: self.author.clone(),
            year: self.year.map(|y| y.to_string()),
            genres: self.genres.clone(),
            width,
            height,
        }
    }
}

impl From<BookRecord> for CoverRequest {
    fn from(book: BookRecord) -> Self {
        Self {
            title: book.title,
            author: book.author,
            year: book.year.map(|y| y.to_string()),
            genres: book.genres,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
