//! Error types for cover rendering.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while rendering or encoding a cover.
#[derive(Debug, Error)]
pub enum CoverError {
    /// The drawing surface could not be allocated (zero or oversized dimensions).
    #[error("Failed to allocate {width}x{height} drawing surface")]
    SurfaceAllocation { width: u32, height: u32 },

    /// The finished surface could not be encoded.
    #[error("Failed to encode cover image: {0}")]
    Encode(#[source] image::ImageError),

    /// An encoded cover could not be decoded.
    #[error("Failed to decode cover image: {0}")]
    Decode(#[source] image::ImageError),

    /// A style failed validation.
    #[error("Invalid cover style: {0}")]
    InvalidStyle(String),

    /// A font file could not be read.
    #[error("Failed to load font {path}: {source}")]
    Font {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cover operations
pub type Result<T> = std::result::Result<T, CoverError>;
