//! Serializable rendering style.
//!
//! A [`CoverStyle`] captures every tunable of the cover renderer in a
//! JSON-friendly form. Every field has a default, so a partial document (or
//! `{}`) is a valid style.
//!
//! # Example
//!
//! ```
//! use bookcover_renderer::CoverStyle;
//!
//! let style = CoverStyle::from_json(r#"{ "noiseSeed": 7, "maxLines": 3 }"#).unwrap();
//! assert_eq!(style.noise_seed, Some(7));
//! assert_eq!(style.title_max_size, 32);
//!
//! let json = style.to_json().unwrap();
//! assert!(json.contains("\"noiseSeed\":7"));
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CoverError, Result};

/// Rendering configuration for covers.
///
/// # JSON Format
///
/// ```json
/// {
///   "fontFamily": "Georgia, 'Times New Roman', serif",
///   "noiseSeed": 42,
///   "grainSpeckles": 1000,
///   "grainOpacity": 0.03,
///   "titleMinSize": 12,
///   "titleMaxSize": 32,
///   "maxLines": 4
/// }
/// ```
/// Upper bound on `grainSpeckles`.
pub const MAX_GRAIN_SPECKLES: u32 = 1000;

/// Upper bound on the number of title sizes between `titleMinSize` and
/// `titleMaxSize`, inclusive.
pub const MAX_TITLE_SIZES: u32 = 21;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct CoverStyle {
    /// CSS-style font family list used for all text.
    pub font_family: String,

    /// Seed for the grain texture. `None` draws fresh noise on every render.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise_seed: Option<u64>,

    /// Number of grain speckles, at most [`MAX_GRAIN_SPECKLES`].
    pub grain_speckles: u32,
    /// Opacity of each speckle (0.0-1.0).
    pub grain_opacity: f32,

    pub outer_border_width: f32,
    pub inner_border_margin: f32,
    pub inner_border_width: f32,

    /// Length of each arm of the corner ornaments.
    pub corner_arm: f32,
    /// Distance of the corner ornaments from the cover edge.
    pub corner_inset: f32,
    pub corner_width: f32,

    /// Smallest title font size tried.
    pub title_min_size: u32,
    /// Largest title font size tried.
    pub title_max_size: u32,
    /// Line cap for the title and author blocks.
    pub max_lines: usize,
    /// Line height as a multiple of the font size.
    pub line_height: f32,

    /// Gap between the bottom of the title block and the divider.
    pub divider_gap: f32,
    pub divider_width: f32,
    /// Gap between the divider and the top of the author block.
    pub author_gap: f32,
}

impl Default for CoverStyle {
    fn default() -> Self {
        Self {
            font_family: "Georgia, 'Times New Roman', serif".to_string(),
            noise_seed: None,
            grain_speckles: 1000,
            grain_opacity: 0.03,
            outer_border_width: 4.0,
            inner_border_margin: 12.0,
            inner_border_width: 1.0,
            corner_arm: 20.0,
            corner_inset: 8.0,
            corner_width: 2.0,
            title_min_size: 12,
            title_max_size: 32,
            max_lines: 4,
            line_height: 1.3,
            divider_gap: 10.0,
            divider_width: 2.0,
            author_gap: 30.0,
        }
    }
}

impl CoverStyle {
    /// Creates the default style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the grain seed, making renders reproducible.
    pub fn with_noise_seed(mut self, seed: u64) -> Self {
        self.noise_seed = Some(seed);
        self
    }

    /// Sets the font family list.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Checks the style for values the renderer cannot honor.
    pub fn validate(&self) -> Result<()> {
        let title_sizes = self.title_max_size.saturating_sub(self.title_min_size) + 1;
        let lengths = [
            ("outerBorderWidth", self.outer_border_width),
            ("innerBorderMargin", self.inner_border_margin),
            ("innerBorderWidth", self.inner_border_width),
            ("cornerArm", self.corner_arm),
            ("cornerInset", self.corner_inset),
            ("cornerWidth", self.corner_width),
            ("dividerGap", self.divider_gap),
            ("dividerWidth", self.divider_width),
        ];

        let problem = if self.title_min_size == 0 {
            Some("titleMinSize must be at least 1".to_string())
        } else if self.title_min_size > self.title_max_size {
            Some(format!(
                "titleMinSize ({}) exceeds titleMaxSize ({})",
                self.title_min_size, self.title_max_size
            ))
        } else if title_sizes > MAX_TITLE_SIZES {
            Some(format!(
                "title size range spans {title_sizes} sizes, at most {MAX_TITLE_SIZES} allowed"
            ))
        } else if self.max_lines == 0 {
            Some("maxLines must be at least 1".to_string())
        } else if !(self.line_height.is_finite() && self.line_height > 0.0) {
            Some("lineHeight must be positive".to_string())
        } else if !(self.author_gap.is_finite() && self.author_gap > 0.0) {
            Some("authorGap must be positive".to_string())
        } else if let Some((name, _)) = lengths
            .iter()
            .find(|(_, value)| !(value.is_finite() && *value >= 0.0))
        {
            Some(format!("{name} must be a finite, non-negative length"))
        } else if self.grain_speckles > MAX_GRAIN_SPECKLES {
            Some(format!("grainSpeckles must be at most {MAX_GRAIN_SPECKLES}"))
        } else if !(0.0..=1.0).contains(&self.grain_opacity) {
            Some("grainOpacity must be between 0 and 1".to_string())
        } else {
            None
        };

        match problem {
            Some(message) => {
                warn!(%message, "rejected cover style");
                Err(CoverError::InvalidStyle(message))
            }
            None => Ok(()),
        }
    }

    /// Serializes the style to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serializes the style to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserializes and validates a style from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let style: Self = serde_json::from_str(json)?;
        style.validate()?;
        Ok(style)
    }

    /// Reads a style from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_style_is_valid() {
        assert!(CoverStyle::default().validate().is_ok());
    }

    #[test]
    fn empty_json_is_default() {
        let style = CoverStyle::from_json("{}").unwrap();
        assert_eq!(style, CoverStyle::default());
    }

    #[test]
    fn json_uses_camel_case() {
        let json = CoverStyle::new().with_noise_seed(3).to_json_pretty().unwrap();
        assert!(json.contains("\"fontFamily\""));
        assert!(json.contains("\"grainSpeckles\""));
        assert!(json.contains("\"noiseSeed\": 3"));
    }

    #[test]
    fn unseeded_style_omits_seed() {
        let json = CoverStyle::new().to_json().unwrap();
        assert!(!json.contains("noiseSeed"));
    }

    #[test]
    fn style_roundtrip_keeps_overrides() {
        let mut style = CoverStyle::new().with_font_family("serif").with_noise_seed(99);
        style.max_lines = 2;

        let restored = CoverStyle::from_json(&style.to_json().unwrap()).unwrap();
        assert_eq!(restored, style);
    }

    #[test]
    fn inverted_font_range_rejected() {
        let result = CoverStyle::from_json(r#"{ "titleMinSize": 40, "titleMaxSize": 20 }"#);
        assert!(matches!(result, Err(CoverError::InvalidStyle(_))));
    }

    #[test]
    fn zero_lines_rejected() {
        let style = CoverStyle {
            max_lines: 0,
            ..CoverStyle::default()
        };
        assert!(matches!(style.validate(), Err(CoverError::InvalidStyle(_))));
    }

    #[test]
    fn grain_opacity_out_of_range_rejected() {
        let style = CoverStyle {
            grain_opacity: 1.5,
            ..CoverStyle::default()
        };
        assert!(style.validate().is_err());
    }

    #[test]
    fn non_finite_lengths_rejected() {
        let styles = [
            CoverStyle {
                divider_gap: f32::NAN,
                ..CoverStyle::default()
            },
            CoverStyle {
                author_gap: f32::NAN,
                ..CoverStyle::default()
            },
            CoverStyle {
                line_height: f32::INFINITY,
                ..CoverStyle::default()
            },
            CoverStyle {
                outer_border_width: f32::NAN,
                ..CoverStyle::default()
            },
            CoverStyle {
                inner_border_width: -1.0,
                ..CoverStyle::default()
            },
        ];
        for style in styles {
            assert!(matches!(style.validate(), Err(CoverError::InvalidStyle(_))));
        }
    }

    #[test]
    fn zero_divider_gap_allowed() {
        let style = CoverStyle {
            divider_gap: 0.0,
            ..CoverStyle::default()
        };
        assert!(style.validate().is_ok());

        let style = CoverStyle {
            author_gap: 0.0,
            ..CoverStyle::default()
        };
        assert!(style.validate().is_err());
    }

    #[test]
    fn grain_and_title_range_are_capped() {
        let style = CoverStyle {
            grain_speckles: MAX_GRAIN_SPECKLES + 1,
            ..CoverStyle::default()
        };
        assert!(style.validate().is_err());

        // The default 12..=32 range is exactly at the cap.
        assert_eq!(
            CoverStyle::default().title_max_size - CoverStyle::default().title_min_size + 1,
            MAX_TITLE_SIZES
        );
        let result = CoverStyle::from_json(r#"{ "titleMinSize": 10, "titleMaxSize": 40 }"#);
        assert!(matches!(result, Err(CoverError::InvalidStyle(_))));
    }

    #[test]
    fn malformed_json_is_json_error() {
        assert!(matches!(
            CoverStyle::from_json("{ not json"),
            Err(CoverError::Json(_))
        ));
    }
}
