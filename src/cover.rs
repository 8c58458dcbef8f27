//! The rendered cover artifact.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbaImage};

use crate::error::{CoverError, Result};

/// A PNG-encoded cover of fixed pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl CoverImage {
    /// MIME type of the encoded data.
    pub const MIME_TYPE: &'static str = "image/png";

    /// Encodes an RGBA raster as PNG.
    pub fn encode(image: &RgbaImage) -> Result<Self> {
        let mut data = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
            .map_err(CoverError::Encode)?;

        Ok(Self {
            width: image.width(),
            height: image.height(),
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the encoded PNG bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the cover, returning the encoded PNG bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Decodes the PNG back into an RGBA raster.
    pub fn decode(&self) -> Result<RgbaImage> {
        let image = image::load_from_memory_with_format(&self.data, ImageFormat::Png)
            .map_err(CoverError::Decode)?;
        Ok(image.to_rgba8())
    }

    /// Returns a `data:` URL suitable for an inline image source.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", Self::MIME_TYPE, STANDARD.encode(&self.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn encode_then_decode_keeps_pixels() {
        let raster = RgbaImage::from_pixel(3, 5, Rgba([10, 20, 30, 255]));
        let cover = CoverImage::encode(&raster).unwrap();

        assert_eq!((cover.width(), cover.height()), (3, 5));
        assert_eq!(&cover.bytes()[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = cover.decode().unwrap();
        assert_eq!(decoded.get_pixel(2, 4).0, [10, 20, 30, 255]);
    }

    #[test]
    fn data_url_prefix() {
        let cover = CoverImage::encode(&RgbaImage::new(1, 1)).unwrap();
        assert!(cover.to_data_url().starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn garbage_fails_to_decode() {
        let cover = CoverImage {
            width: 1,
            height: 1,
            data: vec![1, 2, 3],
        };
        assert!(matches!(cover.decode(), Err(CoverError::Decode(_))));
    }
}
