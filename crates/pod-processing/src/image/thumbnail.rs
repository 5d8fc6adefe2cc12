//! Square thumbnail generation.

use anyhow::Result;
use bytes::Bytes;
use image::imageops::FilterType;

use crate::compression::{decode_image, encode_jpeg};

pub const DEFAULT_THUMBNAIL_SIDE: u32 = 300;

const THUMBNAIL_QUALITY: u8 = 85;

pub struct Thumbnailer;

impl Thumbnailer {
    /// Produce an exactly `side x side` JPEG thumbnail, scaling to cover and
    /// cropping from the center. The result is always square regardless of
    /// the input's aspect ratio or size.
    pub fn square(data: &[u8], side: u32) -> Result<Bytes> {
        let img = decode_image(data)?;
        let thumbnail = img.resize_to_fill(side, side, FilterType::Lanczos3);
        let encoded = encode_jpeg(&thumbnail, THUMBNAIL_QUALITY)?;

        tracing::debug!(
            side = side,
            output_bytes = encoded.len(),
            "Generated square thumbnail"
        );

        Ok(Bytes::from(encoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn image_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 64])
        });
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn thumbnail_dimensions(data: &[u8], side: u32) -> (u32, u32) {
        let thumb = Thumbnailer::square(data, side).unwrap();
        decode_image(&thumb).unwrap().dimensions()
    }

    #[test]
    fn test_landscape_input_yields_square() {
        assert_eq!(thumbnail_dimensions(&image_bytes(640, 360), 300), (300, 300));
    }

    #[test]
    fn test_portrait_input_yields_square() {
        assert_eq!(thumbnail_dimensions(&image_bytes(360, 640), 300), (300, 300));
    }

    #[test]
    fn test_square_input_yields_square() {
        assert_eq!(thumbnail_dimensions(&image_bytes(500, 500), 300), (300, 300));
    }

    #[test]
    fn test_smaller_than_side_input_is_upscaled() {
        assert_eq!(thumbnail_dimensions(&image_bytes(100, 80), 300), (300, 300));
    }

    #[test]
    fn test_custom_side() {
        assert_eq!(thumbnail_dimensions(&image_bytes(640, 360), 64), (64, 64));
    }

    #[test]
    fn test_invalid_input_is_an_error() {
        assert!(Thumbnailer::square(b"not an image", 300).is_err());
    }
}
