//! Byte-budget image compression.
//!
//! Two-phase strategy: walk a JPEG quality ladder down from 90, re-encoding
//! from the decoded original each step (never from lossy output, to avoid
//! compounding artifacts); if the quality floor still overshoots the budget,
//! downscale geometrically and re-encode at a fixed moderate quality. The
//! total number of encode attempts is bounded by a small constant.

use anyhow::{anyhow, Result};
use bytes::Bytes;
use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;

pub const DEFAULT_MAX_PHOTO_BYTES: usize = 2 * 1024 * 1024;

const QUALITY_START: u8 = 90;
const QUALITY_FLOOR: u8 = 20;
const QUALITY_STEP: u8 = 10;
/// Fixed quality used once the ladder is exhausted and we fall back to resizing.
const RESIZE_QUALITY: u8 = 80;
/// The sqrt scale estimate undershoots for hard-to-compress content, so the
/// downscale step repeats, recomputing the scale from the latest output size.
const MAX_RESIZE_PASSES: usize = 6;

/// Output of [`PhotoCompressor::compress_to_budget`].
#[derive(Debug, Clone)]
pub struct CompressedPhoto {
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
    /// JPEG quality of the final encode.
    pub quality: u8,
}

pub(crate) fn decode_image(data: &[u8]) -> Result<DynamicImage> {
    let cursor = Cursor::new(data);
    let img = ImageReader::new(cursor).with_guessed_format()?.decode()?;
    Ok(img)
}

/// Encode to JPEG using mozjpeg. The encoder path carries no randomness, so
/// identical input always produces byte-identical output.
pub(crate) fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb_img = img.to_rgb8();
    let (width, height) = rgb_img.dimensions();

    let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
    comp.set_size(width as usize, height as usize);
    comp.set_quality(quality as f32);
    comp.set_progressive_mode();
    comp.set_optimize_coding(true);

    let mut comp = comp.start_compress(Vec::new())?;
    comp.write_scanlines(&rgb_img)?;
    let jpeg_data = comp.finish()?;

    Ok(jpeg_data)
}

/// Compresses raw images until they fit a byte budget.
pub struct PhotoCompressor;

impl PhotoCompressor {
    /// Compress `data` to at most `max_bytes` bytes of JPEG.
    ///
    /// Fails only on undecodable input or when even aggressive downscaling
    /// cannot satisfy a pathologically small budget.
    pub fn compress_to_budget(data: &[u8], max_bytes: usize) -> Result<CompressedPhoto> {
        let img = decode_image(data)?;
        let (orig_width, orig_height) = img.dimensions();

        let mut quality = QUALITY_START;
        let mut output = encode_jpeg(&img, quality)?;
        let (mut width, mut height) = (orig_width, orig_height);

        // Phase 1: quality ladder, always re-encoding from the decoded original.
        while output.len() > max_bytes && quality > QUALITY_FLOOR {
            quality -= QUALITY_STEP;
            output = encode_jpeg(&img, quality)?;
        }

        // Phase 2: geometric downscale at a fixed moderate quality.
        if output.len() > max_bytes {
            quality = RESIZE_QUALITY;
            let mut target_width = orig_width;

            for _ in 0..MAX_RESIZE_PASSES {
                let scale = (max_bytes as f64 / output.len() as f64).sqrt();
                let mut new_width = (target_width as f64 * scale).floor() as u32;
                if new_width >= target_width {
                    new_width = target_width.saturating_sub(1);
                }
                if new_width == 0 {
                    break;
                }

                // Resize from the original to avoid compounding resampling loss.
                let resized = img.resize(new_width, u32::MAX, FilterType::Lanczos3);
                (width, height) = resized.dimensions();
                output = encode_jpeg(&resized, RESIZE_QUALITY)?;
                target_width = new_width;

                if output.len() <= max_bytes {
                    break;
                }
            }

            if output.len() > max_bytes {
                return Err(anyhow!(
                    "image does not fit within {} bytes after downscaling",
                    max_bytes
                ));
            }
        }

        tracing::debug!(
            input_bytes = data.len(),
            output_bytes = output.len(),
            quality = quality,
            width = width,
            height = height,
            "Compressed photo to budget"
        );

        Ok(CompressedPhoto {
            data: Bytes::from(output),
            width,
            height,
            quality,
        })
    }
}
