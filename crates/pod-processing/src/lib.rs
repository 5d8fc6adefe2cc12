//! POD Processing Library
//!
//! Photo transform pipeline for delivery check-ins: compression of raw images
//! to a byte budget, square thumbnail generation, and EXIF handling (GPS
//! extraction, everything-else stripping).

pub mod compression;
pub mod image;

// Re-export commonly used types
pub use compression::{CompressedPhoto, PhotoCompressor, DEFAULT_MAX_PHOTO_BYTES};
pub use image::exif::{extract_location, strip_exif, LocationMetadata};
pub use image::thumbnail::{Thumbnailer, DEFAULT_THUMBNAIL_SIDE};
