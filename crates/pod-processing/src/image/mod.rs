//! Image transform modules: thumbnailing and EXIF handling.

pub mod exif;
pub mod thumbnail;
