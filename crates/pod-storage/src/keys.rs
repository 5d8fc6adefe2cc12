//! Shared key generation for storage backends.
//!
//! Key format: `checkins/{shipper_id}/{photo_id}-{main|thumb}.jpg`. All
//! backends must use this format for consistency.

use uuid::Uuid;

/// Which artifact of a processed photo a key refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoVariant {
    Main,
    Thumbnail,
}

impl PhotoVariant {
    fn suffix(self) -> &'static str {
        match self {
            PhotoVariant::Main => "main",
            PhotoVariant::Thumbnail => "thumb",
        }
    }
}

/// Generate the storage key for one artifact of a check-in photo.
pub fn photo_key(shipper_id: Uuid, photo_id: Uuid, variant: PhotoVariant) -> String {
    format!(
        "checkins/{}/{}-{}.jpg",
        shipper_id,
        photo_id,
        variant.suffix()
    )
}
