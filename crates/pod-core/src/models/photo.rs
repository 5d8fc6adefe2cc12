//! Processed photo artifact attached to a check-in.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One processed image: byte-budget-compliant primary plus square thumbnail.
///
/// Created transiently by the photo pipeline; becomes durable only once both
/// remote-storage uploads succeed. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub url: String,
    pub thumbnail_url: String,
    pub storage_key: String,
    pub thumbnail_key: String,
    /// Byte size of the compressed primary (always <= configured maximum).
    pub size_bytes: u64,
    pub width: u32,
    pub height: u32,
    /// Extracted location metadata. Only geolocation fields survive
    /// processing; all other EXIF data is stripped. Empty object when the
    /// source carried no GPS data.
    pub location_metadata: JsonValue,
    pub original_filename: String,
    pub content_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_photo_serialization_round_trip() {
        let photo = Photo {
            url: "https://cdn.example.com/checkins/a-main.jpg".to_string(),
            thumbnail_url: "https://cdn.example.com/checkins/a-thumb.jpg".to_string(),
            storage_key: "checkins/a-main.jpg".to_string(),
            thumbnail_key: "checkins/a-thumb.jpg".to_string(),
            size_bytes: 1_500_000,
            width: 1920,
            height: 1080,
            location_metadata: json!({"latitude": 10.76, "longitude": 106.66}),
            original_filename: "door.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
        };

        let serialized = serde_json::to_string(&photo).unwrap();
        let deserialized: Photo = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized.size_bytes, photo.size_bytes);
        assert_eq!(deserialized.location_metadata["latitude"], json!(10.76));
    }
}
