//! EXIF handling: GPS extraction and metadata stripping.
//!
//! Retention policy: only geolocation fields are kept. `extract_location`
//! pulls GPS coordinates out before processing; `strip_exif` removes the whole
//! EXIF segment so no device or descriptive metadata survives into the stored
//! artifact. Extraction failures are never fatal and yield empty metadata.

use anyhow::Result;
use exif::{In, Reader, Tag, Value};
use img_parts::{jpeg::Jpeg, png::Png, ImageEXIF};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::io::Cursor;

/// Geolocation fields extracted from EXIF. All fields absent when the source
/// carried no (parseable) GPS data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude_meters: Option<f64>,
}

impl LocationMetadata {
    pub fn is_empty(&self) -> bool {
        self.latitude.is_none() && self.longitude.is_none() && self.altitude_meters.is_none()
    }

    /// Serialize to the map shape stored on `Photo`; empty object when no
    /// fields are present.
    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_else(|_| json!({}))
    }
}

/// Extract GPS coordinates from an image's EXIF data.
///
/// Never fails: undecodable input or missing/malformed GPS fields yield the
/// empty metadata.
pub fn extract_location(data: &[u8]) -> LocationMetadata {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(exif) => exif,
        Err(_) => return LocationMetadata::default(),
    };

    LocationMetadata {
        latitude: read_coordinate(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, b'S'),
        longitude: read_coordinate(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, b'W'),
        altitude_meters: read_altitude(&exif),
    }
}

/// Read a degrees/minutes/seconds rational triple and apply the hemisphere
/// sign from the companion reference tag.
fn read_coordinate(
    exif: &exif::Exif,
    value_tag: Tag,
    ref_tag: Tag,
    negative_ref: u8,
) -> Option<f64> {
    let field = exif.get_field(value_tag, In::PRIMARY)?;
    let rationals = match &field.value {
        Value::Rational(v) if v.len() >= 3 => v,
        _ => return None,
    };

    let degrees = rationals[0].to_f64();
    let minutes = rationals[1].to_f64();
    let seconds = rationals[2].to_f64();
    let mut coordinate = degrees + minutes / 60.0 + seconds / 3600.0;

    if !coordinate.is_finite() {
        return None;
    }

    if let Some(reference) = exif.get_field(ref_tag, In::PRIMARY) {
        if let Value::Ascii(parts) = &reference.value {
            if parts.first().and_then(|s| s.first()) == Some(&negative_ref) {
                coordinate = -coordinate;
            }
        }
    }

    Some(coordinate)
}

fn read_altitude(exif: &exif::Exif) -> Option<f64> {
    let field = exif.get_field(Tag::GPSAltitude, In::PRIMARY)?;
    let altitude = match &field.value {
        Value::Rational(v) if !v.is_empty() => v[0].to_f64(),
        _ => return None,
    };
    if !altitude.is_finite() {
        return None;
    }

    // GPSAltitudeRef 1 means below sea level.
    let below_sea_level = exif
        .get_field(Tag::GPSAltitudeRef, In::PRIMARY)
        .map(|f| matches!(&f.value, Value::Byte(v) if v.first() == Some(&1)))
        .unwrap_or(false);

    Some(if below_sea_level { -altitude } else { altitude })
}

/// Remove the EXIF segment from a JPEG or PNG. Other formats (and inputs
/// neither parser accepts) pass through unchanged.
pub fn strip_exif(data: &[u8]) -> Result<Vec<u8>> {
    if let Ok(mut jpeg) = Jpeg::from_bytes(data.to_vec().into()) {
        jpeg.set_exif(None);
        return Ok(jpeg.encoder().bytes().to_vec());
    }

    if let Ok(mut png) = Png::from_bytes(data.to_vec().into()) {
        png.set_exif(None);
        return Ok(png.encoder().bytes().to_vec());
    }

    Ok(data.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    fn jpeg_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([120, 80, 40])));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
            .unwrap();
        buffer
    }

    fn push_u16(buf: &mut Vec<u8>, v: u16) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    fn push_u32(buf: &mut Vec<u8>, v: u32) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    fn push_rational(buf: &mut Vec<u8>, num: u32, denom: u32) {
        push_u32(buf, num);
        push_u32(buf, denom);
    }

    /// Minimal little-endian TIFF with a GPS IFD: 10°45'30" N, 106°39'36" E.
    fn gps_tiff() -> Vec<u8> {
        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"II");
        push_u16(&mut tiff, 42);
        push_u32(&mut tiff, 8); // IFD0 offset

        // IFD0: single GPSInfo pointer entry.
        push_u16(&mut tiff, 1);
        push_u16(&mut tiff, 0x8825); // GPSInfo
        push_u16(&mut tiff, 4); // LONG
        push_u32(&mut tiff, 1);
        push_u32(&mut tiff, 26); // GPS IFD offset
        push_u32(&mut tiff, 0); // next IFD

        // GPS IFD at 26: four entries, rational data at 80 and 104.
        push_u16(&mut tiff, 4);
        push_u16(&mut tiff, 0x0001); // GPSLatitudeRef
        push_u16(&mut tiff, 2); // ASCII
        push_u32(&mut tiff, 2);
        tiff.extend_from_slice(b"N\0\0\0");
        push_u16(&mut tiff, 0x0002); // GPSLatitude
        push_u16(&mut tiff, 5); // RATIONAL
        push_u32(&mut tiff, 3);
        push_u32(&mut tiff, 80);
        push_u16(&mut tiff, 0x0003); // GPSLongitudeRef
        push_u16(&mut tiff, 2);
        push_u32(&mut tiff, 2);
        tiff.extend_from_slice(b"E\0\0\0");
        push_u16(&mut tiff, 0x0004); // GPSLongitude
        push_u16(&mut tiff, 5);
        push_u32(&mut tiff, 3);
        push_u32(&mut tiff, 104);
        push_u32(&mut tiff, 0); // next IFD

        assert_eq!(tiff.len(), 80);
        push_rational(&mut tiff, 10, 1);
        push_rational(&mut tiff, 45, 1);
        push_rational(&mut tiff, 30, 1);
        push_rational(&mut tiff, 106, 1);
        push_rational(&mut tiff, 39, 1);
        push_rational(&mut tiff, 36, 1);

        tiff
    }

    fn jpeg_with_gps() -> Vec<u8> {
        let mut jpeg = Jpeg::from_bytes(jpeg_bytes().into()).unwrap();
        jpeg.set_exif(Some(Bytes::from(gps_tiff())));
        jpeg.encoder().bytes().to_vec()
    }

    #[test]
    fn test_extract_gps_coordinates() {
        let location = extract_location(&jpeg_with_gps());

        let latitude = location.latitude.unwrap();
        let longitude = location.longitude.unwrap();
        assert!((latitude - (10.0 + 45.0 / 60.0 + 30.0 / 3600.0)).abs() < 1e-9);
        assert!((longitude - (106.0 + 39.0 / 60.0 + 36.0 / 3600.0)).abs() < 1e-9);
        assert!(location.altitude_meters.is_none());
    }

    #[test]
    fn test_extract_without_exif_is_empty() {
        let location = extract_location(&jpeg_bytes());
        assert!(location.is_empty());
    }

    #[test]
    fn test_extract_from_garbage_is_empty() {
        let location = extract_location(b"not an image");
        assert!(location.is_empty());
    }

    #[test]
    fn test_strip_exif_removes_gps() {
        let tagged = jpeg_with_gps();
        assert!(!extract_location(&tagged).is_empty());

        let stripped = strip_exif(&tagged).unwrap();

        assert!(extract_location(&stripped).is_empty());
        // Pixel data survives.
        assert!(crate::compression::decode_image(&stripped).is_ok());
    }

    #[test]
    fn test_strip_exif_passes_through_unknown_formats() {
        let data = b"not an image".to_vec();
        assert_eq!(strip_exif(&data).unwrap(), data);
    }

    #[test]
    fn test_location_to_json() {
        let location = LocationMetadata {
            latitude: Some(10.75),
            longitude: Some(106.66),
            altitude_meters: None,
        };
        let json = location.to_json();
        assert_eq!(json["latitude"], 10.75);
        assert_eq!(json["longitude"], 106.66);
        assert!(json.get("altitude_meters").is_none());

        assert_eq!(LocationMetadata::default().to_json(), json!({}));
    }
}
