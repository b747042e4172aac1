//! GPS extraction from EXIF metadata.
//!
//! Reads the GPS IFD of an uploaded photo and converts the
//! degrees/minutes/seconds rational triples to decimal degrees. Extraction is
//! all-or-nothing: a missing field or a malformed component anywhere in the
//! four GPS fields drops both coordinates, and no error ever escapes. The
//! caller only sees `Some((lat, lon))` or `None`.

use std::io::Cursor;
use std::path::Path;

use crate::shared::validation::{is_valid_latitude, is_valid_longitude};

/// Extract GPS coordinates from image file bytes.
///
/// Returns `(latitude, longitude)` in decimal degrees (negative for the
/// southern/western hemispheres), or `None` when the image carries no
/// readable GPS metadata.
pub fn extract_gps(data: &[u8]) -> Option<(f64, f64)> {
    let mut reader = exif::Reader::new();
    reader.continue_on_error(true);
    let mut cursor = Cursor::new(data);

    let exif = reader
        .read_from_container(&mut cursor)
        .or_else(|e| e.distill_partial_result(|_| {}))
        .ok()?;

    let latitude =
        extract_coordinate(&exif, exif::Tag::GPSLatitude, exif::Tag::GPSLatitudeRef)?;
    let longitude =
        extract_coordinate(&exif, exif::Tag::GPSLongitude, exif::Tag::GPSLongitudeRef)?;

    // corrupt rationals can produce values outside the coordinate space
    if !is_valid_latitude(latitude) || !is_valid_longitude(longitude) {
        return None;
    }

    Some((latitude, longitude))
}

/// Extract GPS coordinates from an image file on disk.
///
/// I/O failures (missing file, unreadable path) degrade to `None` the same
/// way malformed metadata does.
pub fn extract_gps_from_path(path: &Path) -> Option<(f64, f64)> {
    let data = std::fs::read(path).ok()?;
    extract_gps(&data)
}

/// Extract one signed coordinate (latitude or longitude) from EXIF
fn extract_coordinate(exif: &exif::Exif, coord_tag: exif::Tag, ref_tag: exif::Tag) -> Option<f64> {
    let coord_field = exif.get_field(coord_tag, exif::In::PRIMARY)?;
    let ref_field = exif.get_field(ref_tag, exif::In::PRIMARY)?;

    let rationals = match &coord_field.value {
        exif::Value::Rational(r) => r,
        _ => return None,
    };

    let decimal = dms_to_decimal(rationals)?;

    let reference = ref_field.display_value().to_string();
    Some(apply_hemisphere(decimal, &reference))
}

/// Convert a [degrees, minutes, seconds] rational triple to decimal degrees.
///
/// A short slice, a zero denominator, or a non-finite component fails the
/// whole conversion.
fn dms_to_decimal(rationals: &[exif::Rational]) -> Option<f64> {
    if rationals.len() < 3 {
        return None;
    }

    let mut decimal = 0.0;
    for (i, rational) in rationals.iter().take(3).enumerate() {
        if rational.denom == 0 {
            return None;
        }
        let component = rational.to_f64();
        if !component.is_finite() {
            return None;
        }
        // degrees: /1, minutes: /60, seconds: /3600
        decimal += component / 60f64.powi(i as i32);
    }

    Some(decimal)
}

/// Negate for the southern and western hemispheres
fn apply_hemisphere(decimal: f64, reference: &str) -> f64 {
    if reference == "S" || reference == "W" {
        -decimal
    } else {
        decimal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::minimal_png;

    fn rational(num: u32, denom: u32) -> exif::Rational {
        exif::Rational { num, denom }
    }

    #[test]
    fn test_dms_to_decimal_new_york() {
        // 40° 42' 46" N ~= 40.7128
        let dms = [rational(40, 1), rational(42, 1), rational(46, 1)];
        let decimal = dms_to_decimal(&dms).unwrap();
        assert!((decimal - 40.712_777).abs() < 1e-5);
    }

    #[test]
    fn test_dms_to_decimal_rational_components() {
        // 48° 51.4' expressed as 514/10 minutes
        let dms = [rational(48, 1), rational(514, 10), rational(0, 1)];
        let decimal = dms_to_decimal(&dms).unwrap();
        assert!((decimal - 48.856_666).abs() < 1e-5);
    }

    #[test]
    fn test_dms_to_decimal_zero_denominator_fails() {
        let dms = [rational(40, 1), rational(42, 0), rational(46, 1)];
        assert!(dms_to_decimal(&dms).is_none());
    }

    #[test]
    fn test_dms_to_decimal_short_slice_fails() {
        let dms = [rational(40, 1), rational(42, 1)];
        assert!(dms_to_decimal(&dms).is_none());
    }

    #[test]
    fn test_apply_hemisphere() {
        assert_eq!(apply_hemisphere(40.0, "N"), 40.0);
        assert_eq!(apply_hemisphere(40.0, "S"), -40.0);
        assert_eq!(apply_hemisphere(74.0, "E"), 74.0);
        assert_eq!(apply_hemisphere(74.0, "W"), -74.0);
        // unknown references leave the sign alone
        assert_eq!(apply_hemisphere(74.0, "?"), 74.0);
    }

    #[test]
    fn test_extract_gps_without_exif_is_none() {
        assert_eq!(extract_gps(&minimal_png()), None);
    }

    #[test]
    fn test_extract_gps_garbage_bytes_is_none() {
        assert_eq!(extract_gps(b"definitely not an image"), None);
        assert_eq!(extract_gps(&[]), None);
    }

    #[test]
    fn test_extract_gps_from_missing_path_is_none() {
        let path = Path::new("/nonexistent/path/image.jpg");
        assert_eq!(extract_gps_from_path(path), None);
    }
}
