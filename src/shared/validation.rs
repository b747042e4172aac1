use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for category keys
    /// Must be lowercase alphanumeric with underscores
    /// - Valid: "roads_transport", "other", "water_sanitation"
    /// - Invalid: "_roads", "roads_", "roads__transport", "Roads", "roads-transport"
    pub static ref CATEGORY_KEY_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:_[a-z0-9]+)*$").unwrap();
}

/// Valid latitude range in decimal degrees
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Valid longitude range in decimal degrees
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// Check whether a latitude value is finite and within [-90, 90]
pub fn is_valid_latitude(lat: f64) -> bool {
    lat.is_finite() && (LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&lat)
}

/// Check whether a longitude value is finite and within [-180, 180]
pub fn is_valid_longitude(lon: f64) -> bool {
    lon.is_finite() && (LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&lon)
}
