/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// UPLOADS
// =============================================================================

/// Maximum accepted size for an uploaded issue photo (bytes)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// MIME types accepted for issue photos
pub const ALLOWED_IMAGE_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/tiff",
];

/// Check whether a content type is an accepted issue photo type
pub fn is_image_mime_type_allowed(content_type: &str) -> bool {
    ALLOWED_IMAGE_MIME_TYPES.contains(&content_type)
}
