//! Storage buckets and object path handling for signed file access.
//!
//! Files live in private buckets. Rows store either the bare object path or,
//! for older rows, the full public URL; [`normalize_object_path`] turns both
//! into the path the storage API signs.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Cover images for causes.
pub const BUCKET_CAUSE_IMAGES: &str = "cause-images";

/// Supporting documents attached to aid requests (medical reports, IDs).
pub const BUCKET_AID_DOCUMENTS: &str = "aid-documents";

/// Profile pictures.
pub const BUCKET_AVATARS: &str = "avatars";

/// Images for success stories and treatment updates.
pub const BUCKET_STORY_IMAGES: &str = "story-images";

/// Buckets the signed-URL endpoint will sign for.
pub const VALID_BUCKETS: &[&str] = &[
    BUCKET_CAUSE_IMAGES,
    BUCKET_AID_DOCUMENTS,
    BUCKET_AVATARS,
    BUCKET_STORY_IMAGES,
];

/// Maximum object path length.
pub const MAX_PATH_LENGTH: usize = 1_024;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that `bucket` is one of [`VALID_BUCKETS`].
pub fn validate_bucket(bucket: &str) -> Result<(), CoreError> {
    if VALID_BUCKETS.contains(&bucket) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown bucket '{bucket}'. Must be one of: {}",
            VALID_BUCKETS.join(", ")
        )))
    }
}

/// Whether objects in `bucket` are restricted to their owner and staff.
pub fn is_restricted_bucket(bucket: &str) -> bool {
    bucket == BUCKET_AID_DOCUMENTS
}

/// Reduce a stored file reference to a bare object path inside `bucket`.
///
/// Accepts `folder/file.jpg`, `/folder/file.jpg`, or a full URL containing
/// `/object/public/<bucket>/` or `/object/sign/<bucket>/` (query strings are
/// dropped). Rejects empty paths and `..` segments.
pub fn normalize_object_path(bucket: &str, stored: &str) -> Result<String, CoreError> {
    let stored = stored.trim();

    let mut path = stored;
    for marker in ["/object/public/", "/object/sign/", "/object/authenticated/"] {
        let needle = format!("{marker}{bucket}/");
        if let Some(idx) = stored.find(&needle) {
            path = &stored[idx + needle.len()..];
            break;
        }
    }

    if path.starts_with("http://") || path.starts_with("https://") {
        return Err(CoreError::Validation(format!(
            "URL does not point into bucket '{bucket}'"
        )));
    }

    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        return Err(CoreError::Validation(
            "Object path must not be empty".to_string(),
        ));
    }
    if path.len() > MAX_PATH_LENGTH {
        return Err(CoreError::Validation(format!(
            "Object path exceeds {MAX_PATH_LENGTH} characters"
        )));
    }
    if path.split('/').any(|segment| segment == ".." || segment == ".") {
        return Err(CoreError::Validation(
            "Object path must not contain relative segments".to_string(),
        ));
    }
    if path.contains("//") || path.contains('\\') {
        return Err(CoreError::Validation(format!(
            "Object path '{path}' is malformed"
        )));
    }

    Ok(path.to_string())
}

/// First path segment, used as the owner folder for per-user uploads
/// (`<user_id>/<file>`).
pub fn owner_folder(path: &str) -> Option<&str> {
    path.split('/').next().filter(|s| !s.is_empty())
}
