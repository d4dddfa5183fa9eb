//! Cause (fundraising case) statuses, categories and slugs.

use crate::error::CoreError;

/// Accepting donations.
pub const CAUSE_STATUS_ACTIVE: &str = "active";

/// Temporarily not accepting donations.
pub const CAUSE_STATUS_PAUSED: &str = "paused";

/// Goal met or case closed.
pub const CAUSE_STATUS_COMPLETED: &str = "completed";

/// All valid cause status values.
pub const VALID_CAUSE_STATUSES: &[&str] = &[
    CAUSE_STATUS_ACTIVE,
    CAUSE_STATUS_PAUSED,
    CAUSE_STATUS_COMPLETED,
];

/// Case categories shown on the browse page.
pub const VALID_CATEGORIES: &[&str] = &[
    "medical",
    "education",
    "food",
    "shelter",
    "emergency",
    "other",
];

/// Maximum slug length.
pub const MAX_SLUG_LENGTH: usize = 120;

/// Validate that a cause status is one of the accepted values.
pub fn validate_cause_status(status: &str) -> Result<(), CoreError> {
    if VALID_CAUSE_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid cause status '{status}'. Must be one of: {}",
            VALID_CAUSE_STATUSES.join(", ")
        )))
    }
}

/// Validate a case category.
pub fn validate_category(category: &str) -> Result<(), CoreError> {
    if VALID_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid category '{category}'. Must be one of: {}",
            VALID_CATEGORIES.join(", ")
        )))
    }
}

/// Build a URL slug from a title: lowercase ASCII alphanumerics separated by
/// single hyphens.
///
/// Returns a validation error if nothing usable is left.
pub fn slugify(title: &str) -> Result<String, CoreError> {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if slug.len() > MAX_SLUG_LENGTH {
        slug.truncate(MAX_SLUG_LENGTH);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    if slug.is_empty() {
        return Err(CoreError::Validation(format!(
            "Cannot derive a slug from title '{title}'"
        )));
    }
    Ok(slug)
}

/// Whether a cause in `status` can receive new donations.
pub fn accepts_donations(status: &str) -> bool {
    status == CAUSE_STATUS_ACTIVE
}
