//! Editorial content: success stories, testimonials and treatment updates.

use alms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Success stories
// ---------------------------------------------------------------------------

/// A row from the `success_stories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SuccessStory {
    pub id: DbId,
    pub cause_id: Option<DbId>,
    pub title: String,
    pub body: String,
    pub image_path: Option<String>,
    pub is_published: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSuccessStory {
    pub cause_id: Option<DbId>,
    pub title: String,
    pub body: String,
    pub image_path: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSuccessStory {
    pub title: Option<String>,
    pub body: Option<String>,
    pub image_path: Option<String>,
    pub is_published: Option<bool>,
}

// ---------------------------------------------------------------------------
// Testimonials
// ---------------------------------------------------------------------------

/// A row from the `testimonials` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Testimonial {
    pub id: DbId,
    pub author_name: String,
    pub author_role: Option<String>,
    pub quote: String,
    pub is_published: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTestimonial {
    pub author_name: String,
    pub author_role: Option<String>,
    pub quote: String,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTestimonial {
    pub author_name: Option<String>,
    pub author_role: Option<String>,
    pub quote: Option<String>,
    pub is_published: Option<bool>,
}

// ---------------------------------------------------------------------------
// Treatment updates
// ---------------------------------------------------------------------------

/// A progress post on a cause, from the `treatment_updates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TreatmentUpdate {
    pub id: DbId,
    pub cause_id: DbId,
    pub author_id: Option<DbId>,
    pub title: String,
    pub body: String,
    pub image_path: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTreatmentUpdate {
    pub cause_id: DbId,
    pub author_id: Option<DbId>,
    pub title: String,
    pub body: String,
    pub image_path: Option<String>,
}
