//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod activity_repo;
pub mod aid_request_repo;
pub mod cause_repo;
pub mod contact_repo;
pub mod donation_repo;
pub mod newsletter_repo;
pub mod session_repo;
pub mod site_setting_repo;
pub mod story_repo;
pub mod testimonial_repo;
pub mod treatment_update_repo;
pub mod user_repo;

pub use activity_repo::ActivityLogRepo;
pub use aid_request_repo::AidRequestRepo;
pub use cause_repo::CauseRepo;
pub use contact_repo::ContactRepo;
pub use donation_repo::DonationRepo;
pub use newsletter_repo::NewsletterRepo;
pub use session_repo::SessionRepo;
pub use site_setting_repo::SiteSettingRepo;
pub use story_repo::StoryRepo;
pub use testimonial_repo::TestimonialRepo;
pub use treatment_update_repo::TreatmentUpdateRepo;
pub use user_repo::UserRepo;
