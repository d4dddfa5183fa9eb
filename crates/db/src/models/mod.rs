//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod activity;
pub mod aid_request;
pub mod cause;
pub mod contact;
pub mod content;
pub mod donation;
pub mod newsletter;
pub mod session;
pub mod site_setting;
pub mod user;
