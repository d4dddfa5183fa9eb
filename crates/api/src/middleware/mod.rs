//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`auth::OptionalAuthUser`] -- Same, but guests are allowed through.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireStaff`] -- Requires `admin` or `moderator`.

pub mod auth;
pub mod rbac;
