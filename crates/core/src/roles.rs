//! Platform roles.
//!
//! The set is fixed: ids and names must match the seed rows in
//! `20260301000001_create_roles_and_users.sql`. `users.role_id` references
//! those rows, so the database still rejects an id outside this set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MODERATOR: &str = "moderator";
pub const ROLE_DONOR: &str = "donor";

/// Role of a platform account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access to the admin dashboard.
    Admin,
    /// Works the aid-request queue and posts treatment updates.
    Moderator,
    /// Self-registered donor or applicant.
    Donor,
}

impl Role {
    /// Role assigned to self-registered accounts.
    pub const DEFAULT: Role = Role::Donor;

    /// Primary key of the seeded `roles` row.
    pub fn id(self) -> DbId {
        match self {
            Role::Admin => 1,
            Role::Moderator => 2,
            Role::Donor => 3,
        }
    }

    /// Map a `users.role_id` back to its role.
    pub fn from_id(id: DbId) -> Option<Role> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Moderator),
            3 => Some(Role::Donor),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Moderator => ROLE_MODERATOR,
            Role::Donor => ROLE_DONOR,
        }
    }

    /// Admins and moderators work the review queues.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::Moderator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_MODERATOR => Ok(Role::Moderator),
            ROLE_DONOR => Ok(Role::Donor),
            other => Err(CoreError::Validation(format!(
                "Unknown role '{other}'. Must be one of: {ROLE_ADMIN}, {ROLE_MODERATOR}, {ROLE_DONOR}"
            ))),
        }
    }
}

/// Name of the role behind `role_id`, `"unknown"` for an unseeded id.
pub fn role_name(role_id: DbId) -> &'static str {
    Role::from_id(role_id).map_or("unknown", Role::as_str)
}
