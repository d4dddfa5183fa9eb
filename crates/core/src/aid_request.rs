//! Aid request statuses and review transitions.
//!
//! An aid request is an applicant's submission for assistance. Staff move it
//! through review; an approved request can be published as a cause.

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Submitted and waiting for staff.
pub const AID_STATUS_PENDING: &str = "pending";

/// Picked up by a reviewer.
pub const AID_STATUS_UNDER_REVIEW: &str = "under_review";

/// Accepted; may have been published as a cause.
pub const AID_STATUS_APPROVED: &str = "approved";

/// Declined.
pub const AID_STATUS_REJECTED: &str = "rejected";

/// All valid aid request status values.
pub const VALID_AID_STATUSES: &[&str] = &[
    AID_STATUS_PENDING,
    AID_STATUS_UNDER_REVIEW,
    AID_STATUS_APPROVED,
    AID_STATUS_REJECTED,
];

/// Maximum number of supporting documents per request.
pub const MAX_DOCUMENTS: usize = 10;

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

/// Validate that a status string is one of the accepted values.
pub fn validate_aid_status(status: &str) -> Result<(), CoreError> {
    if VALID_AID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid aid request status '{status}'. Must be one of: {}",
            VALID_AID_STATUSES.join(", ")
        )))
    }
}

/// Whether a request in `status` can no longer change.
pub fn is_terminal(status: &str) -> bool {
    status == AID_STATUS_APPROVED || status == AID_STATUS_REJECTED
}

/// Validate a review transition from `from` to `to`.
///
/// `pending` may move to any other status, `under_review` only to a
/// decision, and decisions are final.
pub fn validate_transition(from: &str, to: &str) -> Result<(), CoreError> {
    validate_aid_status(to)?;

    let allowed = match from {
        AID_STATUS_PENDING => to != AID_STATUS_PENDING,
        AID_STATUS_UNDER_REVIEW => to == AID_STATUS_APPROVED || to == AID_STATUS_REJECTED,
        _ => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Aid request cannot move from '{from}' to '{to}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_can_move_anywhere_else() {
        assert!(validate_transition(AID_STATUS_PENDING, AID_STATUS_UNDER_REVIEW).is_ok());
        assert!(validate_transition(AID_STATUS_PENDING, AID_STATUS_APPROVED).is_ok());
        assert!(validate_transition(AID_STATUS_PENDING, AID_STATUS_REJECTED).is_ok());
        assert!(validate_transition(AID_STATUS_PENDING, AID_STATUS_PENDING).is_err());
    }

    #[test]
    fn test_under_review_only_to_a_decision() {
        assert!(validate_transition(AID_STATUS_UNDER_REVIEW, AID_STATUS_APPROVED).is_ok());
        assert!(validate_transition(AID_STATUS_UNDER_REVIEW, AID_STATUS_REJECTED).is_ok());
        assert!(validate_transition(AID_STATUS_UNDER_REVIEW, AID_STATUS_PENDING).is_err());
    }

    #[test]
    fn test_decisions_are_final() {
        assert!(is_terminal(AID_STATUS_APPROVED));
        assert!(is_terminal(AID_STATUS_REJECTED));
        assert!(!is_terminal(AID_STATUS_PENDING));
        let err = validate_transition(AID_STATUS_APPROVED, AID_STATUS_REJECTED).unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[test]
    fn test_unknown_target_is_a_validation_error() {
        let err = validate_transition(AID_STATUS_PENDING, "archived").unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
