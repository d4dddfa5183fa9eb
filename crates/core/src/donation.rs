//! Donation statuses, payment references and checkout metadata.
//!
//! The payment gateway echoes the metadata attached at checkout
//! initialization back on verification. [`DonationMetadata`] is the typed view
//! of that blob; parsing is deliberately lenient because the gateway returns
//! whatever JSON shape the client sent (or an empty string when none was).

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// Checkout started but not yet verified.
pub const DONATION_STATUS_PENDING: &str = "pending";

/// Verified with the gateway and credited.
pub const DONATION_STATUS_COMPLETED: &str = "completed";

/// Verification reported a non-success status.
pub const DONATION_STATUS_FAILED: &str = "failed";

/// Maximum length of a payment reference.
pub const MAX_REFERENCE_LENGTH: usize = 100;

/// Prefix for references generated by this platform.
pub const REFERENCE_PREFIX: &str = "ALMS-";

/// Maximum length of a donor's message.
pub const MAX_MESSAGE_LENGTH: usize = 1_000;

// ---------------------------------------------------------------------------
// References
// ---------------------------------------------------------------------------

/// Generate a fresh payment reference: `ALMS-` followed by 24 hex characters.
pub fn generate_reference() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{REFERENCE_PREFIX}{}", &id[..24])
}

/// Validate a payment reference received from a redirect or webhook.
///
/// References are 1-100 characters of `[A-Za-z0-9._=-]`, which covers both
/// our own references and the ones the gateway generates itself.
pub fn validate_reference(reference: &str) -> Result<(), CoreError> {
    if reference.is_empty() {
        return Err(CoreError::Validation(
            "Payment reference must not be empty".to_string(),
        ));
    }
    if reference.len() > MAX_REFERENCE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Payment reference exceeds {MAX_REFERENCE_LENGTH} characters"
        )));
    }
    let valid = reference
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '=' | '-'));
    if !valid {
        return Err(CoreError::Validation(format!(
            "Payment reference '{reference}' contains invalid characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Donor details carried through the checkout as gateway metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DonationMetadata {
    pub donor_name: Option<String>,
    pub is_recurring: bool,
    pub is_anonymous: bool,
    pub cause_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub message: Option<String>,
}

impl DonationMetadata {
    /// Parse metadata returned by the gateway.
    ///
    /// Non-object values yield defaults. Booleans may arrive as `"true"`;
    /// ids may arrive as numeric strings.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        Self {
            donor_name: string_field(obj, "donor_name"),
            is_recurring: bool_field(obj, "is_recurring"),
            is_anonymous: bool_field(obj, "is_anonymous"),
            cause_id: id_field(obj, "cause_id"),
            user_id: id_field(obj, "user_id"),
            message: string_field(obj, "message"),
        }
    }

    /// Serialize for the gateway's `metadata` field, omitting empty values.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        if let Some(name) = &self.donor_name {
            obj.insert("donor_name".into(), json!(name));
        }
        obj.insert("is_recurring".into(), json!(self.is_recurring));
        obj.insert("is_anonymous".into(), json!(self.is_anonymous));
        if let Some(id) = self.cause_id {
            obj.insert("cause_id".into(), json!(id));
        }
        if let Some(id) = self.user_id {
            obj.insert("user_id".into(), json!(id));
        }
        if let Some(message) = &self.message {
            obj.insert("message".into(), json!(message));
        }
        Value::Object(obj)
    }

    /// Name shown publicly for this donation.
    pub fn display_name(&self) -> &str {
        if self.is_anonymous {
            return "Anonymous";
        }
        self.donor_name.as_deref().unwrap_or("Anonymous")
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn bool_field(obj: &Map<String, Value>, key: &str) -> bool {
    match obj.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    }
}

fn id_field(obj: &Map<String, Value>, key: &str) -> Option<DbId> {
    match obj.get(key) {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|id| *id > 0)
}
