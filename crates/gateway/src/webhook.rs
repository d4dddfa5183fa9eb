//! Signed webhook deliveries from the gateway.
//!
//! The gateway signs each delivery with HMAC-SHA512 of the raw request body,
//! keyed with the account's secret key, and sends the lowercase hex digest in
//! the [`SIGNATURE_HEADER`] header.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha512;

/// Header carrying the hex-encoded signature.
pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Event name for a successful charge.
pub const EVENT_CHARGE_SUCCESS: &str = "charge.success";

type HmacSha512 = Hmac<Sha512>;

/// A webhook delivery body.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl WebhookEvent {
    /// The transaction reference carried in `data.reference`, if any.
    pub fn reference(&self) -> Option<&str> {
        self.data.get("reference").and_then(|v| v.as_str())
    }

    pub fn is_charge_success(&self) -> bool {
        self.event == EVENT_CHARGE_SUCCESS
    }
}

/// Compute the hex-encoded HMAC-SHA512 signature of `body`.
pub fn sign_payload(secret: &str, body: &[u8]) -> String {
    let mut mac = new_mac(secret);
    mac.update(body);
    format!("{:x}", mac.finalize().into_bytes())
}

/// Check `signature` (hex) against the HMAC-SHA512 of `body`.
///
/// The comparison is constant-time. Malformed hex never matches.
pub fn verify_webhook_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Some(expected) = decode_hex(signature.trim()) else {
        return false;
    };
    let mut mac = new_mac(secret);
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

fn new_mac(secret: &str) -> HmacSha512 {
    HmacSha512::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length")
}

/// Decode a hex string; `None` on odd length or non-hex characters.
fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| s.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()))
        .collect()
}
