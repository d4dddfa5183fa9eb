//! Currency amounts and minor-unit conversion.
//!
//! Amounts are stored and sent to the payment gateway as integer minor units
//! (kobo, cents, pesewas). The API accepts and returns major units.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minor units per major unit for every supported currency.
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Largest single donation accepted, in major units.
pub const MAX_DONATION_MAJOR: f64 = 10_000_000.0;

/// Currency used when the client does not specify one.
pub const DEFAULT_CURRENCY: &str = "NGN";

/// Currencies the payment gateway settles for this platform.
pub const SUPPORTED_CURRENCIES: &[&str] = &["NGN", "USD", "GHS", "ZAR", "KES"];

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Convert a major-unit amount into minor units (x100), rounding to the
/// nearest minor unit.
///
/// Rejects non-finite, zero, negative and oversized amounts.
pub fn to_minor_units(major: f64) -> Result<i64, CoreError> {
    if !major.is_finite() {
        return Err(CoreError::Validation(
            "Amount must be a finite number".to_string(),
        ));
    }
    if major <= 0.0 {
        return Err(CoreError::Validation(
            "Amount must be greater than zero".to_string(),
        ));
    }
    if major > MAX_DONATION_MAJOR {
        return Err(CoreError::Validation(format!(
            "Amount must not exceed {MAX_DONATION_MAJOR}"
        )));
    }

    let minor = (major * MINOR_UNITS_PER_MAJOR as f64).round() as i64;
    if minor < 1 {
        return Err(CoreError::Validation(
            "Amount is smaller than the currency's minor unit".to_string(),
        ));
    }
    Ok(minor)
}

/// Convert minor units back into a major-unit amount (/100).
pub fn from_minor_units(minor: i64) -> f64 {
    minor as f64 / MINOR_UNITS_PER_MAJOR as f64
}

/// Validate an ISO 4217 currency code against [`SUPPORTED_CURRENCIES`].
pub fn validate_currency(code: &str) -> Result<(), CoreError> {
    if SUPPORTED_CURRENCIES.contains(&code) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unsupported currency '{code}'. Must be one of: {}",
            SUPPORTED_CURRENCIES.join(", ")
        )))
    }
}

/// Percentage of `goal_minor` covered by `raised_minor`, clamped to 0..=100.
///
/// A cause without a positive goal reports 0.
pub fn progress_percent(raised_minor: i64, goal_minor: i64) -> f64 {
    if goal_minor <= 0 {
        return 0.0;
    }
    let pct = raised_minor as f64 / goal_minor as f64 * 100.0;
    pct.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_major_to_minor() {
        assert_eq!(to_minor_units(5000.0).unwrap(), 500_000);
        assert_eq!(to_minor_units(12.34).unwrap(), 1234);
        assert_eq!(to_minor_units(0.01).unwrap(), 1);
    }

    #[test]
    fn test_rounds_floating_point_noise() {
        // 19.99 * 100 is 1998.9999999999998 in binary floating point.
        assert_eq!(to_minor_units(19.99).unwrap(), 1999);
    }

    #[test]
    fn test_rejects_invalid_amounts() {
        assert!(to_minor_units(0.0).is_err());
        assert!(to_minor_units(-5.0).is_err());
        assert!(to_minor_units(f64::NAN).is_err());
        assert!(to_minor_units(f64::INFINITY).is_err());
        assert!(to_minor_units(MAX_DONATION_MAJOR + 1.0).is_err());
        assert!(to_minor_units(0.001).is_err());
    }

    #[test]
    fn test_converts_minor_back_to_major() {
        assert_eq!(from_minor_units(500_000), 5000.0);
        assert_eq!(from_minor_units(1234), 12.34);
    }

    #[test]
    fn test_currency_validation() {
        assert!(validate_currency("NGN").is_ok());
        assert!(validate_currency("USD").is_ok());
        let err = validate_currency("ngn").unwrap_err();
        assert!(err.to_string().contains("Unsupported currency"));
        assert!(validate_currency("EUR").is_err());
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(progress_percent(50, 200), 25.0);
        assert_eq!(progress_percent(500, 200), 100.0);
        assert_eq!(progress_percent(10, 0), 0.0);
        assert_eq!(progress_percent(0, 1000), 0.0);
    }
}
