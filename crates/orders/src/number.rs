//! Human-readable order number assignment.
//!
//! Numbers have the fixed shape `ST-ORD-YYYYMM-NNNN`: a month prefix taken
//! from the creation timestamp and a 4-digit, 1-based sequence counted among
//! all orders sharing that month prefix. Sequence slots are counted at
//! creation time and never reused on cancellation.

use chrono::{DateTime, Utc};

use storders_core::DomainError;

/// Prefix shared by every order number.
pub const NUMBER_PREFIX: &str = "ST-ORD-";

/// Highest sequence the fixed-width 4-digit suffix can carry per month.
pub const MAX_MONTHLY_SEQUENCE: i64 = 9999;

/// Month prefix for numbers assigned at `at`: `ST-ORD-YYYYMM-`.
pub fn month_prefix(at: DateTime<Utc>) -> String {
    format!("{NUMBER_PREFIX}{}-", at.format("%Y%m"))
}

/// Format the next number under `prefix`, given the count of numbers already
/// carrying that prefix.
///
/// This only formats; the count and the subsequent insert must share one
/// serializing transaction scope so concurrent creations cannot observe the
/// same count. Exhausting the 4-digit space is an error, not a truncation.
pub fn assign(prefix: &str, existing: i64) -> Result<String, DomainError> {
    let seq = existing + 1;
    if seq > MAX_MONTHLY_SEQUENCE {
        return Err(DomainError::invariant(format!(
            "order number sequence exhausted for prefix {prefix}"
        )));
    }
    Ok(format!("{prefix}{seq:04}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn month_prefix_uses_creation_year_and_month() {
        let at = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
        assert_eq!(month_prefix(at), "ST-ORD-202608-");
    }

    #[test]
    fn sequence_is_one_based_and_zero_padded() {
        assert_eq!(assign("ST-ORD-202608-", 0).unwrap(), "ST-ORD-202608-0001");
        assert_eq!(assign("ST-ORD-202608-", 41).unwrap(), "ST-ORD-202608-0042");
        assert_eq!(assign("ST-ORD-202608-", 9998).unwrap(), "ST-ORD-202608-9999");
    }

    #[test]
    fn sequence_overflow_is_an_error() {
        let err = assign("ST-ORD-202608-", 9999).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }
}
