//! Listing limit resolution.

use std::num::IntErrorKind;

use linetrace_protocol::constants::{DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT};

/// Default and maximum page size for command listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitPolicy {
    pub default: usize,
    pub max: usize,
}

impl Default for LimitPolicy {
    fn default() -> Self {
        Self {
            default: DEFAULT_LOG_LIMIT,
            max: MAX_LOG_LIMIT,
        }
    }
}

impl LimitPolicy {
    /// Missing, zero or negative requests fall back to the default; requests
    /// above the maximum are clamped to it.
    pub fn resolve(&self, requested: Option<i64>) -> usize {
        match requested {
            Some(n) if n > 0 => usize::try_from(n).map_or(self.max, |n| n.min(self.max)),
            _ => self.default,
        }
    }
}

/// Parse a raw `limit` query value.
///
/// Values too large for an `i64` saturate so they still clamp to the maximum
/// instead of being treated as unparsable.
pub fn parse_limit(raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(n) => Some(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_limit(requested: Option<i64>) -> usize {
        LimitPolicy::default().resolve(requested)
    }

    #[test]
    fn invalid_requests_use_default() {
        assert_eq!(resolve_limit(None), 20);
        assert_eq!(resolve_limit(Some(0)), 20);
        assert_eq!(resolve_limit(Some(-5)), 20);
        assert_eq!(resolve_limit(Some(i64::MIN)), 20);
    }

    #[test]
    fn oversized_requests_clamp_to_max() {
        assert_eq!(resolve_limit(Some(500)), 100);
        assert_eq!(resolve_limit(Some(i64::MAX)), 100);
    }

    #[test]
    fn in_range_requests_pass_through() {
        assert_eq!(resolve_limit(Some(1)), 1);
        assert_eq!(resolve_limit(Some(100)), 100);
        assert_eq!(resolve_limit(Some(37)), 37);
    }

    #[test]
    fn custom_policy() {
        let policy = LimitPolicy { default: 5, max: 8 };
        assert_eq!(policy.resolve(Some(-1)), 5);
        assert_eq!(policy.resolve(Some(9)), 8);
        assert_eq!(policy.resolve(Some(6)), 6);
    }

    #[test]
    fn parse_limit_accepts_integers() {
        assert_eq!(parse_limit("25"), Some(25));
        assert_eq!(parse_limit(" 7 "), Some(7));
        assert_eq!(parse_limit("-3"), Some(-3));
    }

    #[test]
    fn parse_limit_rejects_non_numeric() {
        assert_eq!(parse_limit("abc"), None);
        assert_eq!(parse_limit(""), None);
        assert_eq!(parse_limit("2.5"), None);
    }

    #[test]
    fn overflowing_limits_saturate() {
        assert_eq!(parse_limit("99999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_limit("-99999999999999999999"), Some(i64::MIN));
        assert_eq!(resolve_limit(parse_limit("99999999999999999999")), 100);
        assert_eq!(resolve_limit(parse_limit("-99999999999999999999")), 20);
    }
}
