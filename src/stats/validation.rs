//! Parameter validators for the stats endpoints.
//!
//! Each validator takes the raw query value and returns the validated value
//! or a taxonomy error. Handlers run them all before touching the store.

use super::error::StatsError;
use super::granularity::Granularity;

pub const TOP_LIMIT_DEFAULT: u32 = 10;
pub const TOP_LIMIT_MAX: u32 = 100;
pub const RECENT_LIMIT_DEFAULT: u32 = 10;
pub const RECENT_LIMIT_MAX: u32 = 50;
pub const PAGE_MAX: u32 = 1_000_000;

/// Validate an integer bound to [min, max], defaulting when absent.
/// A non-numeric value fails the same way as an out-of-range one.
pub fn validate_bounded(
    raw: Option<&str>,
    parameter: &str,
    default: u32,
    min: u32,
    max: u32,
) -> Result<u32, StatsError> {
    let raw = match raw {
        Some(raw) => raw,
        None => return Ok(default),
    };
    let out_of_range = || StatsError::InvalidLimit {
        parameter: parameter.to_string(),
        provided: raw.to_string(),
        min,
        max,
    };
    let value: u32 = raw.parse().map_err(|_| out_of_range())?;
    if value < min || value > max {
        return Err(out_of_range());
    }
    Ok(value)
}

pub fn validate_top_limit(raw: Option<&str>) -> Result<u32, StatsError> {
    validate_bounded(raw, "limit", TOP_LIMIT_DEFAULT, 1, TOP_LIMIT_MAX)
}

pub fn validate_recent_limit(raw: Option<&str>) -> Result<u32, StatsError> {
    validate_bounded(raw, "limit", RECENT_LIMIT_DEFAULT, 1, RECENT_LIMIT_MAX)
}

pub fn validate_page(raw: Option<&str>) -> Result<u32, StatsError> {
    validate_bounded(raw, "page", 1, 1, PAGE_MAX)
}

/// Explicit granularity must be one of the known values; absent is fine.
pub fn validate_granularity(raw: Option<&str>) -> Result<Option<Granularity>, StatsError> {
    raw.map(Granularity::parse).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_defaults_when_absent() {
        assert_eq!(validate_top_limit(None).unwrap(), 10);
        assert_eq!(validate_recent_limit(None).unwrap(), 10);
        assert_eq!(validate_page(None).unwrap(), 1);
    }

    #[test]
    fn test_limit_bounds() {
        assert_eq!(validate_top_limit(Some("1")).unwrap(), 1);
        assert_eq!(validate_top_limit(Some("100")).unwrap(), 100);
        assert!(validate_top_limit(Some("0")).is_err());
        assert!(validate_top_limit(Some("101")).is_err());

        assert_eq!(validate_recent_limit(Some("50")).unwrap(), 50);
        assert!(validate_recent_limit(Some("51")).is_err());
    }

    #[test]
    fn test_non_numeric_limit_is_invalid() {
        let err = validate_top_limit(Some("ten")).unwrap_err();
        assert!(matches!(
            err,
            StatsError::InvalidLimit { ref parameter, ref provided, .. }
                if parameter == "limit" && provided == "ten"
        ));
        assert!(validate_top_limit(Some("-3")).is_err());
    }

    #[test]
    fn test_page_must_be_positive() {
        assert_eq!(validate_page(Some("3")).unwrap(), 3);
        let err = validate_page(Some("0")).unwrap_err();
        assert!(matches!(
            err,
            StatsError::InvalidLimit { ref parameter, .. } if parameter == "page"
        ));
    }

    #[test]
    fn test_granularity_optional() {
        assert_eq!(validate_granularity(None).unwrap(), None);
        assert_eq!(
            validate_granularity(Some("daily")).unwrap(),
            Some(Granularity::Daily)
        );
        assert!(validate_granularity(Some("hourly")).is_err());
    }
}
