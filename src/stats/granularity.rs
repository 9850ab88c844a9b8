//! Chart bucketing granularity.
//!
//! Buckets are daily, monthly or yearly. When the request does not pick one
//! explicitly, the window's day span decides: short windows get daily
//! buckets, up to a year gets monthly, anything longer (including unbounded
//! windows) gets yearly.

use super::error::StatsError;
use chrono::{Months, NaiveDate};

/// Hard cap on chart series length. When more buckets result, the most
/// recent ones win.
pub const MAX_CHART_POINTS: usize = 366;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Daily,
    Monthly,
    Yearly,
}

impl Granularity {
    pub fn parse(value: &str) -> Result<Self, StatsError> {
        match value {
            "daily" => Ok(Granularity::Daily),
            "monthly" => Ok(Granularity::Monthly),
            "yearly" => Ok(Granularity::Yearly),
            other => Err(StatsError::InvalidGranularity {
                provided: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Monthly => "monthly",
            Granularity::Yearly => "yearly",
        }
    }

    /// SQLite strftime format producing the bucket key.
    pub fn strftime_format(&self) -> &'static str {
        match self {
            Granularity::Daily => "%Y-%m-%d",
            Granularity::Monthly => "%Y-%m",
            Granularity::Yearly => "%Y",
        }
    }

    /// Span-based auto-selection. `None` means no lower bound, treated as a
    /// very large span.
    pub fn auto(span_days: Option<i64>) -> Self {
        match span_days {
            Some(span) if span <= 31 => Granularity::Daily,
            Some(span) if span <= 365 => Granularity::Monthly,
            _ => Granularity::Yearly,
        }
    }

    pub fn effective(explicit: Option<Granularity>, span_days: Option<i64>) -> Self {
        explicit.unwrap_or_else(|| Granularity::auto(span_days))
    }

    /// Inclusive calendar boundaries of the bucket named by `key`.
    /// `None` when the key does not match this granularity's format.
    pub fn bucket_bounds(&self, key: &str) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            Granularity::Daily => {
                let day = NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()?;
                Some((day, day))
            }
            Granularity::Monthly => {
                let first = NaiveDate::parse_from_str(&format!("{}-01", key), "%Y-%m-%d").ok()?;
                let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
                Some((first, last))
            }
            Granularity::Yearly => {
                let year: i32 = key.parse().ok()?;
                Some((
                    NaiveDate::from_ymd_opt(year, 1, 1)?,
                    NaiveDate::from_ymd_opt(year, 12, 31)?,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse() {
        assert_eq!(Granularity::parse("daily").unwrap(), Granularity::Daily);
        assert_eq!(Granularity::parse("monthly").unwrap(), Granularity::Monthly);
        assert_eq!(Granularity::parse("yearly").unwrap(), Granularity::Yearly);
        assert!(matches!(
            Granularity::parse("weekly"),
            Err(StatsError::InvalidGranularity { .. })
        ));
    }

    #[test]
    fn test_auto_selection_boundaries() {
        assert_eq!(Granularity::auto(Some(1)), Granularity::Daily);
        assert_eq!(Granularity::auto(Some(31)), Granularity::Daily);
        assert_eq!(Granularity::auto(Some(32)), Granularity::Monthly);
        assert_eq!(Granularity::auto(Some(365)), Granularity::Monthly);
        assert_eq!(Granularity::auto(Some(366)), Granularity::Yearly);
        assert_eq!(Granularity::auto(None), Granularity::Yearly);
    }

    #[test]
    fn test_effective_prefers_explicit() {
        assert_eq!(
            Granularity::effective(Some(Granularity::Yearly), Some(5)),
            Granularity::Yearly
        );
        assert_eq!(Granularity::effective(None, Some(5)), Granularity::Daily);
    }

    #[test]
    fn test_daily_bounds() {
        assert_eq!(
            Granularity::Daily.bucket_bounds("2024-02-29"),
            Some((date(2024, 2, 29), date(2024, 2, 29)))
        );
    }

    #[test]
    fn test_monthly_bounds_month_lengths() {
        assert_eq!(
            Granularity::Monthly.bucket_bounds("2024-01"),
            Some((date(2024, 1, 1), date(2024, 1, 31)))
        );
        // Leap February
        assert_eq!(
            Granularity::Monthly.bucket_bounds("2024-02"),
            Some((date(2024, 2, 1), date(2024, 2, 29)))
        );
        assert_eq!(
            Granularity::Monthly.bucket_bounds("2023-02"),
            Some((date(2023, 2, 1), date(2023, 2, 28)))
        );
        assert_eq!(
            Granularity::Monthly.bucket_bounds("2023-12"),
            Some((date(2023, 12, 1), date(2023, 12, 31)))
        );
    }

    #[test]
    fn test_yearly_bounds() {
        assert_eq!(
            Granularity::Yearly.bucket_bounds("2022"),
            Some((date(2022, 1, 1), date(2022, 12, 31)))
        );
    }

    #[test]
    fn test_malformed_keys_yield_none() {
        assert!(Granularity::Daily.bucket_bounds("2024-02").is_none());
        assert!(Granularity::Monthly.bucket_bounds("not-a-month").is_none());
        assert!(Granularity::Yearly.bucket_bounds("20x4").is_none());
    }
}
