//! Time-window resolution for the stats endpoints.
//!
//! Requests select a window either by a named relative period (`7d`, `30d`,
//! `90d`, `180d`, `365d`, `all`) or by explicit `from_date`/`to_date`
//! calendar dates. Explicit dates take precedence over the period entirely.
//! An unrecognized period silently falls back to `all`; malformed explicit
//! dates are a hard error. That asymmetry is longstanding observable
//! behavior and must not change.

use super::error::StatsError;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// A resolved time predicate over scrobble timestamps.
/// Upper bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Unbounded,
    Since(DateTime<Utc>),
    Until(DateTime<Utc>),
    Range {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

/// A window plus its request-facing display string and day span.
/// `span_days` is `None` when the window has no lower bound, which reads as
/// a very large span for granularity auto-selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWindow {
    pub window: TimeWindow,
    pub display: String,
    pub span_days: Option<i64>,
}

const DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_date(parameter: &str, value: &str) -> Result<NaiveDate, StatsError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| StatsError::InvalidDateFormat {
        parameter: parameter.to_string(),
        provided: value.to_string(),
    })
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Resolve `period`/`from_date`/`to_date` parameters into a window.
///
/// `now` is passed in so callers and tests control the reference instant.
pub fn resolve_window(
    period: Option<&str>,
    from_date: Option<&str>,
    to_date: Option<&str>,
    now: DateTime<Utc>,
) -> Result<ResolvedWindow, StatsError> {
    if from_date.is_some() || to_date.is_some() {
        return resolve_explicit(from_date, to_date, now);
    }

    let period = period.unwrap_or("all");
    let days = match period {
        "7d" => Some(7),
        "30d" => Some(30),
        "90d" => Some(90),
        "180d" => Some(180),
        "365d" => Some(365),
        // "all" and anything unrecognized
        _ => None,
    };

    Ok(match days {
        Some(days) => ResolvedWindow {
            window: TimeWindow::Since(now - Duration::days(days)),
            display: period.to_string(),
            span_days: Some(days),
        },
        None => ResolvedWindow {
            window: TimeWindow::Unbounded,
            display: period.to_string(),
            span_days: None,
        },
    })
}

fn resolve_explicit(
    from_date: Option<&str>,
    to_date: Option<&str>,
    now: DateTime<Utc>,
) -> Result<ResolvedWindow, StatsError> {
    let from = from_date
        .map(|value| parse_date("from_date", value))
        .transpose()?;
    let to = to_date
        .map(|value| parse_date("to_date", value))
        .transpose()?;

    match (from, to) {
        (Some(from), Some(to)) => {
            if from > to {
                return Err(StatsError::InvalidDateRange {
                    from: from.format(DATE_FORMAT).to_string(),
                    to: to.format(DATE_FORMAT).to_string(),
                });
            }
            Ok(ResolvedWindow {
                window: TimeWindow::Range {
                    from: start_of_day(from),
                    // inclusive of the whole end day
                    to: start_of_day(to) + Duration::days(1),
                },
                display: format!("{} to {}", from.format(DATE_FORMAT), to.format(DATE_FORMAT)),
                span_days: Some((to - from).num_days() + 1),
            })
        }
        (Some(from), None) => Ok(ResolvedWindow {
            window: TimeWindow::Since(start_of_day(from)),
            display: format!("from {}", from.format(DATE_FORMAT)),
            span_days: Some((now.date_naive() - from).num_days() + 1),
        }),
        (None, Some(to)) => Ok(ResolvedWindow {
            window: TimeWindow::Until(start_of_day(to) + Duration::days(1)),
            display: format!("until {}", to.format(DATE_FORMAT)),
            span_days: None,
        }),
        (None, None) => unreachable!("resolve_explicit requires at least one date"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_named_periods() {
        for (period, days) in [("7d", 7), ("30d", 30), ("90d", 90), ("180d", 180), ("365d", 365)] {
            let resolved = resolve_window(Some(period), None, None, now()).unwrap();
            assert_eq!(
                resolved.window,
                TimeWindow::Since(now() - Duration::days(days)),
                "period {}",
                period
            );
            assert_eq!(resolved.display, period);
            assert_eq!(resolved.span_days, Some(days));
        }
    }

    #[test]
    fn test_all_and_absent_period_are_unbounded() {
        let all = resolve_window(Some("all"), None, None, now()).unwrap();
        assert_eq!(all.window, TimeWindow::Unbounded);
        assert_eq!(all.display, "all");
        assert_eq!(all.span_days, None);

        let absent = resolve_window(None, None, None, now()).unwrap();
        assert_eq!(absent.window, TimeWindow::Unbounded);
        assert_eq!(absent.display, "all");
    }

    #[test]
    fn test_unrecognized_period_silently_falls_back_to_all() {
        let resolved = resolve_window(Some("2w"), None, None, now()).unwrap();
        assert_eq!(resolved.window, TimeWindow::Unbounded);
        assert_eq!(resolved.display, "2w");
        assert_eq!(resolved.span_days, None);
    }

    #[test]
    fn test_explicit_range_end_day_inclusive() {
        let resolved =
            resolve_window(None, Some("2024-01-01"), Some("2024-01-31"), now()).unwrap();
        assert_eq!(
            resolved.window,
            TimeWindow::Range {
                from: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                to: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            }
        );
        assert_eq!(resolved.display, "2024-01-01 to 2024-01-31");
        assert_eq!(resolved.span_days, Some(31));
    }

    #[test]
    fn test_explicit_dates_take_precedence_over_period() {
        let resolved =
            resolve_window(Some("7d"), Some("2024-01-01"), Some("2024-01-02"), now()).unwrap();
        assert!(matches!(resolved.window, TimeWindow::Range { .. }));
    }

    #[test]
    fn test_single_day_range() {
        let resolved =
            resolve_window(None, Some("2024-03-05"), Some("2024-03-05"), now()).unwrap();
        assert_eq!(resolved.span_days, Some(1));
        assert_eq!(
            resolved.window,
            TimeWindow::Range {
                from: Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap(),
                to: Utc.with_ymd_and_hms(2024, 3, 6, 0, 0, 0).unwrap(),
            }
        );
    }

    #[test]
    fn test_from_only() {
        let resolved = resolve_window(None, Some("2024-06-01"), None, now()).unwrap();
        assert_eq!(
            resolved.window,
            TimeWindow::Since(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(resolved.display, "from 2024-06-01");
        assert_eq!(resolved.span_days, Some(15));
    }

    #[test]
    fn test_to_only() {
        let resolved = resolve_window(None, None, Some("2024-06-01"), now()).unwrap();
        assert_eq!(
            resolved.window,
            TimeWindow::Until(Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(resolved.display, "until 2024-06-01");
        assert_eq!(resolved.span_days, None);
    }

    #[test]
    fn test_malformed_dates_are_errors() {
        let bad_from = resolve_window(None, Some("01/02/2024"), None, now());
        assert!(matches!(
            bad_from,
            Err(StatsError::InvalidDateFormat { ref parameter, .. }) if parameter == "from_date"
        ));

        let bad_to = resolve_window(None, Some("2024-01-01"), Some("2024-13-01"), now());
        assert!(matches!(
            bad_to,
            Err(StatsError::InvalidDateFormat { ref parameter, .. }) if parameter == "to_date"
        ));
    }

    #[test]
    fn test_inverted_range_is_error() {
        let result = resolve_window(None, Some("2024-02-01"), Some("2024-01-01"), now());
        assert!(matches!(result, Err(StatsError::InvalidDateRange { .. })));
    }
}
