//! Building blocks for the aggregation SQL.
//!
//! Every aggregation query filters scrobbles by an optional time window and
//! an optional entity scope. This module turns both into WHERE fragments and
//! bound parameters so the queries in `store.rs` stay single statements with
//! the join fetching display fields up front.
//!
//! Fragments assume the standard aliases: `s` for scrobbles, `t` for the
//! joined tracks table.

use super::trait_def::Scope;
use crate::stats::TimeWindow;

/// Accumulates WHERE clauses and their bound values.
#[derive(Debug, Default)]
pub(crate) struct Predicates {
    clauses: Vec<String>,
    params: Vec<i64>,
}

impl Predicates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn window(mut self, window: &TimeWindow) -> Self {
        match window {
            TimeWindow::Unbounded => {}
            TimeWindow::Since(from) => {
                self.clauses.push("s.timestamp >= ?".to_string());
                self.params.push(from.timestamp());
            }
            TimeWindow::Until(to) => {
                self.clauses.push("s.timestamp < ?".to_string());
                self.params.push(to.timestamp());
            }
            TimeWindow::Range { from, to } => {
                self.clauses.push("s.timestamp >= ?".to_string());
                self.params.push(from.timestamp());
                self.clauses.push("s.timestamp < ?".to_string());
                self.params.push(to.timestamp());
            }
        }
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        match scope {
            Scope::All => {}
            Scope::Artist(id) => {
                self.clauses.push("t.artist_id = ?".to_string());
                self.params.push(id);
            }
            Scope::Album(id) => {
                self.clauses.push("t.album_id = ?".to_string());
                self.params.push(id);
            }
            Scope::Track(id) => {
                self.clauses.push("s.track_id = ?".to_string());
                self.params.push(id);
            }
        }
        self
    }

    /// A raw fragment with its bound value, for per-query extras.
    pub fn raw(mut self, clause: &str, value: i64) -> Self {
        self.clauses.push(clause.to_string());
        self.params.push(value);
        self
    }

    /// `WHERE a AND b` or the empty string when nothing accumulated.
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// `a AND b` without the keyword, for use inside a join's ON clause.
    pub fn and_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("AND {}", self.clauses.join(" AND "))
        }
    }

    /// Bound values in clause order, with any trailing extras appended.
    pub fn into_params(self, extra: &[i64]) -> Vec<i64> {
        let mut params = self.params;
        params.extend_from_slice(extra);
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_unbounded_all_is_empty() {
        let p = Predicates::new()
            .window(&TimeWindow::Unbounded)
            .scope(Scope::All);
        assert_eq!(p.where_sql(), "");
        assert_eq!(p.and_sql(), "");
        assert!(p.into_params(&[]).is_empty());
    }

    #[test]
    fn test_since_window() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let p = Predicates::new().window(&TimeWindow::Since(from));
        assert_eq!(p.where_sql(), "WHERE s.timestamp >= ?");
        assert_eq!(p.into_params(&[]), vec![from.timestamp()]);
    }

    #[test]
    fn test_range_window_with_scope() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let p = Predicates::new()
            .window(&TimeWindow::Range { from, to })
            .scope(Scope::Artist(7));
        assert_eq!(
            p.where_sql(),
            "WHERE s.timestamp >= ? AND s.timestamp < ? AND t.artist_id = ?"
        );
        assert_eq!(
            p.into_params(&[10]),
            vec![from.timestamp(), to.timestamp(), 7, 10]
        );
    }

    #[test]
    fn test_until_window_is_exclusive_upper_bound() {
        let to = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let p = Predicates::new().window(&TimeWindow::Until(to));
        assert_eq!(p.where_sql(), "WHERE s.timestamp < ?");
    }

    #[test]
    fn test_and_sql_for_join_clause() {
        let p = Predicates::new().scope(Scope::Track(3));
        assert_eq!(p.and_sql(), "AND s.track_id = ?");
    }
}
