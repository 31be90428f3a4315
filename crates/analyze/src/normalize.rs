//! Snapshot normalization -- chronological ordering of caller input.
//!
//! Callers may submit snapshots in any order. Everything downstream
//! indexes timelines by position, so ordering is fixed here, once, before
//! any alignment runs.

use croptrail_core::Snapshot;
use std::cmp::Ordering;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// Minimum number of snapshots an analysis needs.
pub const MIN_SNAPSHOTS: usize = 2;

/// Fatal errors that abort an analysis run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// Fewer than [`MIN_SNAPSHOTS`] snapshots were supplied.
    #[error("at least 2 snapshots are required for a time series analysis, got {supplied}")]
    InsufficientSnapshots { supplied: usize },
}

/// Parse a snapshot time value.
///
/// Accepts RFC 3339 date-times, `YYYY-MM-DD HH:MM:SS` (taken as UTC), and
/// plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_time(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();
    if let Ok(dt) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(dt);
    }
    if let Ok(dt) = PrimitiveDateTime::parse(
        value,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Some(dt.assume_utc());
    }
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}

/// The parsed ordering time of a snapshot, if it has a usable one.
pub fn snapshot_time(snapshot: &Snapshot) -> Option<OffsetDateTime> {
    snapshot.time_value().and_then(parse_time)
}

/// Order snapshots chronologically.
///
/// The sort is stable: snapshots with equal times keep their input order.
/// Snapshots without a usable time share one rank after every timed
/// snapshot, again in input order. The inputs are not modified.
pub fn normalize(snapshots: &[Snapshot]) -> Result<Vec<Snapshot>, AnalysisError> {
    if snapshots.len() < MIN_SNAPSHOTS {
        return Err(AnalysisError::InsufficientSnapshots {
            supplied: snapshots.len(),
        });
    }

    let mut keyed: Vec<(Option<OffsetDateTime>, &Snapshot)> =
        snapshots.iter().map(|s| (snapshot_time(s), s)).collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let untimed = keyed.iter().filter(|(t, _)| t.is_none()).count();
    if untimed > 0 {
        tracing::warn!(
            target: "croptrail::normalize",
            untimed,
            total = snapshots.len(),
            "snapshots without a usable time keep input order after timed ones"
        );
    }

    let ordered: Vec<Snapshot> = keyed.into_iter().map(|(_, s)| s.clone()).collect();
    tracing::debug!(
        target: "croptrail::normalize",
        order = ?ordered.iter().enumerate().map(|(i, s)| s.display_label(i)).collect::<Vec<_>>(),
        "snapshots.ordered"
    );

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(label: &str, time: Option<&str>) -> Snapshot {
        let s = Snapshot::new(vec![]).with_label(label);
        match time {
            Some(t) => s.with_time(t),
            None => s,
        }
    }

    fn labels(snaps: &[Snapshot]) -> Vec<String> {
        snaps.iter().map(|s| s.label.clone().unwrap_or_default()).collect()
    }

    #[test]
    fn test_parse_time_formats() {
        assert!(parse_time("2023-06-01T10:00:00Z").is_some());
        assert!(parse_time("2023-06-01T10:00:00+08:00").is_some());
        assert!(parse_time("2023-06-01 10:00:00").is_some());
        assert!(parse_time("2023-06-01").is_some());
        assert!(parse_time("June 2023").is_none());
        assert!(parse_time("").is_none());
    }

    #[test]
    fn test_parse_time_respects_offsets() {
        let utc = parse_time("2023-06-01T02:00:00Z").unwrap();
        let shanghai = parse_time("2023-06-01T10:00:00+08:00").unwrap();
        assert_eq!(utc, shanghai);
    }

    #[test]
    fn test_fewer_than_two_snapshots() {
        assert_eq!(
            normalize(&[]).unwrap_err(),
            AnalysisError::InsufficientSnapshots { supplied: 0 }
        );
        assert_eq!(
            normalize(&[snap("a", Some("2023-01-01"))]).unwrap_err(),
            AnalysisError::InsufficientSnapshots { supplied: 1 }
        );
    }

    #[test]
    fn test_sorts_ascending_by_time() {
        let input = vec![
            snap("c", Some("2023-09-01")),
            snap("a", Some("2021-09-01")),
            snap("b", Some("2022-09-01T12:00:00Z")),
        ];
        let ordered = normalize(&input).unwrap();
        assert_eq!(labels(&ordered), vec!["a", "b", "c"]);
        // Input untouched
        assert_eq!(labels(&input), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_equal_times_keep_input_order() {
        let input = vec![
            snap("second", Some("2023-01-01")),
            snap("first", Some("2022-01-01")),
            snap("third", Some("2023-01-01")),
        ];
        let ordered = normalize(&input).unwrap();
        assert_eq!(labels(&ordered), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_untimed_sort_last_in_input_order() {
        let input = vec![
            snap("x", None),
            snap("late", Some("2024-01-01")),
            snap("y", Some("not a date")),
            snap("early", Some("2020-01-01")),
        ];
        let ordered = normalize(&input).unwrap();
        assert_eq!(labels(&ordered), vec!["early", "late", "x", "y"]);
    }

    #[test]
    fn test_created_at_used_as_fallback() {
        let input = vec![
            Snapshot::new(vec![])
                .with_label("b")
                .with_created_at("2023-05-01 08:00:00"),
            snap("a", Some("2023-04-01")),
        ];
        let ordered = normalize(&input).unwrap();
        assert_eq!(labels(&ordered), vec!["a", "b"]);
    }
}
