//! Merge & gap-fill engine.
//!
//! Combines normalized rows from several series into one time-descending
//! sequence and forward-fills missing metrics from the most recently seen
//! value. "Most recently" is in traversal order: the sequence runs newest to
//! oldest, and a missing metric takes the value last seen at an equal-or-later
//! timestamp. Nothing is ever filled from an older row, and a metric with no
//! value anywhere in the window stays null on every row.
//!
//! The fill is two explicit passes over the same ordered sequence, with the
//! running "last known values" threaded as a plain value so each pass is pure
//! and testable on its own.

use crate::services::series::{Metric, MetricValues, ReportRow};

/// Concatenate per-series row groups and sort newest-first.
///
/// The sort is stable, so rows sharing an exact timestamp keep their
/// concatenation order. That tie order is implementation-defined; callers
/// must not rely on it.
pub fn merge_series(groups: Vec<Vec<ReportRow>>) -> Vec<ReportRow> {
    let mut merged: Vec<ReportRow> = groups.into_iter().flatten().collect();
    merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    merged
}

/// First pass: the most recent non-null value of each metric in a
/// newest-first sequence.
///
/// This is the "latest known truth" snapshot; the dashboard-style latest
/// lookups and the fill's tests both use it.
pub fn seed_latest_values(rows: &[ReportRow]) -> MetricValues {
    let mut latest = MetricValues::default();
    for row in rows {
        for metric in Metric::ALL {
            if latest.get(metric).is_none() {
                if let Some(value) = row.values.get(metric) {
                    latest.set(metric, Some(value.to_string()));
                }
            }
        }
    }
    latest
}

/// Second pass: fill missing metrics from the last value seen so far.
///
/// For each row, a metric's own value (when present) updates the running
/// state *before* any slot of that row is read, so within one row a present
/// metric always reports itself and an absent one never picks up anything
/// older than the row. The running state starts empty: the newest rows stay
/// null until their metric first appears in the traversal.
pub fn gap_fill(rows: Vec<ReportRow>) -> Vec<ReportRow> {
    let (filled, _last) = rows.into_iter().fold(
        (Vec::new(), MetricValues::default()),
        |(mut out, mut last), mut row| {
            for metric in Metric::ALL {
                match row.values.get(metric) {
                    Some(value) => last.set(metric, Some(value.to_string())),
                    None => row
                        .values
                        .set(metric, last.get(metric).map(str::to_string)),
                }
            }
            out.push(row);
            (out, last)
        },
    );
    filled
}

/// Merge and fill in one step; the shape every multi-series report uses.
pub fn merge_and_fill(groups: Vec<Vec<ReportRow>>) -> Vec<ReportRow> {
    gap_fill(merge_series(groups))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time::parse_bound;
    use chrono::{DateTime, Utc};

    fn ts(hour: u32) -> DateTime<Utc> {
        parse_bound(&format!("2024-06-10 {hour:02}:00:00")).expect("test timestamp")
    }

    fn row(id: i64, hour: u32, values: MetricValues) -> ReportRow {
        ReportRow {
            id,
            created_at: ts(hour),
            values,
        }
    }

    fn with(pairs: &[(Metric, &str)]) -> MetricValues {
        let mut values = MetricValues::default();
        for (metric, value) in pairs {
            values.set(*metric, Some(value.to_string()));
        }
        values
    }

    #[test]
    fn merge_sorts_descending_across_series() {
        let a = vec![row(1, 12, with(&[])), row(2, 8, with(&[]))];
        let b = vec![row(3, 10, with(&[]))];
        let merged = merge_series(vec![a, b]);
        let hours: Vec<i64> = merged.iter().map(|r| r.id).collect();
        assert_eq!(hours, vec![1, 3, 2]);
    }

    #[test]
    fn fill_carries_values_newest_to_oldest_only() {
        // Series A: metric Laeq only at t=10 (5.00).
        // Series B: metric L10 at t=12 (2.00) and t=8 (1.00).
        let a = vec![row(1, 10, with(&[(Metric::Laeq, "5.00")]))];
        let b = vec![
            row(2, 12, with(&[(Metric::L10, "2.00")])),
            row(3, 8, with(&[(Metric::L10, "1.00")])),
        ];
        let filled = merge_and_fill(vec![a, b]);
        assert_eq!(filled.len(), 3);

        // t=12: Laeq has not been seen yet, stays null.
        assert_eq!(filled[0].created_at, ts(12));
        assert_eq!(filled[0].values.get(Metric::Laeq), None);
        assert_eq!(filled[0].values.get(Metric::L10), Some("2.00"));

        // t=10: own Laeq, L10 filled from t=12.
        assert_eq!(filled[1].created_at, ts(10));
        assert_eq!(filled[1].values.get(Metric::Laeq), Some("5.00"));
        assert_eq!(filled[1].values.get(Metric::L10), Some("2.00"));

        // t=8: Laeq filled from t=10, own L10 wins over the carried value.
        assert_eq!(filled[2].created_at, ts(8));
        assert_eq!(filled[2].values.get(Metric::Laeq), Some("5.00"));
        assert_eq!(filled[2].values.get(Metric::L10), Some("1.00"));
    }

    #[test]
    fn fill_is_identity_on_dense_input() {
        let dense: Vec<ReportRow> = (0..3)
            .map(|i| {
                row(
                    i,
                    (12 - i) as u32,
                    with(&[
                        (Metric::Laeq, "1.00"),
                        (Metric::L10, "2.00"),
                        (Metric::L50, "3.00"),
                        (Metric::L90, "4.00"),
                        (Metric::Lmin, "5.00"),
                        (Metric::Lmax, "6.00"),
                    ]),
                )
            })
            .collect();
        assert!(dense.iter().all(|r| r.values.is_dense()));
        let filled = gap_fill(dense.clone());
        assert_eq!(filled, dense);
    }

    #[test]
    fn absent_metric_stays_null_everywhere() {
        let rows = vec![
            row(1, 12, with(&[(Metric::Laeq, "1.00")])),
            row(2, 10, with(&[(Metric::Laeq, "2.00")])),
        ];
        let filled = gap_fill(rows);
        for r in &filled {
            assert_eq!(r.values.get(Metric::Lmax), None);
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(merge_and_fill(vec![vec![], vec![]]).is_empty());
    }

    #[test]
    fn seed_records_most_recent_truth_per_metric() {
        let rows = merge_series(vec![vec![
            row(1, 12, with(&[(Metric::L10, "2.00")])),
            row(2, 10, with(&[(Metric::Laeq, "5.00"), (Metric::L10, "9.00")])),
        ]]);
        let seeds = seed_latest_values(&rows);
        assert_eq!(seeds.get(Metric::L10), Some("2.00"));
        assert_eq!(seeds.get(Metric::Laeq), Some("5.00"));
        assert_eq!(seeds.get(Metric::Lmax), None);
    }
}
