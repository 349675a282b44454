//! Aggregate statistics over test cases.

use crate::models::{CodeHistogram, DashboardStats, TestCase};

/// Reduce a list of test cases into dashboard statistics.
///
/// Only `automation == 2` counts as automated. Categorical codes are counted as-is.
pub fn compute_stats(cases: &[TestCase]) -> DashboardStats {
    let mut stats = DashboardStats {
        total_tests: cases.len(),
        ..DashboardStats::default()
    };

    for case in cases {
        if case.is_automated() {
            stats.automated_tests += 1;
        } else {
            stats.manual_tests += 1;
        }

        bump(&mut stats.by_status, case.status);
        bump(&mut stats.by_priority, case.priority);
        bump(&mut stats.by_severity, case.severity);
        bump(&mut stats.by_type, case.case_type);
    }

    stats.automation_percentage = rounded_percentage(stats.automated_tests, stats.total_tests);
    stats
}

fn bump(histogram: &mut CodeHistogram, code: i32) {
    *histogram.entry(code).or_insert(0) += 1;
}

/// `part / total * 100` rounded half away from zero; 0 when `total` is 0.
pub fn rounded_percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}
