//! Display labels for Qase categorical codes.
//!
//! Codes without a known label render as `Unknown (code)`.

use crate::models::{CodeHistogram, DashboardStats, DistributionEntry, Distributions};

use super::stats::rounded_percentage;

/// Which categorical field a code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Status,
    Priority,
    Severity,
    Type,
}

impl Category {
    fn known_label(self, code: i32) -> Option<&'static str> {
        match (self, code) {
            (Category::Status, 0) => Some("Actual"),
            (Category::Status, 1) => Some("Draft"),
            (Category::Status, 2) => Some("Deprecated"),
            (Category::Priority, 0) => Some("Unknown"),
            (Category::Priority, 1) | (Category::Severity, 1) => Some("Critical"),
            (Category::Priority, 2) => Some("High"),
            (Category::Priority, 3) => Some("Medium"),
            (Category::Priority, 4) => Some("Low"),
            (Category::Priority, 5) | (Category::Severity, 5) => Some("Trivial"),
            (Category::Severity, 2) => Some("Major"),
            (Category::Severity, 3) => Some("Normal"),
            (Category::Severity, 4) => Some("Minor"),
            (Category::Type, 1) => Some("Functional"),
            (Category::Type, 2) => Some("Integration"),
            (Category::Type, 3) => Some("UI/UX"),
            (Category::Type, 4) => Some("API"),
            (Category::Type, 5) => Some("Performance"),
            (Category::Type, 6) => Some("Security"),
            (Category::Type, 7) => Some("Smoke"),
            (Category::Type, 8) => Some("Regression"),
            _ => None,
        }
    }

    /// Label for `code`, falling back to `Unknown (code)`.
    pub fn label(self, code: i32) -> String {
        self.known_label(code)
            .map(String::from)
            .unwrap_or_else(|| format!("Unknown ({})", code))
    }
}

/// Labeled entries sorted by count descending, then code ascending.
pub fn distribution(histogram: &CodeHistogram, category: Category) -> Vec<DistributionEntry> {
    let total: usize = histogram.values().sum();
    let mut entries: Vec<DistributionEntry> = histogram
        .iter()
        .map(|(&code, &count)| DistributionEntry {
            code,
            label: category.label(code),
            count,
            percentage: rounded_percentage(count, total),
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then(a.code.cmp(&b.code)));
    entries
}

/// Labeled distributions for all four histograms of `stats`.
pub fn distributions(stats: &DashboardStats) -> Distributions {
    Distributions {
        status: distribution(&stats.by_status, Category::Status),
        priority: distribution(&stats.by_priority, Category::Priority),
        severity: distribution(&stats.by_severity, Category::Severity),
        case_type: distribution(&stats.by_type, Category::Type),
    }
}
