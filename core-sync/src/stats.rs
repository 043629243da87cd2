//! Per-platform and global counts

use serde::Serialize;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Outcome counts for one controller run. Summable for the global report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    /// Images gathered from the catalog
    pub total: u64,
    pub added: u64,
    pub updated: u64,
    pub deleted: u64,
    /// Images left untouched (dry run, unchanged update, missing catalog file)
    pub skipped: u64,
    /// Images that failed validation or a remote call
    pub errored: u64,
}

impl SyncStats {
    /// Number of remote mutations performed
    pub fn total_processed(&self) -> u64 {
        self.added + self.updated + self.deleted
    }

    /// `(label, count)` pairs in report order.
    pub fn entries(&self) -> [(&'static str, u64); 6] {
        [
            ("total", self.total),
            ("added", self.added),
            ("updated", self.updated),
            ("deleted", self.deleted),
            ("skipped", self.skipped),
            ("errored", self.errored),
        ]
    }
}

impl Add for SyncStats {
    type Output = SyncStats;

    fn add(mut self, rhs: SyncStats) -> SyncStats {
        self += rhs;
        self
    }
}

impl AddAssign for SyncStats {
    fn add_assign(&mut self, rhs: SyncStats) {
        self.total += rhs.total;
        self.added += rhs.added;
        self.updated += rhs.updated;
        self.deleted += rhs.deleted;
        self.skipped += rhs.skipped;
        self.errored += rhs.errored;
    }
}

impl Sum for SyncStats {
    fn sum<I: Iterator<Item = SyncStats>>(iter: I) -> SyncStats {
        iter.fold(SyncStats::default(), Add::add)
    }
}

impl<'a> Sum<&'a SyncStats> for SyncStats {
    fn sum<I: Iterator<Item = &'a SyncStats>>(iter: I) -> SyncStats {
        iter.copied().sum()
    }
}

impl std::fmt::Display for SyncStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .entries()
            .iter()
            .map(|(label, count)| format!("{}={}", label, count))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}
