//! # Run Orchestrator
//!
//! Runs the requested platforms one after another and sums their counts.
//!
//! A platform that fails to connect or to enumerate its images is reported
//! and the run moves on to the next platform. A process-fatal error
//! ([`SyncError::is_process_fatal`]) stops the run immediately.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info, info_span, Instrument};

use crate::platform::PlatformKind;
use crate::stats::SyncStats;
use crate::{Result, SyncError};

/// One platform's full lifecycle, as seen by the orchestrator.
#[async_trait]
pub trait PlatformRun: Send {
    fn kind(&self) -> PlatformKind;

    /// Counts accumulated so far, also after a failed run.
    fn stats(&self) -> SyncStats;

    /// Gather, connect, classify, add, update, delete, summarise.
    async fn run(&mut self) -> Result<SyncStats>;
}

/// Outcome of one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformReport {
    pub platform: PlatformKind,
    pub stats: SyncStats,
    /// Why the platform stopped early, if it did
    pub failure: Option<String>,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub reports: Vec<PlatformReport>,
    pub totals: SyncStats,
}

impl RunSummary {
    /// True when a platform stopped early or any image errored.
    pub fn has_failures(&self) -> bool {
        self.totals.errored > 0 || self.reports.iter().any(|r| r.failure.is_some())
    }
}

/// Sequential runner over the requested platforms.
#[derive(Default)]
pub struct SyncRunner {
    platforms: Vec<Box<dyn PlatformRun>>,
}

impl SyncRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, platform: Box<dyn PlatformRun>) {
        self.platforms.push(platform);
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    /// Run every platform in order.
    ///
    /// # Errors
    ///
    /// Returns the first process-fatal error. Counts gathered before it are
    /// logged but not returned.
    pub async fn run(mut self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for platform in &mut self.platforms {
            let kind = platform.kind();
            let span = info_span!("platform", name = kind.as_str());

            let outcome = platform.run().instrument(span).await;
            let report = match outcome {
                Ok(stats) => PlatformReport {
                    platform: kind,
                    stats,
                    failure: None,
                },
                Err(err) if err.is_process_fatal() => {
                    error!(platform = kind.as_str(), error = %err, "Stopping run");
                    summary.totals += platform.stats();
                    log_totals(&summary.totals);
                    return Err(err);
                }
                Err(err) => {
                    error!(platform = kind.as_str(), error = %err, "Platform sync failed");
                    PlatformReport {
                        platform: kind,
                        stats: platform.stats(),
                        failure: Some(err.to_string()),
                    }
                }
            };

            summary.totals += report.stats;
            summary.reports.push(report);
        }

        log_totals(&summary.totals);
        Ok(summary)
    }
}

fn log_totals(totals: &SyncStats) {
    info!(stats = %totals, "Global summary");
    for (label, count) in totals.entries() {
        info!("-- {} {} images", count, label);
    }
}

/// Reject unknown names before any work starts.
pub fn parse_platforms<S: AsRef<str>>(names: &[S]) -> Result<Vec<PlatformKind>> {
    let mut kinds = Vec::with_capacity(names.len());
    for name in names {
        let kind: PlatformKind = name.as_ref().parse()?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    if kinds.is_empty() {
        return Err(SyncError::UnknownPlatform {
            name: String::new(),
            valid: PlatformKind::valid_names(),
        });
    }
    Ok(kinds)
}
