//! Bulk import of Hipo Labs university records
//!
//! Each record is normalised and upserted on its own. A record that fails
//! to store is logged and counted; the rest of the batch continues.

use serde::Serialize;
use tracing::{debug, info, warn};
use unitrack_core::hipo::{self, HipoRecord};

use crate::repos::{UniversityRepo, UpsertOutcome};

/// Outcome of one import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Records read from the source
    pub fetched: usize,
    /// Records inserted or updated
    pub upserted: usize,
    /// Rows newly inserted (subset of `upserted`)
    pub inserted: usize,
    /// Records without a usable name or country code
    pub skipped: usize,
    /// Records the store rejected
    pub failed: usize,
}

/// Upsert every usable record. `on_record` is called after each record,
/// for progress reporting.
pub async fn import_records<F>(
    repo: &UniversityRepo<'_>,
    records: &[HipoRecord],
    mut on_record: F,
) -> ImportSummary
where
    F: FnMut(&ImportSummary),
{
    let mut summary = ImportSummary {
        fetched: records.len(),
        ..Default::default()
    };

    for record in records {
        match hipo::normalize(record) {
            None => {
                debug!(name = ?record.name, "skipping record without name or country code");
                summary.skipped += 1;
            }
            Some(university) => match repo.upsert(&university).await {
                Ok((_, outcome)) => {
                    summary.upserted += 1;
                    if outcome == UpsertOutcome::Inserted {
                        summary.inserted += 1;
                    }
                }
                Err(e) => {
                    warn!(name = %university.name, error = %e, "failed to import university");
                    summary.failed += 1;
                }
            },
        }
        on_record(&summary);
    }

    info!(
        fetched = summary.fetched,
        upserted = summary.upserted,
        skipped = summary.skipped,
        failed = summary.failed,
        "university import finished"
    );
    summary
}
