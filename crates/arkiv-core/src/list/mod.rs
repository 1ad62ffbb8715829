//! Produce a sum file by paging checksum results out of a pillar.
//!
//! The pillar serves a coarse, at-least-once feed keyed by calculation
//! timestamp: records exactly at the cursor boundary can show up again on
//! the next page. A one-page-lookback window of emitted file ids keeps each
//! file out of the sum file twice while bounding memory, assuming overlap
//! never spans more than one page boundary.

mod client;

pub use client::{ChecksumClient, ChecksumPage, ChecksumRecord, ContributorQuery};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::sumfile::SumFileWriter;
use crate::translate;

/// Drives the paged checksum query loop for one collection/pillar pair and
/// streams accepted records to the sum file. Strictly sequential: one
/// outstanding query at a time, next cursor decided only after the page has
/// been processed.
pub struct ListChecksums<C> {
    client: C,
    collection_id: String,
    pillar_id: String,
    local_prefix: Option<String>,
    remote_prefix: Option<String>,
    sum_file: PathBuf,
    page_size: usize,
}

/// What one page contributed: the latest calculation timestamp seen (over
/// all records, skipped ones included), the file ids emitted to the sum
/// file, and how many lines were written.
struct PageOutcome {
    latest: DateTime<Utc>,
    emitted: HashSet<String>,
    lines: u64,
}

impl<C: ChecksumClient> ListChecksums<C> {
    pub fn new(
        client: C,
        collection_id: String,
        pillar_id: String,
        local_prefix: Option<String>,
        remote_prefix: Option<String>,
        sum_file: PathBuf,
        page_size: usize,
    ) -> Self {
        Self {
            client,
            collection_id,
            pillar_id,
            local_prefix,
            remote_prefix,
            sum_file,
            page_size,
        }
    }

    /// Run the listing to completion. Returns the number of lines written.
    pub fn run(&self) -> Result<u64> {
        let mut writer = SumFileWriter::create(&self.sum_file)
            .with_context(|| format!("creating sum file {}", self.sum_file.display()))?;

        let mut cursor = DateTime::<Utc>::UNIX_EPOCH;
        let mut last_page: HashSet<String> = HashSet::new();
        let mut written = 0u64;

        loop {
            let query = self.make_query(cursor);
            let page = self
                .client
                .get_checksums(&self.collection_id, &query)
                .with_context(|| {
                    format!("getting checksum data from pillar '{}'", self.pillar_id)
                })?;

            let outcome = self.report_results(&page.records, &mut writer, &last_page)?;
            // The window is replaced, not merged: only the immediately
            // preceding page can overlap the next one.
            last_page = outcome.emitted;
            if outcome.latest > cursor {
                cursor = outcome.latest;
            }
            written += outcome.lines;

            if !page.partial {
                break;
            }
        }

        writer.close().context("flushing sum file")?;
        tracing::info!(
            "listed {} checksum entries from pillar '{}'",
            written,
            self.pillar_id
        );
        Ok(written)
    }

    fn report_results(
        &self,
        records: &[ChecksumRecord],
        writer: &mut SumFileWriter,
        last_page: &HashSet<String>,
    ) -> Result<PageOutcome> {
        let mut latest = DateTime::<Utc>::UNIX_EPOCH;
        let mut emitted = HashSet::new();
        let mut lines = 0u64;

        for record in records {
            // Advance before any skip decision so the cursor keeps moving
            // even on pages where nothing is written.
            if record.calculated > latest {
                latest = record.calculated;
            }

            let local = match translate::remote_to_local(
                &record.file_id,
                self.local_prefix.as_deref(),
                self.remote_prefix.as_deref(),
            ) {
                Ok(path) => PathBuf::from(path),
                Err(skip) => {
                    tracing::debug!("skipping '{}': {}", record.file_id, skip);
                    continue;
                }
            };

            // Already written from the previous page's boundary overlap.
            // Not re-added to the new window either.
            if last_page.contains(&record.file_id) {
                continue;
            }
            emitted.insert(record.file_id.clone());

            writer
                .write_line(&local, &hex::encode(&record.checksum))
                .with_context(|| format!("writing sum line for '{}'", record.file_id))?;
            lines += 1;
        }

        Ok(PageOutcome {
            latest,
            emitted,
            lines,
        })
    }

    fn make_query(&self, latest: DateTime<Utc>) -> ContributorQuery {
        ContributorQuery {
            pillar_id: self.pillar_id.clone(),
            min_timestamp: Some(latest),
            max_timestamp: None,
            max_results: self.page_size,
        }
    }
}
