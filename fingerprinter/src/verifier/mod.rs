//! Reconciliation engine
//!
//! [`AudioVerifier::analyze`] fingerprints an input path, looks every
//! fingerprint up in AcoustID, groups the matched recordings by release group
//! and aggregates the MusicBrainz metadata of each group into a [`Report`].
//!
//! All upstream calls of one batch run sequentially. The working state lives
//! in the `analyze` call, so a verifier can be reused and shared freely.

mod aggregation;
mod match_selection;
mod release_groups;

pub use aggregation::aggregate;
pub use match_selection::{select_top_match, NoMatch};
pub use release_groups::{Accumulator, RecordingSources, ReleaseGroupSet};

use crate::error::{VerifyError, VerifyResult};
use crate::models::{Report, UnmatchedFile};
use crate::services::rate_limiter::MUSICBRAINZ_INTERVAL;
use crate::services::{AcousticLookup, FingerprintSource, ReleaseCatalog, RequestPacer};
use chrono::{NaiveDate, Utc};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Audio verifier
pub struct AudioVerifier {
    fingerprints: Arc<dyn FingerprintSource>,
    acoustid: Arc<dyn AcousticLookup>,
    catalog: Arc<dyn ReleaseCatalog>,
    fetch_interval: Duration,
}

impl AudioVerifier {
    pub fn new(
        fingerprints: Arc<dyn FingerprintSource>,
        acoustid: Arc<dyn AcousticLookup>,
        catalog: Arc<dyn ReleaseCatalog>,
    ) -> Self {
        Self {
            fingerprints,
            acoustid,
            catalog,
            fetch_interval: MUSICBRAINZ_INTERVAL,
        }
    }

    /// Override the minimum delay between catalog fetches
    pub fn with_fetch_interval(mut self, interval: Duration) -> Self {
        self.fetch_interval = interval;
        self
    }

    /// Analyze a single audio file or a directory of audio files
    ///
    /// Files whose lookup yields no usable match end up in
    /// `Report::unmatched_files`. Any other failure aborts the batch.
    pub async fn analyze(&self, input_path: &Path) -> VerifyResult<Report> {
        self.analyze_as_of(input_path, Utc::now().date_naive()).await
    }

    /// [`analyze`](Self::analyze) with an explicit "latest possible" release date
    pub async fn analyze_as_of(&self, input_path: &Path, today: NaiveDate) -> VerifyResult<Report> {
        let fingerprints = self.fingerprints.extract(input_path).await?;

        info!(
            input = %input_path.display(),
            fingerprints = fingerprints.len(),
            "Fingerprints extracted"
        );

        let mut accumulator = Accumulator::new();
        let mut unmatched_files = Vec::new();

        for fingerprint in &fingerprints {
            let lookup = self
                .acoustid
                .lookup(fingerprint, true)
                .await
                .map_err(|source| VerifyError::AcoustId {
                    file: fingerprint.source_file.display().to_string(),
                    source,
                })?;

            match select_top_match(&lookup.results) {
                Ok(top) => {
                    info!(
                        file = %fingerprint.file_name(),
                        acoustid = %top.id,
                        score = top.score,
                        recordings = top.recordings.len(),
                        "Fingerprint matched"
                    );
                    accumulator.accumulate(top, &fingerprint.source_file);
                }
                Err(no_match) => {
                    warn!(
                        file = %fingerprint.file_name(),
                        reason = %no_match,
                        "Fingerprint not matched"
                    );
                    unmatched_files.push(UnmatchedFile::new(fingerprint.file_name(), no_match.reason()));
                }
            }
        }

        let pacer = RequestPacer::new(self.fetch_interval);
        let mut matched_releases = Vec::with_capacity(accumulator.release_groups.len());

        for group in accumulator.release_groups.iter() {
            let meta = aggregate(
                group,
                self.catalog.as_ref(),
                &pacer,
                &accumulator.recording_sources,
                today,
            )
            .await?;
            matched_releases.push(meta);
        }

        let report = Report {
            matched_releases,
            unmatched_files,
        };

        info!(
            matched_releases = report.matched_releases.len(),
            available_tracks = report.available_track_count(),
            unmatched_files = report.unmatched_files.len(),
            "Analysis complete"
        );

        Ok(report)
    }
}
