//! Per-release-group metadata aggregation
//!
//! Every release of a group is fetched from the catalog, one at a time, and
//! folded into a single [`ReleaseMeta`]. Authors and labels are deduplicated
//! by id. Tracks are deduplicated by id or by any shared ISRC, and tracks
//! without an ISRC are dropped since they cannot be matched across releases.
//! Available tracks are drawn from the accepted tracks only.

use super::release_groups::RecordingSources;
use crate::error::VerifyError;
use crate::models::{
    Author, AvailableTrack, Label, ReleaseGroup, ReleaseInfo, ReleaseMeta, TrackInfo,
};
use crate::services::{ReleaseCatalog, RequestPacer};
use chrono::NaiveDate;
use tracing::debug;

impl ReleaseMeta {
    /// Empty aggregate for a group; `today` is the latest possible date
    pub fn new(group: &ReleaseGroup, today: NaiveDate) -> Self {
        Self {
            id: group.id.clone(),
            title: group.title.clone(),
            released_at: today,
            authors: Vec::new(),
            labels: Vec::new(),
            tracks: Vec::new(),
            available_tracks: Vec::new(),
        }
    }

    pub fn has_author(&self, author: &Author) -> bool {
        self.authors.iter().any(|a| a.id == author.id)
    }

    pub fn has_label(&self, label: &Label) -> bool {
        self.labels.iter().any(|l| l.id == label.id)
    }

    /// Same track id, or at least one ISRC in common
    pub fn has_track(&self, track: &TrackInfo) -> bool {
        self.tracks.iter().any(|t| t.is_same_track(track))
    }

    /// Same recording id, or at least one ISRC in common
    pub fn has_available_track(&self, track: &TrackInfo) -> bool {
        self.available_tracks.iter().any(|a| {
            a.track.recording_id == track.recording_id || a.track.shares_isrc(&track.isrc_codes)
        })
    }

    /// Fold one fetched release into the aggregate
    pub fn merge_release(&mut self, release: &ReleaseInfo, sources: &RecordingSources) {
        if let Some(date) = release.release_date {
            if date < self.released_at {
                self.released_at = date;
            }
        }

        for author in &release.authors {
            if !self.has_author(author) {
                self.authors.push(author.clone());
            }
        }

        for label in &release.labels {
            if !self.has_label(label) {
                self.labels.push(label.clone());
            }
        }

        for track in release.tracks.iter().filter(|t| t.has_isrc()) {
            if self.has_track(track) {
                continue;
            }
            self.tracks.push(track.clone());

            // Only accepted tracks can become available
            if let Some(source) = sources.source_of(&track.recording_id) {
                if !self.has_available_track(track) {
                    self.available_tracks.push(AvailableTrack {
                        track: track.clone(),
                        source_file_path: source.display().to_string(),
                    });
                }
            }
        }
    }
}

/// Fetch every release of `group` and aggregate them
///
/// The pacer is shared across the whole batch, so only the very first fetch
/// of an `analyze` call goes out without a delay.
///
/// # Errors
/// The first failed fetch aborts the aggregation.
pub async fn aggregate(
    group: &ReleaseGroup,
    catalog: &dyn ReleaseCatalog,
    pacer: &RequestPacer,
    sources: &RecordingSources,
    today: NaiveDate,
) -> Result<ReleaseMeta, VerifyError> {
    let mut meta = ReleaseMeta::new(group, today);

    for release in &group.releases {
        pacer.wait().await;

        let info = catalog
            .release_info(&release.id)
            .await
            .map_err(|source| VerifyError::MusicBrainz {
                release_id: release.id.clone(),
                source,
            })?;

        meta.merge_release(&info, sources);

        debug!(
            release_group = %group.id,
            release_id = %release.id,
            tracks = meta.tracks.len(),
            available = meta.available_tracks.len(),
            "Merged release"
        );
    }

    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReleaseRef;
    use std::path::Path;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn group() -> ReleaseGroup {
        ReleaseGroup {
            id: "G1".to_string(),
            title: "Album".to_string(),
            kind: "Album".to_string(),
            releases: vec![ReleaseRef::new("X"), ReleaseRef::new("Y")],
        }
    }

    fn author(id: &str) -> Author {
        Author {
            id: id.to_string(),
            name: format!("Artist {}", id),
            description: String::new(),
        }
    }

    fn label(id: &str) -> Label {
        Label {
            id: id.to_string(),
            name: format!("Label {}", id),
            description: String::new(),
        }
    }

    fn track(id: &str, recording_id: &str, isrcs: &[&str]) -> TrackInfo {
        TrackInfo {
            id: id.to_string(),
            title: format!("Track {}", id),
            position: 1,
            duration_millis: Some(180_000),
            recording_id: recording_id.to_string(),
            isrc_codes: isrcs.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn release(id: &str, date: Option<NaiveDate>, tracks: Vec<TrackInfo>) -> ReleaseInfo {
        ReleaseInfo {
            id: id.to_string(),
            title: "Album".to_string(),
            release_date: date,
            authors: vec![author("A1")],
            labels: vec![label("L1")],
            tracks,
        }
    }

    #[test]
    fn test_earliest_date_wins() {
        let mut meta = ReleaseMeta::new(&group(), today());
        let sources = RecordingSources::new();

        meta.merge_release(&release("X", NaiveDate::from_ymd_opt(2001, 1, 1), vec![]), &sources);
        meta.merge_release(&release("Y", NaiveDate::from_ymd_opt(1999, 5, 1), vec![]), &sources);
        meta.merge_release(&release("Z", None, vec![]), &sources);

        assert_eq!(meta.released_at, NaiveDate::from_ymd_opt(1999, 5, 1).unwrap());
    }

    #[test]
    fn test_undated_releases_keep_sentinel() {
        let mut meta = ReleaseMeta::new(&group(), today());
        meta.merge_release(&release("X", None, vec![]), &RecordingSources::new());
        assert_eq!(meta.released_at, today());
    }

    #[test]
    fn test_authors_and_labels_dedup_by_id() {
        let mut meta = ReleaseMeta::new(&group(), today());
        let sources = RecordingSources::new();

        let mut second = release("Y", None, vec![]);
        second.authors.push(author("A2"));
        second.labels.push(label("L1"));

        meta.merge_release(&release("X", None, vec![]), &sources);
        meta.merge_release(&second, &sources);

        let author_ids: Vec<&str> = meta.authors.iter().map(|a| a.id.as_str()).collect();
        let label_ids: Vec<&str> = meta.labels.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(author_ids, vec!["A1", "A2"]);
        assert_eq!(label_ids, vec!["L1"]);
    }

    #[test]
    fn test_tracks_dedup_by_id_or_shared_isrc() {
        let mut meta = ReleaseMeta::new(&group(), today());
        let sources = RecordingSources::new();

        meta.merge_release(
            &release("X", None, vec![track("T1", "R1", &["I1"]), track("T2", "R2", &["I2"])]),
            &sources,
        );
        meta.merge_release(
            &release(
                "Y",
                None,
                vec![
                    track("T1", "R1", &["I9"]),
                    track("T3", "R3", &["I2", "I3"]),
                    track("T4", "R4", &[]),
                    track("T5", "R5", &["I5"]),
                ],
            ),
            &sources,
        );

        let ids: Vec<&str> = meta.tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["T1", "T2", "T5"]);

        for (i, a) in meta.tracks.iter().enumerate() {
            for b in meta.tracks.iter().skip(i + 1) {
                assert!(!a.is_same_track(b));
            }
        }
    }

    #[test]
    fn test_available_track_recorded_once() {
        let mut meta = ReleaseMeta::new(&group(), today());
        let mut sources = RecordingSources::new();
        sources.record("R1", Path::new("/music/A.mp3"));

        meta.merge_release(&release("X", None, vec![track("T1", "R1", &["I1"])]), &sources);
        meta.merge_release(&release("Y", None, vec![track("T9", "R1", &["I7"])]), &sources);

        assert_eq!(meta.available_tracks.len(), 1);
        assert_eq!(meta.available_tracks[0].track.id, "T1");
        assert_eq!(meta.available_tracks[0].source_file_path, "/music/A.mp3");
    }

    #[test]
    fn test_rejected_duplicate_track_is_not_available() {
        let mut meta = ReleaseMeta::new(&group(), today());
        let mut sources = RecordingSources::new();
        sources.record("R2", Path::new("/music/B.mp3"));

        // Same track id on both releases, so Y's copy is a duplicate
        meta.merge_release(&release("X", None, vec![track("T1", "R1", &["I1"])]), &sources);
        meta.merge_release(&release("Y", None, vec![track("T1", "R2", &["I2"])]), &sources);

        let tracks: Vec<(&str, &str)> = meta
            .tracks
            .iter()
            .map(|t| (t.id.as_str(), t.recording_id.as_str()))
            .collect();
        assert_eq!(tracks, vec![("T1", "R1")]);
        assert!(meta.available_tracks.is_empty());

        for available in &meta.available_tracks {
            assert!(meta.tracks.contains(&available.track));
        }
    }

    #[test]
    fn test_available_tracks_are_accepted_tracks() {
        let mut meta = ReleaseMeta::new(&group(), today());
        let mut sources = RecordingSources::new();
        sources.record("R1", Path::new("/music/A.mp3"));
        sources.record("R2", Path::new("/music/B.mp3"));
        sources.record("R3", Path::new("/music/C.mp3"));

        meta.merge_release(
            &release("X", None, vec![track("T1", "R1", &["I1"]), track("T2", "R2", &["I2"])]),
            &sources,
        );
        meta.merge_release(
            &release(
                "Y",
                None,
                vec![
                    track("T20", "R3", &["I2"]),
                    track("T3", "R3", &["I3"]),
                    track("T4", "R4", &[]),
                ],
            ),
            &sources,
        );

        let available: Vec<&str> = meta
            .available_tracks
            .iter()
            .map(|a| a.track.id.as_str())
            .collect();
        assert_eq!(available, vec!["T1", "T2", "T3"]);

        for available in &meta.available_tracks {
            assert!(meta.tracks.contains(&available.track));
        }
    }

    #[test]
    fn test_track_without_isrc_is_never_available() {
        let mut meta = ReleaseMeta::new(&group(), today());
        let mut sources = RecordingSources::new();
        sources.record("R1", Path::new("A.mp3"));

        meta.merge_release(&release("X", None, vec![track("T1", "R1", &[])]), &sources);

        assert!(meta.tracks.is_empty());
        assert!(meta.available_tracks.is_empty());
    }
}
