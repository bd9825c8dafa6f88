//! Verification report

use super::release::{Author, Label, TrackInfo};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Track proven present in the input batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableTrack {
    pub track: TrackInfo,
    pub source_file_path: String,
}

/// Input file that produced no usable match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedFile {
    pub file_name: String,
    pub reason: String,
}

impl UnmatchedFile {
    pub fn new(file_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            reason: reason.into(),
        }
    }
}

/// Metadata aggregated over all releases of one release group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseMeta {
    /// Release group id
    pub id: String,
    pub title: String,
    /// Earliest known release date
    pub released_at: NaiveDate,
    pub authors: Vec<Author>,
    pub labels: Vec<Label>,
    pub tracks: Vec<TrackInfo>,
    pub available_tracks: Vec<AvailableTrack>,
}

/// Result of one verification batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub matched_releases: Vec<ReleaseMeta>,
    pub unmatched_files: Vec<UnmatchedFile>,
}

impl Report {
    pub fn available_track_count(&self) -> usize {
        self.matched_releases
            .iter()
            .map(|r| r.available_tracks.len())
            .sum()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matched releases: {}", self.matched_releases.len())?;

        for release in &self.matched_releases {
            writeln!(
                f,
                "  {} \"{}\" (released {})",
                release.id, release.title, release.released_at
            )?;

            let authors: Vec<&str> = release.authors.iter().map(|a| a.name.as_str()).collect();
            writeln!(f, "    authors: {}", authors.join(", "))?;

            let labels: Vec<&str> = release.labels.iter().map(|l| l.name.as_str()).collect();
            writeln!(f, "    labels: {}", labels.join(", "))?;

            writeln!(
                f,
                "    tracks: {} ({} available)",
                release.tracks.len(),
                release.available_tracks.len()
            )?;

            for available in &release.available_tracks {
                writeln!(
                    f,
                    "      {}. {} <- {}",
                    available.track.position, available.track.title, available.source_file_path
                )?;
            }
        }

        writeln!(f, "Unmatched files: {}", self.unmatched_files.len())?;
        for unmatched in &self.unmatched_files {
            writeln!(f, "  {}: {}", unmatched.file_name, unmatched.reason)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_display() {
        let report = Report::default();
        assert_eq!(
            report.to_string(),
            "Matched releases: 0\nUnmatched files: 0\n"
        );
    }

    #[test]
    fn test_report_serializes_dates_as_iso() {
        let report = Report {
            matched_releases: vec![ReleaseMeta {
                id: "G1".to_string(),
                title: "Album".to_string(),
                released_at: NaiveDate::from_ymd_opt(2005, 6, 1).unwrap(),
                authors: vec![],
                labels: vec![],
                tracks: vec![],
                available_tracks: vec![],
            }],
            unmatched_files: vec![UnmatchedFile::new("B.mp3", "no match")],
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["matched_releases"][0]["released_at"], "2005-06-01");
        assert_eq!(json["unmatched_files"][0]["file_name"], "B.mp3");

        let text = report.to_string();
        assert!(text.contains("G1 \"Album\" (released 2005-06-01)"));
        assert!(text.contains("B.mp3: no match"));
    }
}
