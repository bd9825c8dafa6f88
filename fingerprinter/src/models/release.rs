//! MusicBrainz release and recording metadata
//!
//! Domain view of the MusicBrainz responses. The wire layout lives in
//! `services::musicbrainz_client`, which converts into these types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Artist a release is credited to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Artist MBID
    pub id: String,
    pub name: String,
    /// MusicBrainz disambiguation comment
    pub description: String,
}

/// Entity that issued a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label MBID
    pub id: String,
    pub name: String,
    /// MusicBrainz disambiguation comment
    pub description: String,
}

/// One track of a release listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Track MBID (unique per release listing)
    pub id: String,
    pub title: String,
    pub position: u32,
    pub duration_millis: Option<u64>,
    /// Recording MBID the track plays
    pub recording_id: String,
    /// ISRC codes of the recording
    pub isrc_codes: BTreeSet<String>,
}

impl TrackInfo {
    pub fn has_isrc(&self) -> bool {
        !self.isrc_codes.is_empty()
    }

    /// True if both tracks share at least one ISRC
    pub fn shares_isrc(&self, isrc_codes: &BTreeSet<String>) -> bool {
        !self.isrc_codes.is_disjoint(isrc_codes)
    }

    /// Same underlying track: equal id, or at least one shared ISRC
    pub fn is_same_track(&self, other: &TrackInfo) -> bool {
        self.id == other.id || self.shares_isrc(&other.isrc_codes)
    }
}

/// Full metadata of one release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    pub id: String,
    pub title: String,
    /// None when MusicBrainz has no (parseable) date
    pub release_date: Option<NaiveDate>,
    pub authors: Vec<Author>,
    pub labels: Vec<Label>,
    /// Tracks of all media, in listing order
    pub tracks: Vec<TrackInfo>,
}

/// Release a recording appears on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSummary {
    pub id: String,
    pub title: String,
    pub country: Option<String>,
}

/// Metadata of a single recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingInfo {
    pub id: String,
    pub title: String,
    pub duration_millis: Option<u64>,
    pub isrc_codes: BTreeSet<String>,
    pub releases: Vec<ReleaseSummary>,
    pub authors: Vec<Author>,
    pub first_release_date: Option<NaiveDate>,
}
