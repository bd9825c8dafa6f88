//! AcoustID lookup results
//!
//! Field names follow the AcoustID v2 JSON response so these types
//! deserialize directly from the lookup body.

use serde::{Deserialize, Serialize};

/// Successful AcoustID lookup response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<MatchCandidate>,
}

/// One scored fingerprint match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// AcoustID track id
    pub id: String,
    /// Match confidence (0.0 to 1.0)
    pub score: f64,
    #[serde(default)]
    pub recordings: Vec<RecordingRef>,
}

/// MusicBrainz recording referenced by a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingRef {
    /// Recording MBID
    pub id: String,
    #[serde(default, rename = "releasegroups")]
    pub release_groups: Vec<ReleaseGroup>,
}

/// Logical group of releases (an album and its reissues)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseGroup {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub releases: Vec<ReleaseRef>,
}

/// Reference to one concrete MusicBrainz release
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReleaseRef {
    pub id: String,
}

impl ReleaseRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl ReleaseGroup {
    /// Add releases of `other` whose id is not present yet
    ///
    /// Keeps first-appearance order and returns the number of releases added.
    pub fn union_releases(&mut self, other: &[ReleaseRef]) -> usize {
        let mut added = 0;
        for release in other {
            if !self.has_release(&release.id) {
                self.releases.push(release.clone());
                added += 1;
            }
        }
        added
    }

    pub fn has_release(&self, release_id: &str) -> bool {
        self.releases.iter().any(|r| r.id == release_id)
    }
}
