//! Top-match selection for one AcoustID lookup

use crate::models::MatchCandidate;
use std::fmt;

/// A lookup that succeeded but produced nothing usable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMatch {
    /// The lookup returned no candidates
    NoRecording,
    /// The best candidate carries no recordings
    NoRelease,
}

impl NoMatch {
    pub fn reason(&self) -> &'static str {
        match self {
            NoMatch::NoRecording => "fingerprint matched no known recording",
            NoMatch::NoRelease => "fingerprint matched no known release",
        }
    }
}

impl fmt::Display for NoMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Pick the highest-scoring candidate
///
/// Ties keep their input order. The winner must reference at least one
/// recording, otherwise the lookup counts as [`NoMatch::NoRelease`].
pub fn select_top_match(candidates: &[MatchCandidate]) -> Result<&MatchCandidate, NoMatch> {
    let mut ranked: Vec<&MatchCandidate> = candidates.iter().collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    let top = ranked.first().copied().ok_or(NoMatch::NoRecording)?;

    if top.recordings.is_empty() {
        return Err(NoMatch::NoRelease);
    }

    Ok(top)
}
