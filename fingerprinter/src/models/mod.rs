//! Data models
//!
//! - `fingerprint`: per-file acoustic fingerprint
//! - `lookup`: AcoustID match candidates and release groups
//! - `release`: MusicBrainz release and recording metadata
//! - `report`: aggregated verification report

pub mod fingerprint;
pub mod lookup;
pub mod release;
pub mod report;

pub use fingerprint::Fingerprint;
pub use lookup::{LookupResponse, MatchCandidate, RecordingRef, ReleaseGroup, ReleaseRef};
pub use release::{Author, Label, RecordingInfo, ReleaseInfo, ReleaseSummary, TrackInfo};
pub use report::{AvailableTrack, ReleaseMeta, Report, UnmatchedFile};
