//! Working state accumulated across the lookups of one batch

use crate::models::{MatchCandidate, ReleaseGroup};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Release groups keyed by id, in first-seen order
#[derive(Debug, Default)]
pub struct ReleaseGroupSet {
    groups: Vec<ReleaseGroup>,
    index: HashMap<String, usize>,
}

impl ReleaseGroupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new group, or union its releases into the known entry
    pub fn insert(&mut self, group: &ReleaseGroup) {
        match self.index.get(&group.id) {
            Some(&position) => {
                let added = self.groups[position].union_releases(&group.releases);
                if added > 0 {
                    tracing::debug!(
                        release_group = %group.id,
                        added,
                        "Merged releases into known release group"
                    );
                }
            }
            None => {
                // Dedup within the incoming group too
                let mut fresh = ReleaseGroup {
                    releases: Vec::with_capacity(group.releases.len()),
                    ..group.clone()
                };
                fresh.union_releases(&group.releases);

                self.index.insert(group.id.clone(), self.groups.len());
                self.groups.push(fresh);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&ReleaseGroup> {
        self.index.get(id).map(|&position| &self.groups[position])
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReleaseGroup> {
        self.groups.iter()
    }
}

/// Input file each matched recording was first observed in
#[derive(Debug, Default)]
pub struct RecordingSources {
    files: HashMap<String, PathBuf>,
}

impl RecordingSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a source file; the first file seen for a recording wins
    pub fn record(&mut self, recording_id: &str, source_file: &Path) {
        self.files
            .entry(recording_id.to_string())
            .or_insert_with(|| source_file.to_path_buf());
    }

    pub fn source_of(&self, recording_id: &str) -> Option<&Path> {
        self.files.get(recording_id).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Release groups plus recording sources for one `analyze` call
#[derive(Debug, Default)]
pub struct Accumulator {
    pub release_groups: ReleaseGroupSet,
    pub recording_sources: RecordingSources,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the selected match of one input file into the working state
    pub fn accumulate(&mut self, candidate: &MatchCandidate, source_file: &Path) {
        for recording in &candidate.recordings {
            self.recording_sources.record(&recording.id, source_file);

            for group in &recording.release_groups {
                self.release_groups.insert(group);
            }
        }
    }
}
