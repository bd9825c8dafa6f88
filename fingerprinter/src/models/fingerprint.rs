//! Acoustic fingerprint of one audio file

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fingerprint of one input file
///
/// The serde layout matches `fpcalc -json` output; `source_file` is filled in
/// by the fingerprinter after parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Audio duration in seconds
    pub duration: f64,
    /// Opaque Chromaprint fingerprint
    #[serde(rename = "fingerprint")]
    pub value: String,
    /// File the fingerprint was computed from
    #[serde(skip)]
    pub source_file: PathBuf,
}

impl Fingerprint {
    pub fn new(duration: f64, value: impl Into<String>, source_file: impl Into<PathBuf>) -> Self {
        Self {
            duration,
            value: value.into(),
            source_file: source_file.into(),
        }
    }

    /// Duration truncated to whole seconds, as AcoustID expects
    pub fn duration_seconds(&self) -> u64 {
        if self.duration.is_finite() && self.duration > 0.0 {
            self.duration as u64
        } else {
            0
        }
    }

    /// File name of the source file (full path if it has none)
    pub fn file_name(&self) -> String {
        self.source_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source_file.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fpcalc_json() {
        let json = r#"{"duration": 241.53, "fingerprint": "AQADtEmUaEkSRZEGAA"}"#;
        let fp: Fingerprint = serde_json::from_str(json).unwrap();

        assert_eq!(fp.value, "AQADtEmUaEkSRZEGAA");
        assert_eq!(fp.duration_seconds(), 241);
        assert_eq!(fp.source_file, PathBuf::new());
    }

    #[test]
    fn test_file_name() {
        let fp = Fingerprint::new(10.0, "x", "/music/album/A.mp3");
        assert_eq!(fp.file_name(), "A.mp3");

        let bare = Fingerprint::new(10.0, "x", "B.mp3");
        assert_eq!(bare.file_name(), "B.mp3");
    }

    #[test]
    fn test_negative_duration_clamps_to_zero() {
        let fp = Fingerprint::new(-3.0, "x", "A.mp3");
        assert_eq!(fp.duration_seconds(), 0);
    }
}
