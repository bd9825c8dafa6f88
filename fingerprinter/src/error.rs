//! Error types for fingerprinter
//!
//! Three layers, matching where a failure originates:
//! - [`FingerprintError`]: the input path or the fpcalc subprocess
//! - [`UpstreamError`]: an AcoustID or MusicBrainz exchange
//! - [`VerifyError`]: what `AudioVerifier::analyze` returns; every variant
//!   aborts the batch

use std::path::PathBuf;
use thiserror::Error;

/// Fingerprint extraction errors
#[derive(Debug, Error)]
pub enum FingerprintError {
    /// Input path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Input file extension is not a supported audio format
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(PathBuf),

    /// fpcalc binary could not be started
    #[error("fpcalc binary not found: {0}")]
    ToolNotFound(PathBuf),

    /// fpcalc exited with a failure status
    #[error("fpcalc failed on {path}: {message}")]
    ToolFailed { path: PathBuf, message: String },

    /// fpcalc output was not the expected JSON document
    #[error("Failed to parse fpcalc output for {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    /// A fingerprinting worker panicked or was cancelled
    #[error("Fingerprint worker failed: {0}")]
    WorkerFailed(String),

    /// I/O error while reading the input path
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors talking to an upstream catalog service
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UpstreamError {
    /// Connection, timeout or other transport failure
    #[error("Network error: {0}")]
    Transport(String),

    /// The service answered with an application-level failure
    #[error("http status: {code}. error message: {message}")]
    Api { code: u16, message: String },

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),
}

impl UpstreamError {
    /// HTTP 503, the only response the AcoustID client retries
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, UpstreamError::Api { code: 503, .. })
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            UpstreamError::Parse(err.to_string())
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}

/// Fatal errors of one verification batch
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Fingerprint extraction failed (invalid input path, fpcalc failure)
    #[error("Fingerprint extraction failed: {0}")]
    Fingerprint(#[from] FingerprintError),

    /// AcoustID lookup failed for one input file
    #[error("AcoustID lookup failed for {file}: {source}")]
    AcoustId {
        file: String,
        #[source]
        source: UpstreamError,
    },

    /// MusicBrainz release fetch failed
    #[error("MusicBrainz lookup failed for release {release_id}: {source}")]
    MusicBrainz {
        release_id: String,
        #[source]
        source: UpstreamError,
    },
}

/// Result type for verification
pub type VerifyResult<T> = Result<T, VerifyError>;
