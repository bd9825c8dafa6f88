//! Audio fingerprinting through Chromaprint's `fpcalc` tool
//!
//! A single file is fingerprinted directly. A directory fans out one task per
//! audio file, bounded by `max_workers`; every task is joined before the scan
//! decides between success and the first reported error.

use crate::error::FingerprintError;
use crate::models::Fingerprint;
use crate::services::file_scanner::FileScanner;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Default number of concurrent fpcalc processes
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// Source of per-file fingerprints
#[async_trait]
pub trait FingerprintSource: Send + Sync {
    /// Fingerprint a single audio file, or every audio file of a directory
    ///
    /// # Errors
    /// `PathNotFound` if the path does not exist, `UnsupportedFormat` for a
    /// file with an unsupported extension, or the first per-file failure of a
    /// directory scan.
    async fn extract(&self, path: &Path) -> Result<Vec<Fingerprint>, FingerprintError>;
}

/// Fingerprinter backed by the `fpcalc` command-line tool
pub struct ChromaprintFingerprinter {
    fpcalc_path: PathBuf,
    scanner: FileScanner,
    max_workers: usize,
}

impl ChromaprintFingerprinter {
    /// Create new fingerprinter running the given fpcalc binary
    pub fn new(fpcalc_path: impl Into<PathBuf>) -> Self {
        Self {
            fpcalc_path: fpcalc_path.into(),
            scanner: FileScanner::new(),
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }

    /// Set the concurrent fpcalc process limit (at least 1)
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Replace the file scanner (e.g. to accept other extensions)
    pub fn with_scanner(mut self, scanner: FileScanner) -> Self {
        self.scanner = scanner;
        self
    }

    /// Fingerprint one file, checking its extension first
    pub async fn fingerprint_file(&self, path: &Path) -> Result<Fingerprint, FingerprintError> {
        if !self.scanner.is_supported(path) {
            return Err(FingerprintError::UnsupportedFormat(path.to_path_buf()));
        }

        run_fpcalc(&self.fpcalc_path, path).await
    }

    async fn scan_directory(&self, dir: &Path) -> Result<Vec<Fingerprint>, FingerprintError> {
        let files = self.scanner.scan(dir)?;

        info!(
            dir = %dir.display(),
            files = files.len(),
            workers = self.max_workers,
            "Fingerprinting directory"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut workers = JoinSet::new();

        for file in files {
            let semaphore = Arc::clone(&semaphore);
            let fpcalc = self.fpcalc_path.clone();

            workers.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| FingerprintError::WorkerFailed(e.to_string()))?;
                run_fpcalc(&fpcalc, &file).await
            });
        }

        // Drain every worker before deciding, so none is left running
        let mut fingerprints = Vec::new();
        let mut first_error = None;

        while let Some(joined) = workers.join_next().await {
            let result = joined.unwrap_or_else(|e| Err(FingerprintError::WorkerFailed(e.to_string())));

            match result {
                Ok(fingerprint) => fingerprints.push(fingerprint),
                Err(e) => {
                    debug!(error = %e, "Fingerprint worker reported an error");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        fingerprints.sort_by(|a, b| a.source_file.cmp(&b.source_file));
        Ok(fingerprints)
    }
}

impl Default for ChromaprintFingerprinter {
    fn default() -> Self {
        Self::new("fpcalc")
    }
}

#[async_trait]
impl FingerprintSource for ChromaprintFingerprinter {
    async fn extract(&self, path: &Path) -> Result<Vec<Fingerprint>, FingerprintError> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FingerprintError::PathNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(FingerprintError::IoError(e)),
        };

        if metadata.is_dir() {
            self.scan_directory(path).await
        } else {
            Ok(vec![self.fingerprint_file(path).await?])
        }
    }
}

/// Run `fpcalc -json <file>` and parse its output
async fn run_fpcalc(fpcalc: &Path, file: &Path) -> Result<Fingerprint, FingerprintError> {
    debug!(file = %file.display(), "Running fpcalc");

    let output = Command::new(fpcalc)
        .arg("-json")
        .arg(file)
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FingerprintError::ToolNotFound(fpcalc.to_path_buf()),
            _ => FingerprintError::IoError(e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(FingerprintError::ToolFailed {
            path: file.to_path_buf(),
            message: if stderr.is_empty() {
                format!("exit status {}", output.status)
            } else {
                stderr
            },
        });
    }

    let mut fingerprint: Fingerprint =
        serde_json::from_slice(&output.stdout).map_err(|e| FingerprintError::ParseError {
            path: file.to_path_buf(),
            message: e.to_string(),
        })?;
    fingerprint.source_file = file.to_path_buf();

    debug!(
        file = %file.display(),
        duration = fingerprint.duration,
        "Fingerprint computed"
    );

    Ok(fingerprint)
}
