//! fingerprinter library interface
//!
//! Identifies audio files through their Chromaprint fingerprint (AcoustID)
//! and reconciles the matching MusicBrainz release metadata into one
//! deduplicated [`Report`].

pub mod error;
pub mod models;
pub mod services;
pub mod verifier;

pub use crate::error::{FingerprintError, UpstreamError, VerifyError, VerifyResult};
pub use crate::models::Report;
pub use crate::verifier::AudioVerifier;

/// Build identification embedded by `build.rs`
pub const GIT_HASH: &str = env!("GIT_HASH");
pub const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");
pub const BUILD_PROFILE: &str = env!("BUILD_PROFILE");
