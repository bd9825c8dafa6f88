//! Service modules: the collaborators of the verifier
//!
//! - `file_scanner`: qualifying audio files of a directory
//! - `fingerprinter`: Chromaprint fingerprints via the `fpcalc` tool
//! - `acoustid_client`: fingerprint → scored recordings and release groups
//! - `musicbrainz_client`: release/recording id → descriptive metadata
//! - `rate_limiter`: request pacing for rate-limited upstreams

pub mod acoustid_client;
pub mod file_scanner;
pub mod fingerprinter;
pub mod musicbrainz_client;
pub mod rate_limiter;

pub use acoustid_client::{AcousticLookup, AcoustIdClient};
pub use file_scanner::FileScanner;
pub use fingerprinter::{ChromaprintFingerprinter, FingerprintSource};
pub use musicbrainz_client::{AppIdentity, MusicBrainzClient, ReleaseCatalog};
pub use rate_limiter::RequestPacer;
