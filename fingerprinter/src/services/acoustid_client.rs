//! AcoustID API client
//!
//! Looks a Chromaprint fingerprint up in the AcoustID database and returns the
//! scored matches with their MusicBrainz recordings, release groups and
//! release ids.
//!
//! # API Reference
//! - Endpoint: POST https://api.acoustid.org/v2/lookup (form encoded)
//! - Rate Limit: 3 requests/second per application key

use crate::error::UpstreamError;
use crate::models::{Fingerprint, LookupResponse};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const ACOUSTID_BASE_URL: &str = "https://api.acoustid.org/v2/lookup";
const USER_AGENT: &str = concat!("fingerprinter/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUESTS_PER_SECOND: u32 = 3;

/// Response metadata requested with every lookup
const LOOKUP_META: &str = "recordings recordingids releasegroups releasegroupids releaseids";

/// Fingerprint lookup seam used by the verifier
#[async_trait]
pub trait AcousticLookup: Send + Sync {
    /// Look up one fingerprint
    ///
    /// With `retry_on_unavailable`, an HTTP 503 answer is retried exactly once.
    async fn lookup(
        &self,
        fingerprint: &Fingerprint,
        retry_on_unavailable: bool,
    ) -> Result<LookupResponse, UpstreamError>;
}

/// AcoustID error body: `{"status": "error", "error": {"code": 3, "message": "..."}}`
#[derive(Debug, Deserialize)]
struct AcoustIdErrorBody {
    error: AcoustIdErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AcoustIdErrorDetail {
    message: String,
}

/// AcoustID API client
pub struct AcoustIdClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    rate_limiter: DefaultDirectRateLimiter,
}

impl AcoustIdClient {
    /// Create client for the public AcoustID service
    pub fn new(api_key: impl Into<String>) -> Result<Self, UpstreamError> {
        Self::with_base_url(api_key, ACOUSTID_BASE_URL)
    }

    /// Create client for a custom lookup endpoint
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, UpstreamError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let per_second = NonZeroU32::new(REQUESTS_PER_SECOND).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        })
    }

    async fn send_lookup(&self, fingerprint: &Fingerprint) -> Result<LookupResponse, UpstreamError> {
        self.rate_limiter.until_ready().await;

        let duration = fingerprint.duration_seconds().to_string();
        let params = [
            ("client", self.api_key.as_str()),
            ("meta", LOOKUP_META),
            ("duration", duration.as_str()),
            ("fingerprint", fingerprint.value.as_str()),
        ];

        debug!(
            file = %fingerprint.source_file.display(),
            duration_seconds = %duration,
            "Querying AcoustID API"
        );

        let response = self
            .http_client
            .post(&self.base_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }

        let lookup: LookupResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Parse(e.to_string()))?;

        if lookup.status != "ok" {
            return Err(UpstreamError::Api {
                code: status.as_u16(),
                message: format!("unexpected lookup status: {}", lookup.status),
            });
        }

        if let Some(top_result) = lookup.results.first() {
            info!(
                acoustid = %top_result.id,
                score = top_result.score,
                recordings = top_result.recordings.len(),
                "AcoustID lookup successful"
            );
        }

        Ok(lookup)
    }
}

#[async_trait]
impl AcousticLookup for AcoustIdClient {
    async fn lookup(
        &self,
        fingerprint: &Fingerprint,
        retry_on_unavailable: bool,
    ) -> Result<LookupResponse, UpstreamError> {
        match self.send_lookup(fingerprint).await {
            Err(e) if retry_on_unavailable && e.is_service_unavailable() => {
                warn!(
                    file = %fingerprint.source_file.display(),
                    "AcoustID service unavailable, retrying once"
                );
                self.send_lookup(fingerprint).await
            }
            other => other,
        }
    }
}

/// Build an `Api` error from a non-success body, falling back to the raw text
fn api_error(code: u16, body: &str) -> UpstreamError {
    let message = serde_json::from_str::<AcoustIdErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    UpstreamError::Api { code, message }
}
