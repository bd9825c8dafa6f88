//! MusicBrainz API client
//!
//! Fetches release and recording metadata by MBID.
//!
//! # API Reference
//! - Endpoints: https://musicbrainz.org/ws/2/release/{mbid},
//!   https://musicbrainz.org/ws/2/recording/{mbid}
//! - Rate Limit: 1 request/second. The client does not pace itself; callers
//!   issuing several requests use [`crate::services::RequestPacer`].
//! - Requests must carry a meaningful User-Agent:
//!   https://musicbrainz.org/doc/MusicBrainz_API/Rate_Limiting

use crate::error::UpstreamError;
use crate::models::{Author, Label, RecordingInfo, ReleaseInfo, ReleaseSummary, TrackInfo};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

pub const MUSICBRAINZ_BASE_URL: &str = "https://musicbrainz.org/ws/2";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Includes requested with a release lookup
const RELEASE_INCLUDES: &[&str] = &["artists", "labels", "isrcs", "recordings", "artist-credits"];
/// Includes requested with a recording lookup
const RECORDING_INCLUDES: &[&str] = &["artists", "isrcs", "releases"];

/// Release metadata seam used by the verifier
#[async_trait]
pub trait ReleaseCatalog: Send + Sync {
    async fn release_info(&self, release_id: &str) -> Result<ReleaseInfo, UpstreamError>;
}

/// Application identity sent in the User-Agent
#[derive(Debug, Clone)]
pub struct AppIdentity {
    pub name: String,
    pub version: String,
    pub contact_email: String,
}

impl AppIdentity {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        contact_email: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            contact_email: contact_email.into(),
        }
    }

    /// `"<app>/<semver> ( <email> )"`
    pub fn user_agent(&self) -> String {
        format!("{}/{} ( {} )", self.name, self.version, self.contact_email)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct MbErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct MbRelease {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<MbArtistCredit>,
    #[serde(rename = "label-info", default)]
    label_info: Vec<MbLabelInfo>,
    #[serde(default)]
    media: Vec<MbMedia>,
}

#[derive(Debug, Deserialize)]
struct MbArtistCredit {
    name: String,
    artist: MbArtist,
}

#[derive(Debug, Deserialize)]
struct MbArtist {
    id: String,
    #[serde(default)]
    disambiguation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MbLabelInfo {
    #[serde(default)]
    label: Option<MbLabel>,
}

#[derive(Debug, Deserialize)]
struct MbLabel {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    disambiguation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MbMedia {
    #[serde(default)]
    tracks: Vec<MbTrack>,
}

#[derive(Debug, Deserialize)]
struct MbTrack {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    position: u32,
    #[serde(default)]
    length: Option<u64>,
    recording: MbTrackRecording,
}

#[derive(Debug, Deserialize)]
struct MbTrackRecording {
    id: String,
    #[serde(default)]
    isrcs: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MbRecording {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    length: Option<u64>,
    #[serde(default)]
    isrcs: Vec<String>,
    #[serde(default)]
    releases: Vec<MbReleaseSummary>,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<MbArtistCredit>,
    #[serde(rename = "first-release-date", default)]
    first_release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MbReleaseSummary {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    country: Option<String>,
}

impl From<MbArtistCredit> for Author {
    fn from(credit: MbArtistCredit) -> Self {
        Author {
            id: credit.artist.id,
            name: credit.name,
            description: credit.artist.disambiguation.unwrap_or_default(),
        }
    }
}

impl From<MbLabel> for Label {
    fn from(label: MbLabel) -> Self {
        Label {
            id: label.id,
            name: label.name,
            description: label.disambiguation.unwrap_or_default(),
        }
    }
}

impl From<MbTrack> for TrackInfo {
    fn from(track: MbTrack) -> Self {
        TrackInfo {
            id: track.id,
            title: track.title,
            position: track.position,
            duration_millis: track.length,
            recording_id: track.recording.id,
            isrc_codes: track.recording.isrcs.into_iter().collect(),
        }
    }
}

impl From<MbRelease> for ReleaseInfo {
    fn from(release: MbRelease) -> Self {
        ReleaseInfo {
            release_date: release.date.as_deref().and_then(parse_release_date),
            id: release.id,
            title: release.title,
            authors: release.artist_credit.into_iter().map(Author::from).collect(),
            labels: release
                .label_info
                .into_iter()
                .filter_map(|info| info.label)
                .map(Label::from)
                .collect(),
            tracks: release
                .media
                .into_iter()
                .flat_map(|media| media.tracks)
                .map(TrackInfo::from)
                .collect(),
        }
    }
}

impl From<MbRecording> for RecordingInfo {
    fn from(recording: MbRecording) -> Self {
        RecordingInfo {
            first_release_date: recording
                .first_release_date
                .as_deref()
                .and_then(parse_release_date),
            id: recording.id,
            title: recording.title,
            duration_millis: recording.length,
            isrc_codes: recording.isrcs.into_iter().collect(),
            releases: recording
                .releases
                .into_iter()
                .map(|r| ReleaseSummary {
                    id: r.id,
                    title: r.title,
                    country: r.country,
                })
                .collect(),
            authors: recording.artist_credit.into_iter().map(Author::from).collect(),
        }
    }
}

/// Parse a MusicBrainz partial date
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM` (first of the month) and `YYYY`
/// (January 1st). Anything else, including an empty string, is `None`.
pub fn parse_release_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let mut parts = value.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = match parts.next() {
        Some(m) => m.parse().ok()?,
        None => 1,
    };
    let day: u32 = match parts.next() {
        Some(d) => d.parse().ok()?,
        None => 1,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

// ============================================================================
// Client
// ============================================================================

/// MusicBrainz API client
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl MusicBrainzClient {
    /// Create client for the public MusicBrainz service
    pub fn new(identity: &AppIdentity) -> Result<Self, UpstreamError> {
        Self::with_base_url(identity, MUSICBRAINZ_BASE_URL)
    }

    /// Create client for a custom web service root (e.g. a mirror)
    pub fn with_base_url(
        identity: &AppIdentity,
        base_url: impl Into<String>,
    ) -> Result<Self, UpstreamError> {
        let http_client = reqwest::Client::builder()
            .user_agent(identity.user_agent())
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch release metadata: authors, labels and the full track listing
    pub async fn get_release_info(&self, release_id: &str) -> Result<ReleaseInfo, UpstreamError> {
        let release: MbRelease = self.get_entity("release", release_id, RELEASE_INCLUDES).await?;
        let release = ReleaseInfo::from(release);

        info!(
            release_id = %release_id,
            title = %release.title,
            tracks = release.tracks.len(),
            "Retrieved release from MusicBrainz"
        );

        Ok(release)
    }

    /// Fetch recording metadata: ISRCs, releases and artist credits
    pub async fn get_recording_info(
        &self,
        recording_id: &str,
    ) -> Result<RecordingInfo, UpstreamError> {
        let recording: MbRecording = self
            .get_entity("recording", recording_id, RECORDING_INCLUDES)
            .await?;
        let recording = RecordingInfo::from(recording);

        info!(
            recording_id = %recording_id,
            title = %recording.title,
            "Retrieved recording from MusicBrainz"
        );

        Ok(recording)
    }

    async fn get_entity<T: DeserializeOwned>(
        &self,
        entity: &str,
        mbid: &str,
        includes: &[&str],
    ) -> Result<T, UpstreamError> {
        let url = format!(
            "{}/{}/{}?fmt=json&inc={}",
            self.base_url,
            entity,
            mbid,
            includes.join("+")
        );

        debug!(mbid = %mbid, url = %url, "Querying MusicBrainz API");

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<MbErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| body.trim().to_string());
            return Err(UpstreamError::Api {
                code: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ReleaseCatalog for MusicBrainzClient {
    async fn release_info(&self, release_id: &str) -> Result<ReleaseInfo, UpstreamError> {
        self.get_release_info(release_id).await
    }
}
