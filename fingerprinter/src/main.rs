//! fingerprinter - audio identification and metadata verification
//!
//! Subcommands:
//! - `fingerprint`: print the Chromaprint fingerprint of audio files
//! - `acoustid`: look fingerprints up in AcoustID
//! - `musicbrainz`: print release or recording metadata
//! - `verify`: reconcile AcoustID matches with MusicBrainz releases
//!
//! Logs go to stderr; stdout carries only command output.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fingerprinter::services::{
    AcousticLookup, AcoustIdClient, AppIdentity, ChromaprintFingerprinter, FingerprintSource,
    MusicBrainzClient,
};
use fingerprinter::AudioVerifier;
use fingerprinter_common::config::{self, Settings, TomlConfig, CONFIG_PATH_ENV_VAR};

/// Command-line arguments for fingerprinter
#[derive(Parser, Debug)]
#[command(name = "fingerprinter")]
#[command(about = "Identify audio files and verify their release metadata")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, env = CONFIG_PATH_ENV_VAR)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the fingerprint of an audio file or of every file in a directory
    Fingerprint {
        /// Audio file or directory
        #[arg(short = 'a', long = "audiopath")]
        audio_path: PathBuf,
    },

    /// Look fingerprints up in AcoustID
    Acoustid {
        /// Audio file or directory
        #[arg(short = 'a', long = "audiopath")]
        audio_path: PathBuf,

        /// AcoustID application key
        #[arg(short = 'k', long = "apikey")]
        api_key: Option<String>,
    },

    /// Print MusicBrainz release or recording metadata
    Musicbrainz {
        /// Release MBID
        #[arg(short = 'r', long = "release", required_unless_present = "recording")]
        release: Option<String>,

        /// Recording MBID
        #[arg(short = 'c', long = "recording", conflicts_with = "release")]
        recording: Option<String>,

        #[command(flatten)]
        identity: IdentityArgs,
    },

    /// Verify audio files and report the releases they belong to
    Verify {
        /// Audio file or directory
        #[arg(short = 'a', long = "audiopath")]
        audio_path: PathBuf,

        /// AcoustID application key
        #[arg(short = 'k', long = "apikey")]
        api_key: Option<String>,

        #[command(flatten)]
        identity: IdentityArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Identity sent to MusicBrainz in the User-Agent
#[derive(Args, Debug)]
struct IdentityArgs {
    /// Application name
    #[arg(short = 'n', long = "appname")]
    app_name: Option<String>,

    /// Application semantic version
    #[arg(short = 's', long = "semver")]
    semver: Option<String>,

    /// Contact email address
    #[arg(short = 'e', long = "email")]
    email: Option<String>,
}

impl IdentityArgs {
    fn resolve(self, settings: &Settings) -> Result<AppIdentity> {
        let contact_email = self
            .email
            .filter(|e| config::is_valid_key(e))
            .or_else(|| settings.contact_email.clone());

        let Some(contact_email) = contact_email else {
            bail!(
                "contact email not configured (use --email or {})",
                config::CONTACT_EMAIL_ENV_VAR
            );
        };

        Ok(AppIdentity::new(
            self.app_name.unwrap_or_else(|| settings.app_name.clone()),
            self.semver.unwrap_or_else(|| settings.app_version.clone()),
            contact_email,
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(config::config_file_path);
    let toml_config = match &config_path {
        Some(path) => config::load_toml_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => TomlConfig::default(),
    };
    let settings = Settings::from_toml(&toml_config);

    // RUST_LOG overrides the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "fingerprinter {} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        fingerprinter::GIT_HASH,
        fingerprinter::BUILD_TIMESTAMP,
        fingerprinter::BUILD_PROFILE
    );

    match config_path.as_deref().filter(|p| p.exists()) {
        Some(path) => info!(path = %path.display(), "Loaded configuration file"),
        None => debug!("No configuration file, using defaults"),
    }

    match cli.command {
        Command::Fingerprint { audio_path } => run_fingerprint(&settings, &audio_path).await,
        Command::Acoustid {
            audio_path,
            api_key,
        } => run_acoustid(&settings, &toml_config, &audio_path, api_key.as_deref()).await,
        Command::Musicbrainz {
            release,
            recording,
            identity,
        } => run_musicbrainz(&settings, identity, release, recording).await,
        Command::Verify {
            audio_path,
            api_key,
            identity,
            json,
        } => {
            run_verify(
                &settings,
                &toml_config,
                &audio_path,
                api_key.as_deref(),
                identity,
                json,
            )
            .await
        }
    }
}

fn build_fingerprinter(settings: &Settings) -> ChromaprintFingerprinter {
    ChromaprintFingerprinter::new(&settings.fpcalc_path).with_max_workers(settings.max_workers)
}

async fn run_fingerprint(settings: &Settings, audio_path: &Path) -> Result<()> {
    let fingerprints = build_fingerprinter(settings)
        .extract(audio_path)
        .await
        .context("Fingerprint extraction failed")?;

    for fp in &fingerprints {
        println!("{}", fp.source_file.display());
        println!("  duration: {}s", fp.duration_seconds());
        println!("  fingerprint: {}", fp.value);
    }

    Ok(())
}

async fn run_acoustid(
    settings: &Settings,
    toml_config: &TomlConfig,
    audio_path: &Path,
    api_key: Option<&str>,
) -> Result<()> {
    let api_key = config::resolve_acoustid_api_key(api_key, toml_config)?;
    let client = AcoustIdClient::new(api_key).context("Failed to create AcoustID client")?;

    let fingerprints = build_fingerprinter(settings)
        .extract(audio_path)
        .await
        .context("Fingerprint extraction failed")?;

    for fp in &fingerprints {
        let lookup = client
            .lookup(fp, true)
            .await
            .with_context(|| format!("AcoustID lookup failed for {}", fp.source_file.display()))?;

        println!("{}", fp.source_file.display());
        if lookup.results.is_empty() {
            println!("  no results");
        }

        for result in &lookup.results {
            println!("  score: {:.4} acoustid: {}", result.score, result.id);
            for recording in &result.recordings {
                println!("    recording: {}", recording.id);
                for group in &recording.release_groups {
                    let releases: Vec<&str> =
                        group.releases.iter().map(|r| r.id.as_str()).collect();
                    println!(
                        "      release group: {} \"{}\" releases: {}",
                        group.id,
                        group.title,
                        releases.join(", ")
                    );
                }
            }
        }
    }

    Ok(())
}

async fn run_musicbrainz(
    settings: &Settings,
    identity: IdentityArgs,
    release: Option<String>,
    recording: Option<String>,
) -> Result<()> {
    let identity = identity.resolve(settings)?;
    let client = MusicBrainzClient::new(&identity).context("Failed to create MusicBrainz client")?;

    let output = match (release, recording) {
        (Some(release_id), _) => {
            let info = client
                .get_release_info(&release_id)
                .await
                .with_context(|| format!("MusicBrainz lookup failed for release {}", release_id))?;
            serde_json::to_string_pretty(&info)?
        }
        (None, Some(recording_id)) => {
            let info = client
                .get_recording_info(&recording_id)
                .await
                .with_context(|| {
                    format!("MusicBrainz lookup failed for recording {}", recording_id)
                })?;
            serde_json::to_string_pretty(&info)?
        }
        (None, None) => bail!("either --release or --recording is required"),
    };

    println!("{}", output);
    Ok(())
}

async fn run_verify(
    settings: &Settings,
    toml_config: &TomlConfig,
    audio_path: &Path,
    api_key: Option<&str>,
    identity: IdentityArgs,
    json: bool,
) -> Result<()> {
    let api_key = config::resolve_acoustid_api_key(api_key, toml_config)?;
    let identity = identity.resolve(settings)?;

    let acoustid = AcoustIdClient::new(api_key).context("Failed to create AcoustID client")?;
    let musicbrainz =
        MusicBrainzClient::new(&identity).context("Failed to create MusicBrainz client")?;

    let verifier = AudioVerifier::new(
        Arc::new(build_fingerprinter(settings)),
        Arc::new(acoustid),
        Arc::new(musicbrainz),
    )
    .with_fetch_interval(Duration::from_millis(settings.musicbrainz_delay_ms));

    let report = verifier
        .analyze(audio_path)
        .await
        .with_context(|| format!("Verification of {} failed", audio_path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report);
    }

    Ok(())
}
