//! New version check against the project's GitHub releases
//!
//! Checks are rate limited through `Settings::last_update_check`; failures are
//! logged and otherwise ignored.

use crate::error::{OverlayError, Result, StringError};
use semver::Version;
use serde::Deserialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// GitHub owner of the project
pub const REPO_OWNER: &str = "FluffyMaguro";

/// GitHub repository of the project
pub const REPO_NAME: &str = "AoE4_Overlay";

/// Minimum time between two checks
pub const MIN_CHECK_INTERVAL_SECS: u64 = 60 * 60 * 6;

#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
    #[serde(default)]
    prerelease: bool,
    #[serde(default)]
    html_url: Option<String>,
}

/// A release newer than the running version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableUpdate {
    /// Version of the release
    pub version: Version,
    /// Page to download it from
    pub url: String,
}

/// Update checker
pub struct UpdateChecker {
    api_url: String,
    current_version: Version,
    min_check_interval_secs: u64,
}

impl UpdateChecker {
    /// Checker for this build against the project's releases
    pub fn for_this_build() -> Result<Self> {
        let current = Version::parse(crate::VERSION)
            .map_err(|e| OverlayError::ConfigError(Box::new(e)))?;
        Ok(Self::new(
            format!("https://api.github.com/repos/{REPO_OWNER}/{REPO_NAME}/releases/latest"),
            current,
            MIN_CHECK_INTERVAL_SECS,
        ))
    }

    /// Checker querying `api_url` (a GitHub "latest release" endpoint)
    pub fn new(api_url: impl Into<String>, current_version: Version, min_check_interval_secs: u64) -> Self {
        Self {
            api_url: api_url.into(),
            current_version,
            min_check_interval_secs,
        }
    }

    /// Whether enough time has passed since `last_check_time` (0 = never checked)
    pub fn should_check(&self, last_check_time: u64) -> bool {
        if last_check_time == 0 {
            return true;
        }
        let elapsed = current_timestamp().saturating_sub(last_check_time);
        elapsed >= self.min_check_interval_secs
    }

    /// Query the latest release; `Ok(None)` when already up to date
    pub fn check_for_updates(&self) -> Result<Option<AvailableUpdate>> {
        info!("Checking for a new version");

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(format!("AoE4_Overlay/{}", self.current_version))
            .build()
            .map_err(|e| OverlayError::ApiError(Box::new(e)))?;

        let response = client.get(&self.api_url).send().map_err(|e| {
            warn!("Failed to fetch latest release: {}", e);
            OverlayError::ApiError(Box::new(e))
        })?;

        if !response.status().is_success() {
            warn!("GitHub API returned error status: {}", response.status());
            return Err(OverlayError::ApiStatus(response.status().as_u16()));
        }

        let release: GitHubRelease = response
            .json()
            .map_err(|e| OverlayError::ApiError(Box::new(e)))?;
        debug!("Fetched release: {:?}", release);

        self.evaluate(release)
    }

    fn evaluate(&self, release: GitHubRelease) -> Result<Option<AvailableUpdate>> {
        if release.prerelease {
            info!("Latest release is a prerelease, skipping");
            return Ok(None);
        }

        let tag = release.tag_name.trim_start_matches('v');
        let latest = Version::parse(tag).map_err(|e| {
            warn!("Failed to parse version from tag '{}': {}", tag, e);
            OverlayError::ApiError(StringError::new(format!("Unparsable release tag '{tag}'")))
        })?;

        if latest > self.current_version {
            info!("Update available: {} -> {}", self.current_version, latest);
            Ok(Some(AvailableUpdate {
                url: release.html_url.unwrap_or_else(|| {
                    format!("https://github.com/{REPO_OWNER}/{REPO_NAME}/releases")
                }),
                version: latest,
            }))
        } else {
            info!("Application is up to date");
            Ok(None)
        }
    }
}

/// Current Unix timestamp in seconds
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
