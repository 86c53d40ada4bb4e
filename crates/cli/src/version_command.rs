//! Release check against the published CLI releases.

use anyhow::{Context, Result};
use serde::Deserialize;

const RELEASES_URL: &str = "https://api.github.com/repos/strato-dev/strato-cli/releases/latest";
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Deserialize)]
struct ReleaseMetadata {
    tag_name: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    body: String,
}

pub async fn version() -> Result<()> {
    let release = latest_release(RELEASES_URL).await?;
    println!("{}", version_message(CURRENT_VERSION, &release));
    Ok(())
}

async fn latest_release(url: &str) -> Result<ReleaseMetadata> {
    let client = reqwest::Client::new();
    client
        .get(url)
        // The GitHub API rejects requests without a User-Agent.
        .header("User-Agent", concat!("strato/", env!("CARGO_PKG_VERSION")))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
        .context("could not read the latest release metadata")
}

fn version_message(current: &str, release: &ReleaseMetadata) -> String {
    if release.tag_name.trim_start_matches('v') == current {
        format!("Current version: {current}\n\nYou're up to date!")
    } else {
        format!(
            "Current version: {current}\n\nA new version of strato has been released: {} ({})\n\n{}",
            release.tag_name, release.name, release.body
        )
    }
}
