//! Download the schedule file to a local path.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, instrument};

use super::IngestError;

/// HTTP client for the remote schedule resource.
#[derive(Debug, Clone)]
pub struct ScheduleFetcher {
    http: reqwest::Client,
}

impl ScheduleFetcher {
    pub fn new(timeout: Duration) -> Result<Self, IngestError> {
        // reqwest is built with `rustls-no-provider`; `Err` only means a
        // provider is already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IngestError::Fetch(e.to_string()))?;
        Ok(Self { http })
    }

    /// Fetch `url` and store the body at `dest`, replacing any prior copy.
    ///
    /// The body is written to a sibling temporary file and renamed into
    /// place, so a failed fetch or write leaves the previous copy intact.
    /// Returns the number of bytes written.
    #[instrument(skip(self, dest), fields(dest = %dest.display()))]
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, IngestError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| IngestError::Fetch(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(IngestError::Fetch(format!("{url} returned {status}")));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| IngestError::Fetch(e.to_string()))?;

        write_replacing(dest, &body).await?;

        let len = body.len() as u64;
        info!(bytes = len, "Schedule file downloaded");
        Ok(len)
    }
}

fn temp_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

async fn write_replacing(dest: &Path, bytes: &[u8]) -> Result<(), IngestError> {
    let write_err = |e: std::io::Error| IngestError::Write(format!("{}: {e}", dest.display()));

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp = temp_path(dest);
    if let Err(e) = tokio::fs::write(&tmp, bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(write_err(e));
    }
    if let Err(e) = tokio::fs::rename(&tmp, dest).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(write_err(e));
    }
    Ok(())
}
