//! Streaming HTTP downloads with progress reporting.
//!
//! Release artifacts carry no published checksum, so the SHA-256 of the
//! payload is computed while streaming and logged for traceability.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::Client;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::Reporter;

/// Errors from fetching a release artifact.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Transport failure or a non-success status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The destination file could not be written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A completed download.
#[derive(Debug, Clone)]
pub struct Downloaded {
    /// Where the payload was written
    pub path: PathBuf,
    /// Payload size in bytes
    pub size: u64,
    /// Hex-encoded SHA-256 of the payload
    pub sha256: String,
}

/// Build the HTTP client used for release downloads.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn client() -> Result<Client, DownloadError> {
    Ok(Client::builder().user_agent(crate::USER_AGENT).build()?)
}

/// Download `url` into `dest`, reporting progress under `dest`'s file name.
///
/// A non-success HTTP status is an error and leaves no file behind.
///
/// # Errors
///
/// Returns [`DownloadError::Http`] for transport or status errors and
/// [`DownloadError::Io`] if `dest` cannot be written.
pub async fn download_to_file(
    client: &Client,
    url: &str,
    dest: &Path,
    reporter: &dyn Reporter,
) -> Result<Downloaded, DownloadError> {
    let name = dest
        .file_name()
        .map_or_else(
            || crate::layout::filename_from_url(url).to_string(),
            |n| n.to_string_lossy().into_owned(),
        );

    tracing::debug!("Downloading {url} -> {}", dest.display());

    let response = match client.get(url).send().await?.error_for_status() {
        Ok(r) => r,
        Err(e) => {
            reporter.failed(&name, &e.to_string());
            return Err(e.into());
        }
    };

    let total_size = response.content_length();
    reporter.downloading(&name, 0, total_size);

    let mut file = File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut hasher = Sha256::new();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                reporter.failed(&name, &e.to_string());
                drop(file);
                tokio::fs::remove_file(dest).await.ok();
                return Err(e.into());
            }
        };
        file.write_all(&chunk).await?;
        hasher.update(&chunk);
        downloaded += chunk.len() as u64;
        reporter.downloading(&name, downloaded, total_size);
    }

    file.flush().await?;
    let sha256 = hex::encode(hasher.finalize());

    tracing::info!("Downloaded {name} ({downloaded} bytes, sha256 {sha256})");
    reporter.done(&name, "downloaded", Some(downloaded));

    Ok(Downloaded {
        path: dest.to_path_buf(),
        size: downloaded,
        sha256,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullReporter;

    #[tokio::test]
    async fn test_download_writes_file_and_hashes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/releases/download/R65/VapourSynth64-Portable-R65.zip")
            .with_status(200)
            .with_body("hello")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("VapourSynth64-Portable-R65.zip");
        let url = format!(
            "{}/releases/download/R65/VapourSynth64-Portable-R65.zip",
            server.url()
        );

        let downloaded = download_to_file(&client().unwrap(), &url, &dest, &NullReporter)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(downloaded.size, 5);
        assert_eq!(
            downloaded.sha256,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(std::fs::read(&dest).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_download_fails_on_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/archive/R99.tar.gz")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("R99.tar.gz");
        let url = format!("{}/archive/R99.tar.gz", server.url());

        let err = download_to_file(&client().unwrap(), &url, &dest, &NullReporter)
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Http(_)));
        assert!(!dest.exists());
    }
}
