use eclipse_core::paths::{ensure_dir, file_exists};
use eclipse_core::InstallError;
use futures::StreamExt;
use reqwest::header::RANGE;
use reqwest::{Client, StatusCode};
use sha1::{Digest, Sha1};
use std::path::Path;
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;

use crate::http::HttpError;
use crate::manifest::Download;

pub const DOWNLOAD_CONCURRENCY: usize = 12;

/// Downloads `download` to `path` unless a file with the expected hash (or,
/// lacking a hash, the expected size) is already there.
pub async fn download_if_needed(
    client: &Client,
    download: &Download,
    path: &Path,
) -> Result<(), InstallError> {
    let mut allow_resume = true;
    if file_exists(path) {
        if download.sha1.is_none() && download.size.is_none() {
            return Ok(());
        }
        if let Some(expected) = &download.sha1 {
            if let Ok(actual) = sha1_file(path) {
                if actual.eq_ignore_ascii_case(expected) {
                    return Ok(());
                }
            }
            allow_resume = false;
        }

        if allow_resume {
            if let Some(expected_size) = download.size {
                if let Ok(actual_size) = std::fs::metadata(path).map(|m| m.len()) {
                    if actual_size == expected_size {
                        return Ok(());
                    }
                }
            }
        }
    }

    download_raw(client, &download.url, path, download.size, allow_resume).await?;

    if let Some(expected) = &download.sha1 {
        let actual = sha1_file(path)?;
        if !actual.eq_ignore_ascii_case(expected) {
            let _ = std::fs::remove_file(path);
            return Err(InstallError::Message(format!(
                "Downloaded file hash mismatch for {}: expected {}, got {}",
                path.display(),
                expected,
                actual
            )));
        }
    }

    Ok(())
}

pub async fn download_raw(
    client: &Client,
    url: &str,
    path: &Path,
    expected_size: Option<u64>,
    allow_resume: bool,
) -> Result<(), InstallError> {
    let mut existing = if allow_resume && file_exists(path) {
        std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
    } else {
        0
    };

    if let Some(size) = expected_size {
        if existing >= size {
            return Ok(());
        }
    }

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let mut request = client.get(url);
    if existing > 0 {
        request = request.header(RANGE, format!("bytes={existing}-"));
    }
    let mut response = request.send().await.map_err(HttpError::Request)?;

    if existing > 0 {
        match response.status() {
            StatusCode::PARTIAL_CONTENT => {}
            StatusCode::RANGE_NOT_SATISFIABLE => {
                existing = 0;
                response = client.get(url).send().await.map_err(HttpError::Request)?;
            }
            status if status.is_success() => existing = 0,
            _ => {}
        }
    }

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(HttpError::Status { status, body }.into());
    }

    let mut file = if existing > 0 {
        async_fs::OpenOptions::new().append(true).open(path).await?
    } else {
        async_fs::File::create(path).await?
    };

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let bytes = chunk.map_err(HttpError::Request)?;
        file.write_all(&bytes).await?;
    }
    file.flush().await?;

    if let Some(size) = expected_size {
        let actual = std::fs::metadata(path).map(|m| m.len())?;
        if actual != size {
            return Err(InstallError::Message(format!(
                "Download incomplete for {url}: expected {size} bytes, got {actual} bytes"
            )));
        }
    }

    Ok(())
}

pub fn sha1_file(path: &Path) -> Result<String, InstallError> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha1::new();
    let mut buffer = [0u8; 8192];
    loop {
        let read = std::io::Read::read(&mut file, &mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}
