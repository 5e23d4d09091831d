use eclipse_core::paths::ensure_dir;
use eclipse_core::{InstallError, ProgressSink};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::fs;
use std::path::{Path, PathBuf};

use crate::download::{download_if_needed, DOWNLOAD_CONCURRENCY};
use crate::manifest::{AssetIndex, AssetIndexData, Download};

/// Fetches the asset index, then every object it lists. Objects already on
/// disk are kept only when their hash matches.
pub async fn sync_assets(
    client: &Client,
    resources_url: &str,
    assets_dir: &Path,
    asset_index: &AssetIndex,
    progress: &dyn ProgressSink,
) -> Result<(), InstallError> {
    ensure_dir(&assets_dir.join("indexes"))?;
    ensure_dir(&assets_dir.join("objects"))?;

    let index_path = assets_dir
        .join("indexes")
        .join(format!("{}.json", asset_index.id));
    download_if_needed(client, &asset_index.as_download(), &index_path).await?;

    let index: AssetIndexData = serde_json::from_slice(&fs::read(&index_path)?)?;
    let mut jobs: Vec<(Download, PathBuf)> = Vec::with_capacity(index.objects.len());
    for asset in index.objects.values() {
        let (url, path) = object_location(resources_url, assets_dir, &asset.hash)?;
        let download = Download {
            path: None,
            url,
            sha1: Some(asset.hash.clone()),
            size: Some(asset.size),
        };
        jobs.push((download, path));
    }
    progress.set_max(jobs.len() as u64);

    let mut stream = stream::iter(jobs.into_iter().map(|(download, path)| {
        let client = client.clone();
        async move { download_if_needed(&client, &download, &path).await }
    }))
    .buffer_unordered(DOWNLOAD_CONCURRENCY);

    let mut done = 0u64;
    while let Some(result) = stream.next().await {
        result?;
        done += 1;
        progress.set_progress(done);
    }

    Ok(())
}

/// Objects are sharded by the first two hex digits of their hash.
pub(crate) fn object_location(
    resources_url: &str,
    assets_dir: &Path,
    hash: &str,
) -> Result<(String, PathBuf), InstallError> {
    let prefix = hash
        .get(0..2)
        .ok_or_else(|| format!("Malformed asset hash '{hash}'"))?;
    let url = format!("{}/{prefix}/{hash}", resources_url.trim_end_matches('/'));
    let path = assets_dir.join("objects").join(prefix).join(hash);
    Ok((url, path))
}
