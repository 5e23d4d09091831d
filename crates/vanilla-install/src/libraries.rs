use eclipse_core::paths::ensure_dir;
use eclipse_core::{InstallError, ProgressSink};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::fs::File;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

use crate::args::{classpath_separator, current_arch, current_os_key, rules_allow};
use crate::download::{download_if_needed, DOWNLOAD_CONCURRENCY};
use crate::manifest::{Download, Library};

/// Where each applicable library lives on disk and what has to be fetched.
#[derive(Debug, Default)]
pub struct LibraryPlan {
    pub classpath: Vec<PathBuf>,
    pub natives: Vec<NativeJar>,
    pub downloads: Vec<(Download, PathBuf)>,
}

/// A native classifier jar plus the entry prefixes its library asks to skip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeJar {
    pub path: PathBuf,
    pub exclude: Vec<String>,
}

pub fn plan_libraries(libraries_dir: &Path, libraries: &[Library]) -> LibraryPlan {
    let mut plan = LibraryPlan::default();
    let os_key = current_os_key();

    for library in libraries.iter().filter(|lib| rules_allow(lib.rules.as_deref())) {
        let Some(downloads) = &library.downloads else {
            continue;
        };

        if let Some(artifact) = &downloads.artifact {
            let path = libraries_dir.join(
                artifact
                    .path
                    .clone()
                    .unwrap_or_else(|| library_path_from_name(&library.name)),
            );
            plan.classpath.push(path.clone());
            plan.downloads.push((artifact.clone(), path));
        }

        let classifier = library
            .natives
            .as_ref()
            .and_then(|natives| natives.get(os_key))
            .map(|classifier| classifier.replace("${arch}", current_arch()));
        let native = classifier.and_then(|classifier| {
            downloads
                .classifiers
                .as_ref()
                .and_then(|classifiers| classifiers.get(&classifier))
        });
        if let Some(native) = native {
            let path = libraries_dir.join(
                native
                    .path
                    .clone()
                    .unwrap_or_else(|| library_path_from_name(&library.name)),
            );
            plan.natives.push(NativeJar {
                path: path.clone(),
                exclude: library
                    .extract
                    .as_ref()
                    .map(|extract| extract.exclude.clone())
                    .unwrap_or_default(),
            });
            plan.downloads.push((native.clone(), path));
        }
    }

    plan
}

pub async fn sync_libraries(
    client: &Client,
    plan: &LibraryPlan,
    progress: &dyn ProgressSink,
) -> Result<(), InstallError> {
    let total = plan.downloads.len() as u64;
    progress.set_max(total);
    if total == 0 {
        return Ok(());
    }

    let mut stream = stream::iter(plan.downloads.iter().cloned().map(|(download, path)| {
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

pub fn extract_natives(native: &NativeJar, natives_dir: &Path) -> Result<(), InstallError> {
    let path = native.path.as_path();
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|err| format!("Failed to read native jar {}: {err}", path.display()))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|err| format!("Zip error in {}: {err}", path.display()))?;
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let name = entry.name().to_string();
        if entry.is_dir()
            || name.starts_with("META-INF/")
            || native.exclude.iter().any(|pattern| name.starts_with(pattern.as_str()))
        {
            continue;
        }

        let out_path = natives_dir.join(relative);
        if let Some(parent) = out_path.parent() {
            ensure_dir(parent)?;
        }
        let mut outfile = File::create(&out_path)?;
        std::io::copy(&mut entry, &mut outfile)?;
    }

    Ok(())
}

pub fn build_classpath(libraries: &[PathBuf], client_jar: &Path) -> String {
    libraries
        .iter()
        .map(|path| path.to_string_lossy().to_string())
        .chain(std::iter::once(client_jar.to_string_lossy().to_string()))
        .collect::<Vec<_>>()
        .join(classpath_separator())
}

pub(crate) fn library_path_from_name(name: &str) -> String {
    let parts: Vec<&str> = name.split(':').collect();
    if parts.len() < 3 {
        return name.replace(':', "/");
    }
    let group = parts[0].replace('.', "/");
    let artifact = parts[1];
    let version = parts[2];

    let filename = match parts.get(3) {
        Some(classifier) => format!("{artifact}-{version}-{classifier}.jar"),
        None => format!("{artifact}-{version}.jar"),
    };

    format!("{group}/{artifact}/{version}/{filename}")
}
