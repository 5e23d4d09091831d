//! Vanilla Minecraft implementation of [`eclipse_core::GameInstaller`].

mod args;
mod assets;
mod download;
mod http;
mod libraries;
mod manifest;

use async_trait::async_trait;
use eclipse_core::paths::{ensure_dir, file_exists};
use eclipse_core::{
    GameInstaller, InstallError, LaunchCommand, LaunchOptions, ProgressSink, VersionSummary,
};
use reqwest::Client;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

pub use http::HttpError;
pub use manifest::{RESOURCES_URL, VERSION_MANIFEST_URL};

use http::fetch_json;
use manifest::{VersionData, VersionManifest};

pub const DEFAULT_JAVA: &str = "java";
const LAUNCHER_NAME: &str = "eclipse-launcher";

pub struct VanillaInstaller {
    client: Client,
    java: PathBuf,
    manifest_url: String,
    resources_url: String,
}

impl VanillaInstaller {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            java: PathBuf::from(DEFAULT_JAVA),
            manifest_url: VERSION_MANIFEST_URL.to_string(),
            resources_url: RESOURCES_URL.to_string(),
        }
    }

    pub fn with_java(mut self, java: impl Into<PathBuf>) -> Self {
        self.java = java.into();
        self
    }

    pub fn with_manifest_url(mut self, url: impl Into<String>) -> Self {
        self.manifest_url = url.into();
        self
    }

    /// Base URL asset objects are fetched from, as `<base>/<hash prefix>/<hash>`.
    pub fn with_resources_url(mut self, url: impl Into<String>) -> Self {
        self.resources_url = url.into();
        self
    }

    async fn fetch_manifest(&self) -> Result<VersionManifest, InstallError> {
        Ok(fetch_json(&self.client, &self.manifest_url).await?)
    }

    /// Uses the copy under `versions/<id>/<id>.json` when present, otherwise
    /// resolves the version through the manifest.
    async fn resolve_version(
        &self,
        version: &str,
        game_dir: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<VersionData, InstallError> {
        if let Some(local) = read_local_version(game_dir, version)? {
            return Ok(local);
        }

        progress.set_status("Download version manifest");
        let manifest = self.fetch_manifest().await?;
        let version_ref = manifest
            .versions
            .iter()
            .find(|entry| entry.id == version)
            .ok_or_else(|| format!("Version {version} not found in manifest"))?;

        progress.set_status(&format!("Download {version}.json"));
        let data: VersionData = fetch_json(&self.client, &version_ref.url).await?;
        let folder = version_dir(game_dir, &data.id);
        ensure_dir(&folder)?;
        fs::write(
            version_json_path(game_dir, &data.id),
            serde_json::to_vec_pretty(&data)?,
        )?;
        Ok(data)
    }
}

impl Default for VanillaInstaller {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GameInstaller for VanillaInstaller {
    async fn available_versions(
        &self,
        game_dir: &Path,
    ) -> Result<Vec<VersionSummary>, InstallError> {
        let installed = installed_versions(game_dir);
        let manifest = match self.fetch_manifest().await {
            Ok(manifest) => manifest,
            Err(err) if !installed.is_empty() => {
                tracing::warn!("version manifest unavailable, listing installed versions only: {err}");
                return Ok(installed);
            }
            Err(err) => return Err(err),
        };

        let mut summaries: Vec<VersionSummary> = manifest
            .versions
            .into_iter()
            .map(|entry| VersionSummary {
                id: entry.id,
                kind: entry.kind,
            })
            .collect();
        let known: HashSet<String> = summaries.iter().map(|s| s.id.clone()).collect();
        summaries.extend(installed.into_iter().filter(|s| !known.contains(&s.id)));
        Ok(summaries)
    }

    async fn install(
        &self,
        version: &str,
        game_dir: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<(), InstallError> {
        let data = self.resolve_version(version, game_dir, progress).await?;
        if let Some(parent) = &data.inherits_from {
            return Err(format!(
                "Version {} inherits from {parent}; only vanilla versions can be installed",
                data.id
            )
            .into());
        }

        let downloads = data
            .downloads
            .as_ref()
            .ok_or_else(|| format!("Version {} has no client download", data.id))?;
        progress.set_status(&format!("Download {}.jar", data.id));
        download::download_if_needed(
            &self.client,
            &downloads.client,
            &client_jar_path(game_dir, &data.id),
        )
        .await?;

        progress.set_status("Download Libraries");
        let plan = libraries::plan_libraries(&game_dir.join("libraries"), &data.libraries);
        libraries::sync_libraries(&self.client, &plan, progress).await?;

        progress.set_status("Extract natives");
        let natives_dir = natives_dir(game_dir, &data.id);
        if natives_dir.exists() {
            fs::remove_dir_all(&natives_dir)?;
        }
        ensure_dir(&natives_dir)?;
        for native in &plan.natives {
            libraries::extract_natives(native, &natives_dir)?;
        }

        let asset_index = data
            .asset_index
            .as_ref()
            .ok_or_else(|| format!("Version {} has no asset index", data.id))?;
        progress.set_status("Download Assets");
        assets::sync_assets(
            &self.client,
            &self.resources_url,
            &game_dir.join("assets"),
            asset_index,
            progress,
        )
        .await?;

        progress.set_status("Installation complete");
        tracing::info!(version = %data.id, "install finished");
        Ok(())
    }

    async fn launch_command(
        &self,
        version: &str,
        game_dir: &Path,
        options: &LaunchOptions,
    ) -> Result<LaunchCommand, InstallError> {
        let data = read_local_version(game_dir, version)?
            .ok_or_else(|| format!("Version {version} is not installed"))?;
        build_command(&self.java, game_dir, &data, options)
    }
}

fn build_command(
    java: &Path,
    game_dir: &Path,
    data: &VersionData,
    options: &LaunchOptions,
) -> Result<LaunchCommand, InstallError> {
    let plan = libraries::plan_libraries(&game_dir.join("libraries"), &data.libraries);
    let client_jar = client_jar_path(game_dir, &data.id);
    if !file_exists(&client_jar) {
        return Err(format!("Client jar is missing: {}", client_jar.display()).into());
    }
    let classpath = libraries::build_classpath(&plan.classpath, &client_jar);
    let natives_dir = natives_dir(game_dir, &data.id);
    let assets_dir = game_dir.join("assets");
    let asset_index_id = data
        .asset_index
        .as_ref()
        .map(|index| index.id.clone())
        .unwrap_or_default();

    let mut replacements: HashMap<&str, String> = HashMap::new();
    replacements.insert("auth_player_name", options.username.clone());
    replacements.insert("version_name", data.id.clone());
    replacements.insert("game_directory", game_dir.to_string_lossy().to_string());
    replacements.insert(
        "library_directory",
        game_dir.join("libraries").to_string_lossy().to_string(),
    );
    replacements.insert("classpath_separator", args::classpath_separator().to_string());
    replacements.insert("assets_root", assets_dir.to_string_lossy().to_string());
    replacements.insert("game_assets", assets_dir.to_string_lossy().to_string());
    replacements.insert("assets_index_name", asset_index_id);
    replacements.insert("auth_uuid", options.uuid.clone());
    replacements.insert("auth_access_token", options.token.clone());
    replacements.insert("auth_session", options.token.clone());
    replacements.insert("auth_xuid", String::new());
    replacements.insert("clientid", String::new());
    replacements.insert("user_properties", "{}".to_string());
    replacements.insert("user_type", "legacy".to_string());
    replacements.insert("version_type", data.kind.clone());
    replacements.insert("classpath", classpath.clone());
    replacements.insert("natives_directory", natives_dir.to_string_lossy().to_string());
    replacements.insert("launcher_name", LAUNCHER_NAME.to_string());
    replacements.insert("launcher_version", env!("CARGO_PKG_VERSION").to_string());

    let (version_jvm, game_args) = args::build_arguments(data, &replacements)?;
    let mut unresolved = args::unresolved_tokens(&version_jvm);
    unresolved.extend(args::unresolved_tokens(&game_args));
    unresolved.sort();
    unresolved.dedup();
    if !unresolved.is_empty() {
        return Err(format!(
            "Launch metadata contains unresolved placeholders: {}",
            unresolved.join(", ")
        )
        .into());
    }

    let mut jvm_args = options.jvm_arguments.clone();
    jvm_args.extend(version_jvm);
    if !jvm_args.iter().any(|arg| arg.starts_with("-Djava.library.path")) {
        jvm_args.push(format!("-Djava.library.path={}", natives_dir.to_string_lossy()));
    }
    if !jvm_args.iter().any(|arg| arg == "-cp" || arg == "-classpath") {
        jvm_args.push("-cp".to_string());
        jvm_args.push(classpath);
    }

    Ok(LaunchCommand::new(java)
        .args(jvm_args)
        .arg(data.main_class.clone())
        .args(game_args)
        .current_dir(game_dir))
}

fn version_dir(game_dir: &Path, id: &str) -> PathBuf {
    game_dir.join("versions").join(id)
}

fn version_json_path(game_dir: &Path, id: &str) -> PathBuf {
    version_dir(game_dir, id).join(format!("{id}.json"))
}

fn client_jar_path(game_dir: &Path, id: &str) -> PathBuf {
    version_dir(game_dir, id).join(format!("{id}.jar"))
}

fn natives_dir(game_dir: &Path, id: &str) -> PathBuf {
    version_dir(game_dir, id).join("natives")
}

fn read_local_version(game_dir: &Path, id: &str) -> Result<Option<VersionData>, InstallError> {
    let path = version_json_path(game_dir, id);
    if !file_exists(&path) {
        return Ok(None);
    }
    let data = serde_json::from_slice(&fs::read(&path)?)?;
    Ok(Some(data))
}

/// Versions with a readable `versions/<id>/<id>.json`, sorted by id.
fn installed_versions(game_dir: &Path) -> Vec<VersionSummary> {
    let Ok(entries) = fs::read_dir(game_dir.join("versions")) else {
        return Vec::new();
    };

    let mut found = Vec::new();
    for entry in entries.flatten() {
        let id = entry.file_name().to_string_lossy().to_string();
        match read_local_version(game_dir, &id) {
            Ok(Some(data)) => found.push(VersionSummary {
                id: data.id,
                kind: data.kind,
            }),
            Ok(None) => {}
            Err(err) => tracing::debug!(%id, "skipping unreadable version metadata: {err}"),
        }
    }
    found.sort_by(|a, b| a.id.cmp(&b.id));
    found
}

#[cfg(test)]
mod tests;
