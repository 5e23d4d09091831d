use super::*;
use crate::args::{current_os_key, rules_allow};
use crate::libraries::{
    build_classpath, extract_natives, library_path_from_name, plan_libraries, NativeJar,
};
use crate::manifest::{AssetIndex, Library, Rule};
use serde_json::json;
use sha1::{Digest, Sha1};
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const UNREACHABLE_MANIFEST: &str = "http://127.0.0.1:1/version_manifest.json";

/// Records every progress call as `status <text>`, `max <n>` or `progress <n>`.
#[derive(Default)]
struct RecordingProgress {
    calls: Mutex<Vec<String>>,
}

impl RecordingProgress {
    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn statuses(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| call.strip_prefix("status ").map(str::to_string))
            .collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn set_status(&self, status: &str) {
        self.record(format!("status {status}"));
    }

    fn set_max(&self, max: u64) {
        self.record(format!("max {max}"));
    }

    fn set_progress(&self, current: u64) {
        self.record(format!("progress {current}"));
    }
}

/// Minimal HTTP file server. Paths can be registered after it starts, so
/// documents may embed its own base URL.
struct FileServer {
    base: String,
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl FileServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let files: Arc<Mutex<HashMap<String, Vec<u8>>>> = Arc::default();
        let served = files.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let served = served.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|window| window == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(read) => request.extend_from_slice(&buf[..read]),
                        }
                    }
                    let head = String::from_utf8_lossy(&request);
                    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                    let body = served.lock().expect("files lock").get(&path).cloned();
                    let (status, body) = match body {
                        Some(body) => ("200 OK", body),
                        None => ("404 Not Found", Vec::new()),
                    };
                    let header = format!(
                        "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                        body.len()
                    );
                    let _ = socket.write_all(header.as_bytes()).await;
                    let _ = socket.write_all(&body).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        Self {
            base: format!("http://{addr}"),
            files,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    fn serve(&self, path: &str, body: impl Into<Vec<u8>>) {
        self.files
            .lock()
            .expect("files lock")
            .insert(path.to_string(), body.into());
    }
}

fn sha1_hex(bytes: &[u8]) -> String {
    hex::encode(Sha1::digest(bytes))
}

fn native_jar_bytes() -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in [
        ("libdemo.so", b"native".as_slice()),
        ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0".as_slice()),
        ("skip/readme.txt", b"skipped".as_slice()),
    ] {
        writer
            .start_file(
                name,
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored),
            )
            .expect("start zip entry");
        writer.write_all(body).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

fn write_version(game_dir: &Path, id: &str, body: serde_json::Value) {
    let dir = version_dir(game_dir, id);
    fs::create_dir_all(&dir).expect("create version dir");
    fs::write(
        dir.join(format!("{id}.json")),
        serde_json::to_vec(&body).expect("encode version"),
    )
    .expect("write version json");
}

fn modern_version(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "type": "release",
        "mainClass": "net.minecraft.client.main.Main",
        "assetIndex": { "id": "5", "url": "https://example.invalid/5.json" },
        "downloads": { "client": { "url": "https://example.invalid/client.jar" } },
        "arguments": {
            "game": [
                "--username", "${auth_player_name}",
                "--version", "${version_name}",
                "--assetIndex", "${assets_index_name}",
                "--uuid", "${auth_uuid}",
                { "rules": [{ "action": "allow", "features": { "is_demo_user": true } }],
                  "value": "--demo" }
            ],
            "jvm": [
                "-Dminecraft.launcher.brand=${launcher_name}"
            ]
        },
        "libraries": [
            {
                "name": "com.mojang:brigadier:1.1.8",
                "downloads": {
                    "artifact": {
                        "path": "com/mojang/brigadier/1.1.8/brigadier-1.1.8.jar",
                        "url": "https://example.invalid/brigadier.jar"
                    }
                }
            }
        ]
    })
}

fn options(username: &str) -> LaunchOptions {
    LaunchOptions {
        username: username.to_string(),
        uuid: String::new(),
        token: String::new(),
        jvm_arguments: vec!["-Xmx4G".to_string(), "-Xms2G".to_string()],
    }
}

fn library(value: serde_json::Value) -> Library {
    serde_json::from_value(value).expect("decode library")
}

#[test]
fn maven_names_map_to_repository_paths() {
    assert_eq!(
        library_path_from_name("org.lwjgl:lwjgl:3.3.1"),
        "org/lwjgl/lwjgl/3.3.1/lwjgl-3.3.1.jar"
    );
    assert_eq!(
        library_path_from_name("org.lwjgl:lwjgl:3.3.1:natives-linux"),
        "org/lwjgl/lwjgl/3.3.1/lwjgl-3.3.1-natives-linux.jar"
    );
    assert_eq!(library_path_from_name("broken:name"), "broken/name");
}

#[test]
fn last_matching_rule_decides() {
    let rules: Vec<Rule> = serde_json::from_value(json!([
        { "action": "allow" },
        { "action": "disallow", "os": { "name": current_os_key() } }
    ]))
    .expect("decode rules");
    assert!(!rules_allow(Some(&rules)));
    assert!(rules_allow(None));

    let other_os: Vec<Rule> = serde_json::from_value(json!([
        { "action": "allow", "os": { "name": "some-other-os" } }
    ]))
    .expect("decode rules");
    assert!(!rules_allow(Some(&other_os)));
}

#[test]
fn plan_skips_disallowed_libraries_and_picks_native_classifier() {
    let libraries = vec![
        library(json!({
            "name": "a:kept:1",
            "downloads": { "artifact": { "url": "https://example.invalid/kept.jar" } }
        })),
        library(json!({
            "name": "a:dropped:1",
            "rules": [{ "action": "allow", "os": { "name": "some-other-os" } }],
            "downloads": { "artifact": { "url": "https://example.invalid/dropped.jar" } }
        })),
        library(json!({
            "name": "a:native:1",
            "natives": { current_os_key(): "natives-host" },
            "extract": { "exclude": ["skip/"] },
            "downloads": {
                "classifiers": {
                    "natives-host": {
                        "path": "a/native/1/native-1-natives-host.jar",
                        "url": "https://example.invalid/native.jar"
                    }
                }
            }
        })),
    ];

    let root = Path::new("/libs");
    let plan = plan_libraries(root, &libraries);
    assert_eq!(plan.classpath, vec![root.join("a/kept/1/kept-1.jar")]);
    assert_eq!(
        plan.natives,
        vec![NativeJar {
            path: root.join("a/native/1/native-1-natives-host.jar"),
            exclude: vec!["skip/".to_string()],
        }]
    );
    assert_eq!(plan.downloads.len(), 2);
}

#[test]
fn classpath_ends_with_client_jar() {
    let libs = vec![PathBuf::from("/libs/a.jar"), PathBuf::from("/libs/b.jar")];
    let classpath = build_classpath(&libs, Path::new("/versions/1.0/1.0.jar"));
    let sep = args::classpath_separator();
    assert_eq!(
        classpath,
        format!("/libs/a.jar{sep}/libs/b.jar{sep}/versions/1.0/1.0.jar")
    );
}

#[test]
fn asset_objects_are_sharded_by_hash_prefix() {
    let (url, path) = assets::object_location(
        RESOURCES_URL,
        Path::new("/assets"),
        "bdf48ef6b5d0d23bbb02e17d04865216179f510a",
    )
    .expect("location");
    assert_eq!(
        url,
        "https://resources.download.minecraft.net/bd/bdf48ef6b5d0d23bbb02e17d04865216179f510a"
    );
    assert_eq!(
        path,
        PathBuf::from("/assets/objects/bd/bdf48ef6b5d0d23bbb02e17d04865216179f510a")
    );
    assert!(assets::object_location(RESOURCES_URL, Path::new("/assets"), "a").is_err());

    let (url, _) = assets::object_location("http://mirror.test/objects/", Path::new("/assets"), "abcd")
        .expect("mirror location");
    assert_eq!(url, "http://mirror.test/objects/ab/abcd");
}

#[tokio::test]
async fn launch_command_is_built_from_installed_version() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let game_dir = dir.path();
    write_version(game_dir, "1.20.1", modern_version("1.20.1"));
    fs::write(client_jar_path(game_dir, "1.20.1"), b"jar").expect("write jar");

    let installer = VanillaInstaller::new().with_java("/opt/java/bin/java");
    let command = installer
        .launch_command("1.20.1", game_dir, &options("Steve"))
        .await
        .expect("launch command");

    assert_eq!(command.program, PathBuf::from("/opt/java/bin/java"));
    assert_eq!(command.current_dir.as_deref(), Some(game_dir));

    let args = &command.args;
    assert_eq!(&args[..3], ["-Xmx4G", "-Xms2G", "-Dminecraft.launcher.brand=eclipse-launcher"]);
    assert!(args
        .iter()
        .any(|arg| arg.starts_with("-Djava.library.path=") && arg.ends_with("natives")));

    let cp_index = args.iter().position(|arg| arg == "-cp").expect("-cp present");
    let classpath = &args[cp_index + 1];
    assert!(classpath.contains("brigadier-1.1.8.jar"));
    assert!(classpath.ends_with("1.20.1.jar"));

    let main_index = args
        .iter()
        .position(|arg| arg == "net.minecraft.client.main.Main")
        .expect("main class present");
    assert_eq!(main_index, cp_index + 2);
    assert_eq!(
        &args[main_index + 1..],
        ["--username", "Steve", "--version", "1.20.1", "--assetIndex", "5", "--uuid", ""]
    );
    assert!(!args.iter().any(|arg| arg == "--demo"));
}

#[tokio::test]
async fn legacy_versions_use_minecraft_arguments() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let game_dir = dir.path();
    write_version(
        game_dir,
        "1.7.10",
        json!({
            "id": "1.7.10",
            "type": "release",
            "mainClass": "net.minecraft.client.main.Main",
            "assetIndex": { "id": "1.7.10", "url": "https://example.invalid/1.7.10.json" },
            "minecraftArguments": "--username ${auth_player_name} --session ${auth_session} --userProperties ${user_properties}"
        }),
    );
    fs::write(client_jar_path(game_dir, "1.7.10"), b"jar").expect("write jar");

    let command = VanillaInstaller::new()
        .launch_command("1.7.10", game_dir, &options("Alex"))
        .await
        .expect("launch command");

    let tail: Vec<&str> = command
        .args
        .iter()
        .skip_while(|arg| *arg != "net.minecraft.client.main.Main")
        .skip(1)
        .map(String::as_str)
        .collect();
    assert_eq!(
        tail,
        ["--username", "Alex", "--session", "", "--userProperties", "{}"]
    );
}

#[tokio::test]
async fn unknown_placeholders_are_rejected() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let game_dir = dir.path();
    let mut version = modern_version("1.20.1");
    version["arguments"]["game"] = json!(["--width", "${resolution_width}"]);
    write_version(game_dir, "1.20.1", version);
    fs::write(client_jar_path(game_dir, "1.20.1"), b"jar").expect("write jar");

    let err = VanillaInstaller::new()
        .launch_command("1.20.1", game_dir, &options("Steve"))
        .await
        .expect_err("unresolved placeholder");
    assert!(err.to_string().contains("resolution_width"));
}

#[tokio::test]
async fn launch_command_requires_installed_version() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let err = VanillaInstaller::new()
        .launch_command("1.20.1", dir.path(), &options("Steve"))
        .await
        .expect_err("not installed");
    assert_eq!(err.to_string(), "Version 1.20.1 is not installed");

    write_version(dir.path(), "1.20.1", modern_version("1.20.1"));
    let err = VanillaInstaller::new()
        .launch_command("1.20.1", dir.path(), &options("Steve"))
        .await
        .expect_err("jar missing");
    assert!(err.to_string().starts_with("Client jar is missing"));
}

#[tokio::test]
async fn installed_versions_are_listed_when_manifest_is_unreachable() {
    let dir = tempfile::tempdir().expect("create temp dir");
    write_version(dir.path(), "1.20.1", modern_version("1.20.1"));
    fs::create_dir_all(dir.path().join("versions").join("empty")).expect("create dir");

    let installer = VanillaInstaller::new().with_manifest_url(UNREACHABLE_MANIFEST);
    let versions = installer
        .available_versions(dir.path())
        .await
        .expect("local versions");
    assert_eq!(
        versions,
        vec![VersionSummary {
            id: "1.20.1".to_string(),
            kind: "release".to_string(),
        }]
    );
}

#[tokio::test]
async fn unreachable_manifest_without_local_versions_is_an_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let installer = VanillaInstaller::new().with_manifest_url(UNREACHABLE_MANIFEST);
    let err = installer
        .available_versions(dir.path())
        .await
        .expect_err("no versions");
    assert!(matches!(err, InstallError::Http(_)));
}

#[tokio::test]
async fn inherited_versions_are_not_installed() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let mut version = modern_version("fabric-loader-1.20.1");
    version["inheritsFrom"] = json!("1.20.1");
    write_version(dir.path(), "fabric-loader-1.20.1", version);

    let progress = RecordingProgress::default();
    let err = VanillaInstaller::new()
        .with_manifest_url(UNREACHABLE_MANIFEST)
        .install("fabric-loader-1.20.1", dir.path(), &progress)
        .await
        .expect_err("inherited version");
    assert!(err.to_string().contains("inherits from 1.20.1"));
    assert!(progress.calls().is_empty());
}

#[tokio::test]
async fn install_of_unknown_version_reports_manifest_failure() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let progress = RecordingProgress::default();
    let err = VanillaInstaller::new()
        .with_manifest_url(UNREACHABLE_MANIFEST)
        .install("1.20.1", dir.path(), &progress)
        .await
        .expect_err("manifest unreachable");
    assert!(matches!(err, InstallError::Http(_)));
    assert_eq!(progress.statuses(), ["Download version manifest"]);
}

#[test]
fn native_extraction_honours_only_its_own_excludes() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let jar = dir.path().join("demo-natives.jar");
    fs::write(&jar, native_jar_bytes()).expect("write jar");

    let excluding = dir.path().join("excluding");
    extract_natives(
        &NativeJar {
            path: jar.clone(),
            exclude: vec!["skip/".to_string()],
        },
        &excluding,
    )
    .expect("extract with excludes");
    assert_eq!(fs::read(excluding.join("libdemo.so")).expect("read native"), b"native");
    assert!(!excluding.join("skip").exists());
    assert!(!excluding.join("META-INF").exists());

    let plain = dir.path().join("plain");
    extract_natives(
        &NativeJar {
            path: jar,
            exclude: Vec::new(),
        },
        &plain,
    )
    .expect("extract without excludes");
    assert!(plain.join("skip/readme.txt").exists());
    assert!(!plain.join("META-INF").exists());
}

#[tokio::test]
async fn corrupt_asset_objects_are_downloaded_again() {
    let server = FileServer::start().await;
    let object = b"hello";
    let hash = sha1_hex(object);
    server.serve(&format!("/objects/{}/{hash}", &hash[..2]), object.as_slice());
    server.serve(
        "/indexes/test.json",
        serde_json::to_vec(&json!({
            "objects": { "minecraft/lang/en_us.json": { "hash": hash, "size": 5 } }
        }))
        .expect("encode index"),
    );

    let dir = tempfile::tempdir().expect("create temp dir");
    let assets_dir = dir.path().join("assets");
    let object_path = assets_dir.join("objects").join(&hash[..2]).join(&hash);
    fs::create_dir_all(object_path.parent().expect("object parent")).expect("create dir");
    fs::write(&object_path, b"h").expect("write truncated object");

    let index = AssetIndex {
        id: "test".to_string(),
        url: server.url("/indexes/test.json"),
        sha1: None,
        size: None,
    };
    let progress = RecordingProgress::default();
    assets::sync_assets(
        &Client::new(),
        &server.url("/objects"),
        &assets_dir,
        &index,
        &progress,
    )
    .await
    .expect("sync assets");

    assert_eq!(fs::read(&object_path).expect("read object"), object);
    assert_eq!(progress.calls(), ["max 1", "progress 1"]);
}

#[tokio::test]
async fn install_fetches_every_file_and_reports_progress() {
    let server = FileServer::start().await;
    let id = "1.0-test";

    let client_jar = b"client-jar".to_vec();
    server.serve("/client.jar", client_jar.clone());

    let library_jar = b"library-jar".to_vec();
    server.serve("/libraries/demo-1.0.jar", library_jar.clone());

    let native_jar = native_jar_bytes();
    server.serve("/libraries/demo-natives-1.0.jar", native_jar.clone());

    let object = b"hello";
    let hash = sha1_hex(object);
    server.serve(&format!("/objects/{}/{hash}", &hash[..2]), object.as_slice());
    let index = serde_json::to_vec(&json!({
        "objects": { "minecraft/lang/en_us.json": { "hash": hash, "size": 5 } }
    }))
    .expect("encode index");
    server.serve("/indexes/test.json", index.clone());

    let version = json!({
        "id": id,
        "type": "release",
        "mainClass": "net.minecraft.client.main.Main",
        "arguments": { "game": ["--username", "${auth_player_name}"], "jvm": [] },
        "assetIndex": {
            "id": "test",
            "url": server.url("/indexes/test.json"),
            "sha1": sha1_hex(&index),
            "size": index.len()
        },
        "downloads": {
            "client": {
                "url": server.url("/client.jar"),
                "sha1": sha1_hex(&client_jar),
                "size": client_jar.len()
            }
        },
        "libraries": [
            {
                "name": "org.example:demo:1.0",
                "downloads": {
                    "artifact": {
                        "path": "org/example/demo/1.0/demo-1.0.jar",
                        "url": server.url("/libraries/demo-1.0.jar"),
                        "sha1": sha1_hex(&library_jar),
                        "size": library_jar.len()
                    }
                }
            },
            {
                "name": "org.example:demo-natives:1.0",
                "natives": { (current_os_key()): "natives-host" },
                "extract": { "exclude": ["skip/"] },
                "downloads": {
                    "classifiers": {
                        "natives-host": {
                            "path": "org/example/demo-natives/1.0/demo-natives-1.0-natives-host.jar",
                            "url": server.url("/libraries/demo-natives-1.0.jar"),
                            "sha1": sha1_hex(&native_jar),
                            "size": native_jar.len()
                        }
                    }
                }
            }
        ]
    });
    server.serve(
        &format!("/{id}.json"),
        serde_json::to_vec(&version).expect("encode version"),
    );
    server.serve(
        "/manifest.json",
        serde_json::to_vec(&json!({
            "latest": { "release": id, "snapshot": id },
            "versions": [{ "id": id, "type": "release", "url": server.url(&format!("/{id}.json")) }]
        }))
        .expect("encode manifest"),
    );

    let dir = tempfile::tempdir().expect("create temp dir");
    let game_dir = dir.path();
    let installer = VanillaInstaller::new()
        .with_manifest_url(server.url("/manifest.json"))
        .with_resources_url(server.url("/objects"));
    let progress = RecordingProgress::default();
    installer
        .install(id, game_dir, &progress)
        .await
        .expect("install");

    assert_eq!(
        progress.calls(),
        [
            "status Download version manifest",
            "status Download 1.0-test.json",
            "status Download 1.0-test.jar",
            "status Download Libraries",
            "max 2",
            "progress 1",
            "progress 2",
            "status Extract natives",
            "status Download Assets",
            "max 1",
            "progress 1",
            "status Installation complete",
        ]
    );

    assert!(version_json_path(game_dir, id).exists());
    assert_eq!(fs::read(client_jar_path(game_dir, id)).expect("read jar"), client_jar);
    assert_eq!(
        fs::read(game_dir.join("libraries/org/example/demo/1.0/demo-1.0.jar"))
            .expect("read library"),
        library_jar
    );
    let natives = natives_dir(game_dir, id);
    assert!(natives.join("libdemo.so").exists());
    assert!(!natives.join("skip").exists());
    assert!(game_dir.join("assets/indexes/test.json").exists());
    assert_eq!(
        fs::read(game_dir.join("assets/objects").join(&hash[..2]).join(&hash))
            .expect("read object"),
        object
    );

    let command = installer
        .launch_command(id, game_dir, &options("Steve"))
        .await
        .expect("launch command");
    let cp_index = command.args.iter().position(|arg| arg == "-cp").expect("-cp present");
    assert!(command.args[cp_index + 1].contains("demo-1.0.jar"));
    assert_eq!(command.args.last().map(String::as_str), Some("Steve"));
}
