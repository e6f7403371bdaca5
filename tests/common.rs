// tests/common.rs

use std::io::{Cursor, Write};
use std::process::Command;

// Helper function to get the binary command
#[allow(dead_code)] // This is used by many integration tests, but not all.
pub fn modfetch_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("modfetch"))
}

/// Builds an in-memory zip archive. Entries ending in `/` become directories.
#[allow(dead_code)]
pub fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// A local stand-in for the GitHub API, raw file and archive hosts.
///
/// Serves:
/// - a contents listing of `owner/repo` folder `data/mods/Foo` (one file plus a subfolder),
/// - the branch archive of `owner/repo`,
/// - the latest release of `owner/sounds` with a `CC-Sounds.zip` asset.
///
/// Runs on its own thread and runtime so the blocking client under test never
/// executes inside an async context. Returns the base URL.
#[allow(dead_code)]
pub fn spawn_fake_github() -> String {
    use axum::{extract::State, routing::get, Json, Router};
    use serde_json::{json, Value};

    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    std_listener.set_nonblocking(true).unwrap();
    let base = format!("http://{}", std_listener.local_addr().unwrap());

    let archive = build_zip(&[
        ("repo-master/", ""),
        ("repo-master/README.md", "readme"),
        ("repo-master/data/mods/Foo/", ""),
        ("repo-master/data/mods/Foo/modinfo.json", r#"{"id":"foo"}"#),
        ("repo-master/data/mods/Foo/sub/", ""),
        ("repo-master/data/mods/Foo/sub/item.json", "[]"),
        ("repo-master/data/mods/Bar/modinfo.json", r#"{"id":"bar"}"#),
    ]);
    let sounds = build_zip(&[
        ("CC-Sounds/", ""),
        ("CC-Sounds/soundpack.txt", "NAME: CC-Sounds"),
    ]);

    async fn folder(State(base): State<String>) -> Json<Value> {
        Json(json!([
            {"type": "file", "path": "data/mods/Foo/modinfo.json", "name": "modinfo.json",
             "download_url": format!("{}/raw/modinfo.json", base)},
            {"type": "dir", "path": "data/mods/Foo/sub", "name": "sub", "download_url": null}
        ]))
    }
    async fn subfolder(State(base): State<String>) -> Json<Value> {
        Json(json!([
            {"type": "file", "path": "data/mods/Foo/sub/item.json", "name": "item.json",
             "download_url": format!("{}/raw/item.json", base)}
        ]))
    }
    async fn release(State(base): State<String>) -> Json<Value> {
        Json(json!({
            "tag_name": "2024-01-01",
            "assets": [{"name": "CC-Sounds.zip",
                        "browser_download_url": format!("{}/download/CC-Sounds.zip", base)}]
        }))
    }

    let app = Router::new()
        .route("/repos/owner/repo/contents/data/mods/Foo", get(folder))
        .route("/repos/owner/repo/contents/data/mods/Foo/sub", get(subfolder))
        .route("/raw/modinfo.json", get(|| async { r#"{"id":"foo"}"# }))
        .route("/raw/item.json", get(|| async { "[]" }))
        .route(
            "/owner/repo/archive/master.zip",
            get(move || {
                let archive = archive.clone();
                async move { archive }
            }),
        )
        .route("/repos/owner/sounds/releases/latest", get(release))
        .route(
            "/download/CC-Sounds.zip",
            get(move || {
                let sounds = sounds.clone();
                async move { sounds }
            }),
        )
        .with_state(base.clone());

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    base
}
