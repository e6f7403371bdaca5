mod common;

use assert_cmd::prelude::*;
use common::modfetch_cmd;
use modfetch::{ClientConfig, Fetcher, WalkOptions};
use predicates::prelude::*;
use tempfile::tempdir;

/// Clones one folder of a public repository via the contents API.
/// This is a slow, network-dependent test.
/// To run: `cargo test -- --ignored network`
#[test]
#[ignore = "requires network access and is slow"]
fn test_tree_walk_public_folder() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let fetcher = Fetcher::new(ClientConfig::default())?;

    let report = fetcher.fetch_tree_recursive(
        "https://github.com/git-fixtures/basic/tree/master/go",
        temp.path(),
        WalkOptions::default(),
    )?;

    assert!(report.is_complete(), "{:?}", report.failures);
    assert!(temp.path().join("go/example.go").is_file());
    Ok(())
}

/// Downloads the branch archive of a public repository and extracts one folder.
#[test]
#[ignore = "requires network access and is slow"]
fn test_archive_public_folder() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;

    modfetch_cmd()
        .args([
            "archive",
            "https://github.com/git-fixtures/basic/tree/master/go",
        ])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("basic-master/go/"));

    assert!(temp.path().join("example.go").is_file());
    assert!(!temp.path().join("LICENSE").exists());
    Ok(())
}
