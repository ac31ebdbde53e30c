//! Secret and output file handling, driven through the public API.

use std::{fs, os::unix::fs::PermissionsExt};

use tempfile::TempDir;
use uaa_config_common::{output::OutputDir, secret::SecretStore};

#[test]
fn secrets_are_read_relative_to_the_store_root() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("with-ops")).unwrap();
    fs::write(dir.path().join("with-ops/manifest.yaml"), "addons: []\n").unwrap();

    let store = SecretStore::new(dir.path());
    assert_eq!(store.root(), dir.path());
    assert_eq!(
        store.path("with-ops/manifest.yaml"),
        dir.path().join("with-ops/manifest.yaml"),
    );
    assert_eq!(store.read("with-ops/manifest.yaml").unwrap(), "addons: []");
}

#[test]
fn output_replaces_existing_file() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("uaa.yml");
    fs::write(&target, "stale: true\nand: a much longer old file\n").unwrap();

    let out = OutputDir::new(dir.path());
    let written = out.write("uaa.yml", "fresh: true\n").unwrap();

    assert_eq!(written, target);
    assert_eq!(fs::read_to_string(&target).unwrap(), "fresh: true\n");
    let mode = fs::metadata(&target).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);

    // Nothing but the target should be left behind.
    let entries = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 1);
}

#[test]
fn output_into_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let out = OutputDir::new(dir.path().join("does-not-exist"));
    assert!(out.write("registrar_settings.json", "{}\n").is_err());
}
