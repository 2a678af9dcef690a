//! CLI end-to-end tests
//!
//! Drives the photohub binary against a database in a temporary directory.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

const PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];

/// Get a command for the photohub binary
#[allow(deprecated)]
fn photohub_cmd() -> Command {
    Command::cargo_bin("photohub").unwrap()
}

/// Write a config pointing at a database inside `dir` and return its path.
fn write_config(dir: &Path) -> PathBuf {
    let db = dir.join("photohub.db");
    let config = dir.join("photohub.toml");
    fs::write(
        &config,
        format!(
            "[database]\npath = {:?}\n\n[auth]\nbcrypt_cost = 4\n",
            db.to_string_lossy()
        ),
    )
    .unwrap();
    config
}

fn run(config: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    photohub_cmd().arg("--config").arg(config).args(args).assert()
}

/// First tab-separated field of stdout.
fn first_field(assert: &assert_cmd::assert::Assert) -> String {
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    stdout.split('\t').next().unwrap().trim().to_string()
}

#[test]
fn test_cli_no_args_shows_help() {
    photohub_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    photohub_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("photohub"));
}

#[test]
fn test_cli_upload_help() {
    photohub_cmd()
        .args(["upload", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--owner"))
        .stdout(predicate::str::contains("--category"));
}

#[test]
fn test_cli_upload_fetch_dashboard() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());

    run(&config, &["init"]).success();
    run(&config, &["category", "add", "Landscape"])
        .success()
        .stdout(predicate::str::contains("Landscape"));
    run(&config, &["signup", "ansel", "--email", "ansel@example.com", "half-dome-1927"]).success();

    let image_path = dir.path().join("upload.png");
    fs::write(&image_path, PNG).unwrap();
    let uploaded = run(
        &config,
        &[
            "upload",
            image_path.to_str().unwrap(),
            "--owner",
            "ansel",
            "--category",
            "Landscape",
        ],
    )
    .success()
    .stdout(predicate::str::contains("image/png"));
    let image_id = first_field(&uploaded);

    let out_path = dir.path().join("fetched.png");
    run(
        &config,
        &["fetch", &image_id, "--output", out_path.to_str().unwrap()],
    )
    .success();
    assert_eq!(fs::read(&out_path).unwrap(), PNG);

    run(&config, &["dashboard", "--owner", "ansel"])
        .success()
        .stdout(predicate::str::contains(image_id.as_str()))
        .stdout(predicate::str::contains("\"category_name\": \"Landscape\""));

    run(&config, &["browse", "Landscape"])
        .success()
        .stdout(predicate::str::contains("\"username\": \"ansel\""));
}

#[test]
fn test_cli_login_wrong_password_fails() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());

    run(&config, &["signup", "vivian", "--email", "vivian@example.com", "rolleiflex-1955"]).success();
    run(&config, &["login", "vivian", "rolleiflex-1955"]).success();
    run(&config, &["login", "vivian", "wrong-password"])
        .failure()
        .stderr(predicate::str::contains("Invalid credentials"));
}

#[test]
fn test_cli_upload_unknown_category_fails() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());
    let image_path = dir.path().join("upload.png");
    fs::write(&image_path, PNG).unwrap();

    run(&config, &["signup", "robert", "--email", "robert@example.com", "magnum-1947"]).success();
    run(
        &config,
        &[
            "upload",
            image_path.to_str().unwrap(),
            "--owner",
            "robert",
            "--category",
            "Nowhere",
        ],
    )
    .failure()
    .stderr(predicate::str::contains("No category named"));
}

#[test]
fn test_cli_fetch_invalid_id() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());

    run(&config, &["fetch", "not-a-uuid"])
        .failure()
        .stderr(predicate::str::contains("not a valid image id"));
}

#[test]
fn test_cli_signup_duplicate_email_fails() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());

    run(&config, &["signup", "helen", "new-york-1939", "--email", "helen@example.com"]).success();
    run(&config, &["signup", "levitt", "new-york-1939", "--email", "Helen@Example.com"])
        .failure()
        .stderr(predicate::str::contains("already registered"));
}

#[test]
fn test_cli_profile_and_listings() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());

    run(&config, &["category", "add", "Portrait"]).success();
    run(&config, &["category", "add", "Street"]).success();
    run(&config, &["category", "list"])
        .success()
        .stdout(predicate::str::contains("\tPortrait"))
        .stdout(predicate::str::contains("\tStreet"));

    run(
        &config,
        &[
            "signup",
            "diane",
            "identical-twins",
            "--email",
            "diane@example.com",
            "--first-name",
            "Diane",
            "--surname",
            "Arbus",
            "--dob",
            "1923-03-14",
        ],
    )
    .success();

    let image_path = dir.path().join("twins.png");
    fs::write(&image_path, PNG).unwrap();
    run(
        &config,
        &["upload", image_path.to_str().unwrap(), "--owner", "diane", "--category", "Portrait"],
    )
    .success();

    let profile = run(&config, &["profile", "diane"]).success();
    let json: serde_json::Value = serde_json::from_slice(&profile.get_output().stdout).unwrap();
    assert_eq!(json["username"], "diane");
    assert_eq!(json["email"], "diane@example.com");
    assert_eq!(json["display_name"], "Diane Arbus");
    let categories = json["categories"].as_object().unwrap();
    assert_eq!(categories.len(), 2);
    let images: usize = categories
        .values()
        .map(|group| group["images"].as_array().unwrap().len())
        .sum();
    assert_eq!(images, 1);

    let listed = run(&config, &["photographers"]).success();
    let json: serde_json::Value = serde_json::from_slice(&listed.get_output().stdout).unwrap();
    assert_eq!(json[0]["username"], "diane");
    assert!(json[0].get("password_hash").is_none());
}

#[test]
fn test_cli_fetch_save_uses_format_extension() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());

    run(&config, &["category", "add", "Landscape"]).success();
    run(&config, &["signup", "ansel", "half-dome-1927", "--email", "ansel@example.com"]).success();
    let image_path = dir.path().join("upload.bin");
    fs::write(&image_path, PNG).unwrap();
    let uploaded = run(
        &config,
        &["upload", image_path.to_str().unwrap(), "--owner", "ansel", "--category", "Landscape"],
    )
    .success();
    let image_id = first_field(&uploaded);

    run(&config, &["fetch", &image_id, "--json"])
        .success()
        .stdout(predicate::str::contains("\"format\": \"png\""));

    photohub_cmd()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["fetch", &image_id, "--save"])
        .assert()
        .success();
    assert_eq!(fs::read(dir.path().join(format!("{image_id}.png"))).unwrap(), PNG);
}
