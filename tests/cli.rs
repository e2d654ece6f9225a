use assert_cmd::prelude::*;
use chrono::Utc;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::{TempDir, tempdir};

fn future_timestamp() -> String {
    (Utc::now() + chrono::Duration::hours(1)).to_rfc3339()
}

/// A command isolated from the user's config and local store
fn flightwatcher(home: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("flightwatcher"));
    cmd.env("HOME", home.path())
        .env("XDG_CACHE_HOME", home.path().join("cache"))
        .env_remove("FLIGHTWATCHER_CONFIG")
        .env_remove("FLIGHTWATCHER_FORMAT")
        .env_remove("FLIGHTWATCHER_NO_CACHE")
        .env_remove("SUPABASE_URL")
        .env_remove("SUPABASE_ANON_KEY");
    cmd
}

fn write_config(dir: &Path, url: &str) -> std::path::PathBuf {
    let path = dir.join("config.yaml");
    let contents = format!(
        "supabase_url: {url}\nsupabase_anon_key: anon-key\nsession:\n  access_token: access-1\n  refresh_token: refresh-1\n  user_id: u1\n  email: ada@example.com\n  expires_at: {}\npreferences:\n  default_airport: CRL\n",
        future_timestamp()
    );
    fs::write(&path, contents).expect("failed to write config");
    path
}

#[test]
fn version_prints_package_version() -> Result<(), Box<dyn std::error::Error>> {
    let home = tempdir()?;
    flightwatcher(&home)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn status_uses_custom_config_path() -> Result<(), Box<dyn std::error::Error>> {
    let home = tempdir()?;
    let config_path = write_config(home.path(), "http://127.0.0.1:9");

    let assert = flightwatcher(&home)
        .arg("status")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains(&config_path.to_string_lossy().to_string()));
    assert!(stdout.contains("ada@example.com"));
    assert!(stdout.contains("CRL"));
    Ok(())
}

#[test]
fn status_without_config_is_signed_out() -> Result<(), Box<dyn std::error::Error>> {
    let home = tempdir()?;

    let assert = flightwatcher(&home)
        .args(["status", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("\"signed_in\": false"));
    assert!(stdout.contains("\"config_found\": false"));
    Ok(())
}

#[test]
fn signed_out_searches_are_kept_locally() -> Result<(), Box<dyn std::error::Error>> {
    let home = tempdir()?;

    flightwatcher(&home)
        .args(["search", "save", "Spring", "--out", "2025-03-01", "--back", "2025-03-04"])
        .assert()
        .success();

    let assert = flightwatcher(&home)
        .args(["search", "list", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("Spring"));
    assert!(stdout.contains("\"meta\""));
    Ok(())
}

#[test]
fn excluded_destinations_round_trip_through_the_store() -> Result<(), Box<dyn std::error::Error>> {
    let home = tempdir()?;

    flightwatcher(&home)
        .args(["exclude", "set", "crl", "opo,lis"])
        .assert()
        .success();

    let assert = flightwatcher(&home)
        .args(["exclude", "get", "CRL"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("LIS, OPO"));
    Ok(())
}

#[test]
fn airport_search_falls_back_to_builtin_list() -> Result<(), Box<dyn std::error::Error>> {
    let home = tempdir()?;
    let missing = home.path().join("airports.csv");

    let assert = flightwatcher(&home)
        .args(["airport", "search", "paris", "--format", "json", "--csv"])
        .arg(&missing)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("CDG"));
    assert!(stdout.contains("ORY"));
    Ok(())
}

#[test]
fn cache_path_lives_under_cache_dir() -> Result<(), Box<dyn std::error::Error>> {
    let home = tempdir()?;

    let assert = flightwatcher(&home).args(["cache", "path"]).assert().success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("flightwatcher"));
    assert!(stdout.trim_end().ends_with("store.db"));
    Ok(())
}

#[test]
fn export_writes_backup_file() -> Result<(), Box<dyn std::error::Error>> {
    let home = tempdir()?;
    let out = home.path().join("backups");

    flightwatcher(&home)
        .args(["search", "save", "Spring", "--out", "2025-03-01"])
        .assert()
        .success();
    flightwatcher(&home)
        .arg("export")
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let files: Vec<_> = fs::read_dir(&out)?.collect::<Result<_, _>>()?;
    assert_eq!(files.len(), 1);
    let contents = fs::read_to_string(files[0].path())?;
    assert!(contents.contains("\"version\": \"1.0\""));
    assert!(contents.contains("Spring"));
    Ok(())
}

#[test]
fn completion_generates_script() -> Result<(), Box<dyn std::error::Error>> {
    let home = tempdir()?;

    let assert = flightwatcher(&home)
        .args(["completion", "bash"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("flightwatcher"));
    Ok(())
}

// ============================================================================
// Error Scenario Tests
// ============================================================================

#[test]
fn migrate_requires_sign_in() -> Result<(), Box<dyn std::error::Error>> {
    let home = tempdir()?;

    flightwatcher(&home)
        .arg("migrate")
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"));
    Ok(())
}

#[test]
fn show_unknown_search_fails() -> Result<(), Box<dyn std::error::Error>> {
    let home = tempdir()?;

    let assert = flightwatcher(&home)
        .args(["search", "show", "missing"])
        .assert()
        .failure();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(stderr.contains("missing"));
    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn signed_in_search_list_reads_from_supabase() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();

    let _searches = server
        .mock("GET", "/rest/v1/saved_searches")
        .match_query(mockito::Matcher::Any)
        .match_header("authorization", "Bearer access-1")
        .with_status(200)
        .with_body(
            r#"[
                {"id": "s1", "name": "Weekend", "dates_depart": [{"date": "2025-03-01"}],
                 "created_at": "2025-02-01T00:00:00Z"}
            ]"#,
        )
        .create();

    let home = tempdir()?;
    let config_path = write_config(home.path(), &server.url());

    let assert = flightwatcher(&home)
        .arg("--no-cache")
        .args(["search", "list", "--format", "json", "--config"])
        .arg(&config_path)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("Weekend"));
    assert!(stdout.contains("s1"));
    Ok(())
}
