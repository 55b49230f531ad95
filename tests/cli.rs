//! Command line tests for the zipapp_bundler binary.

mod common;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use common::{Fixture, app_files, archive_names};
use predicates::prelude::*;

/// The binary with user defaults pointed at an empty file inside the fixture.
fn bundler_cmd(fx: &Fixture) -> Command {
    let defaults = fx.root.path().join("defaults.toml");
    if !defaults.exists() {
        std::fs::write(&defaults, "").unwrap();
    }

    let mut cmd = cargo_bin_cmd!("zipapp_bundler");
    cmd.env("ZIPAPP_BUNDLER_DEFAULTS", defaults)
        .env_remove("ZIPAPP_SOURCE")
        .env_remove("ZIPAPP_PYTHON")
        .env_remove("ZIPAPP_INDEX_URL");
    cmd
}

#[test]
fn help_flag_works() {
    let fx = Fixture::new(&[]);
    bundler_cmd(&fx)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--self-extract"));
}

#[test]
fn invalid_parameters_exit_with_2() {
    let fx = Fixture::new(&[]);
    bundler_cmd(&fx)
        .args(["--source", "definitely/not/here", "--entry", "app:main"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("source"));
}

#[test]
fn builds_archive() {
    let fx = Fixture::new(&app_files());
    bundler_cmd(&fx)
        .arg("--source")
        .arg(fx.project())
        .args(["--entry", "app.cli:main", "--launcher"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SUCCESS"))
        .stdout(predicate::str::contains("proj.pyz"));

    assert!(fx.dist().join("proj.vbs").is_file());
    assert!(archive_names(&fx.archive()).contains(&"app/cli.py".to_string()));
}

#[test]
fn quiet_mode_prints_nothing_on_success() {
    let fx = Fixture::new(&app_files());
    bundler_cmd(&fx)
        .arg("--source")
        .arg(fx.project())
        .args(["--entry", "app.cli:main", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(fx.archive().is_file());
}

#[test]
fn print_config_layers_profile_and_flags() {
    let fx = Fixture::new(&[]);
    let profile = fx.root.path().join("build.toml");
    std::fs::write(&profile, "entry = \"app:main\"\ntarget = \"from-profile.pyz\"\n").unwrap();

    bundler_cmd(&fx)
        .arg("--profile")
        .arg(&profile)
        .args(["--target", "from-flag.pyz", "--exclude-from-packaging", "*.log", "--print-config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("entry = \"app:main\""))
        .stdout(predicate::str::contains("target = \"from-flag.pyz\""))
        .stdout(predicate::str::contains("\"*.log\""));
}

#[test]
fn saved_profile_drives_a_later_build() {
    let fx = Fixture::new(&app_files());
    let saved = fx.root.path().join("params.json");

    bundler_cmd(&fx)
        .arg("--source")
        .arg(fx.project())
        .args(["--entry", "app.cli:main", "--no-compress", "--print-config"])
        .arg("--save-profile")
        .arg(&saved)
        .assert()
        .success();
    assert!(!fx.archive().exists());

    let json = std::fs::read_to_string(&saved).unwrap();
    assert!(json.contains("\"compressed\": false"));

    bundler_cmd(&fx)
        .arg("--profile")
        .arg(&saved)
        .assert()
        .success();
    assert!(fx.archive().is_file());
}

#[test]
fn malformed_profile_fails() {
    let fx = Fixture::new(&[]);
    let profile = fx.root.path().join("broken.toml");
    std::fs::write(&profile, "entry = [unterminated").unwrap();

    bundler_cmd(&fx)
        .arg("--profile")
        .arg(&profile)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("broken.toml"));
}
