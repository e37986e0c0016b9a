//! CLI integration tests.
//!
//! Argument parsing, configuration precedence and binary behaviour that
//! does not need the network.

use std::io::Write;
use std::time::Duration;

use assert_cmd::Command;
use clap::Parser;
use predicates::prelude::*;

use koddi_healthcheck::cli::args::{Cli, Command as CliCommand, OutputFormat};
use koddi_healthcheck::config::FileConfig;
use koddi_healthcheck::{HealthcheckError, RunConfig};

const RUN_ENV: [&str; 10] = [
    "KODDI_EMAIL",
    "KODDI_PASSWORD",
    "KODDI_MEMBER_GROUP_ID",
    "KODDI_ADVERTISER_ID",
    "KODDI_CLIENT_NAME",
    "KODDI_SITE_ID",
    "KODDI_EXPERIENCE_NAME",
    "KODDI_BASE_URL",
    "KODDI_TIMEOUT",
    "KODDI_HEALTHCHECK_CONFIG",
];

/// The binary with every run variable cleared
fn bin() -> Command {
    let mut cmd = Command::cargo_bin("koddi-healthcheck").unwrap();
    for var in RUN_ENV {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG");
    cmd
}

fn config_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_parse_full_flag_set() {
    let cli = Cli::try_parse_from([
        "koddi-healthcheck",
        "--email",
        "ops@example.com",
        "--password",
        "secret",
        "--member-group-id",
        "42",
        "--advertiser-id",
        "1001",
        "--client-name",
        "acme",
        "--site-id",
        "search",
        "--experience-name",
        "pdp",
        "--base-url",
        "https://staging.example.test/console/v1/",
        "--timeout",
        "10",
        "--format",
        "html",
        "--output",
        "report.html",
        "-q",
    ])
    .unwrap();

    assert_eq!(cli.selected_command(), CliCommand::Check);
    assert_eq!(cli.output.effective_format(), OutputFormat::Html);
    assert!(cli.quiet);

    let config = RunConfig::merge(&cli.run, FileConfig::default()).unwrap();
    assert_eq!(config.member_group_id, 42);
    assert_eq!(config.advertiser_id, 1001);
    assert_eq!(config.client_name, "acme");
    assert_eq!(config.site_id, "search");
    assert_eq!(config.experience_name.as_deref(), Some("pdp"));
    assert_eq!(config.base_url, "https://staging.example.test/console/v1");
    assert_eq!(config.timeout, Duration::from_secs(10));
}

#[test]
fn test_flags_override_config_file() {
    let file = config_file(
        r#"
email = "file@example.com"
password = "from-file"
member_group_id = 7
advertiser_id = 8
client_name = "filecorp"
site_id = "category"
timeout = 12
"#,
    );
    let path = file.path().to_str().unwrap();

    let cli = Cli::try_parse_from([
        "koddi-healthcheck",
        "--config",
        path,
        "--email",
        "flag@example.com",
        "--advertiser-id",
        "99",
    ])
    .unwrap();
    let config = RunConfig::from_args(&cli.run).unwrap();

    assert_eq!(config.email, "flag@example.com");
    assert_eq!(config.advertiser_id, 99);
    assert_eq!(config.password, "from-file");
    assert_eq!(config.member_group_id, 7);
    assert_eq!(config.client_name, "filecorp");
    assert_eq!(config.site_id, "category");
    assert_eq!(config.timeout, Duration::from_secs(12));
    assert_eq!(config.base_url, "https://koddi.io/console/v1");
}

#[test]
fn test_malformed_config_file() {
    let file = config_file("member_group_id = \"forty-two\"\n");
    let err = FileConfig::load(file.path()).unwrap_err();
    match err {
        HealthcheckError::Config { message } => {
            assert!(message.contains(&file.path().display().to_string()))
        }
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn test_list_prints_seven_checks() {
    bin()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("1  Authentication"))
        .stdout(predicate::str::contains("Advertiser Exists"))
        .stdout(predicate::str::contains("Campaigns Report"))
        .stdout(predicate::str::contains("Entity Registration Failures"))
        .stdout(predicate::str::contains("Active Bidders Cache"))
        .stdout(predicate::str::contains("Attributable Entities Cache"))
        .stdout(predicate::str::contains("7  Winning Ads (Test Auction)"));
}

#[test]
fn test_version_command() {
    bin()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!(
            "koddi-healthcheck {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_missing_credentials_exit_3() {
    bin()
        .arg("check")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("missing required value 'email'"));
}

#[test]
fn test_missing_client_name_names_env_var() {
    bin()
        .env("KODDI_EMAIL", "ops@example.com")
        .env("KODDI_PASSWORD", "secret")
        .env("KODDI_MEMBER_GROUP_ID", "42")
        .env("KODDI_ADVERTISER_ID", "1001")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("KODDI_CLIENT_NAME"))
        .stderr(predicate::str::contains("secret").not());
}

#[test]
fn test_unreadable_config_exit_3() {
    bin()
        .args(["check", "--config", "/nonexistent/koddi-healthcheck.toml"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("reading config file"));
}

#[test]
fn test_invalid_id_is_usage_error() {
    bin()
        .args(["check", "--member-group-id", "0"])
        .assert()
        .code(2);
}

#[test]
fn test_unknown_format_is_usage_error() {
    bin().args(["--format", "yaml"]).assert().code(2);
}
