//! Run configuration loading.
//!
//! Flags and `KODDI_*` environment variables arrive through clap; a TOML
//! file named by `--config` fills whatever they leave unset. Precedence is
//! flag > env > file > built-in default.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::cli::args::RunArgs;
use crate::{HealthcheckError, RunConfig, DEFAULT_BASE_URL, DEFAULT_SITE_ID, DEFAULT_TIMEOUT_SECS};

/// Settings read from a TOML file. Keys mirror the run flags in snake_case.
///
/// ```toml
/// email = "ops@example.com"
/// member_group_id = 42
/// advertiser_id = 1001
/// client_name = "shop"
/// timeout = 10
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub email: Option<String>,
    pub password: Option<String>,
    pub member_group_id: Option<u64>,
    pub advertiser_id: Option<u64>,
    pub client_name: Option<String>,
    pub site_id: Option<String>,
    pub experience_name: Option<String>,
    pub base_url: Option<String>,
    /// Seconds
    pub timeout: Option<u64>,
}

impl FileConfig {
    /// Load and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self, HealthcheckError> {
        let content = std::fs::read_to_string(path).map_err(|e| HealthcheckError::Io {
            context: format!("reading config file {}", path.display()),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::parse(&content).map_err(|e| match e {
            HealthcheckError::Config { message } => HealthcheckError::Config {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })
    }

    pub fn parse(content: &str) -> Result<Self, HealthcheckError> {
        toml::from_str(content).map_err(|e| HealthcheckError::Config {
            message: e.message().to_string(),
        })
    }
}

impl RunConfig {
    /// Build the run configuration from parsed arguments, loading the
    /// config file they name, if any.
    pub fn from_args(args: &RunArgs) -> Result<Self, HealthcheckError> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    /// Merge arguments over file settings and validate the result
    pub fn merge(args: &RunArgs, file: FileConfig) -> Result<Self, HealthcheckError> {
        let email = required_text(args.email.clone().or(file.email), "email", "--email", "KODDI_EMAIL")?;
        let password = required_text(
            args.password.clone().or(file.password),
            "password",
            "--password",
            "KODDI_PASSWORD",
        )?;
        let member_group_id = required_id(
            args.member_group_id.or(file.member_group_id),
            "member_group_id",
            "--member-group-id",
            "KODDI_MEMBER_GROUP_ID",
        )?;
        let advertiser_id = required_id(
            args.advertiser_id.or(file.advertiser_id),
            "advertiser_id",
            "--advertiser-id",
            "KODDI_ADVERTISER_ID",
        )?;
        let client_name = required_text(
            args.client_name.clone().or(file.client_name),
            "client_name",
            "--client-name",
            "KODDI_CLIENT_NAME",
        )?;

        let site_id = args
            .site_id
            .clone()
            .or(file.site_id)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SITE_ID.to_string());
        let base_url = args
            .base_url
            .clone()
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = args.timeout.or(file.timeout).unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(HealthcheckError::Config {
                message: "timeout must be at least 1 second".to_string(),
            });
        }

        let config = RunConfig::new(email, password, member_group_id, advertiser_id, client_name.trim())
            .with_site_id(site_id)
            .with_experience_name(args.experience_name.clone().or(file.experience_name))
            .with_base_url(&base_url)
            .with_timeout(Duration::from_secs(timeout_secs));

        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(HealthcheckError::Config {
                message: format!("base_url must be an http(s) URL, got '{}'", config.base_url),
            });
        }

        debug!(?config, "resolved run configuration");
        Ok(config)
    }
}

fn required_text(
    value: Option<String>,
    key: &str,
    flag: &str,
    env: &str,
) -> Result<String, HealthcheckError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| missing(key, flag, env))
}

fn required_id(value: Option<u64>, key: &str, flag: &str, env: &str) -> Result<u64, HealthcheckError> {
    match value {
        Some(0) => Err(HealthcheckError::Config {
            message: format!("{} must be a positive integer", key),
        }),
        Some(id) => Ok(id),
        None => Err(missing(key, flag, env)),
    }
}

fn missing(key: &str, flag: &str, env: &str) -> HealthcheckError {
    HealthcheckError::Config {
        message: format!("missing required value '{}' (set {}, {} or the config file)", key, flag, env),
    }
}
