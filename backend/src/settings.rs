//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `EDUMEETUP_*` environment variables and an
//! optional config file, in that order of precedence. Every field is
//! optional; the accessors apply defaults.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{DEFAULT_GRACE_DAYS, MAX_GRACE_DAYS, ServiceSettings};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_EMAIL_FROM: &str = "edUmeetup <no-reply@edumeetup.com>";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";

/// Server, database and integration settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EDUMEETUP")]
pub struct AppSettings {
    /// Listen address, `host:port`.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL. Required by the server and the sweep.
    pub database_url: Option<String>,
    pub db_max_connections: Option<u32>,
    /// Email provider endpoint. Without it (or the key) mail is only logged.
    pub email_api_url: Option<String>,
    pub email_api_key: Option<String>,
    pub email_from: Option<String>,
    /// Bearer secret for `POST /api/cron/triggers`; unset disables it.
    pub cron_secret: Option<String>,
    /// Root directory for uploaded files.
    pub upload_dir: Option<PathBuf>,
    pub deletion_grace_days: Option<u32>,
    /// Origin of the web client, used in email links.
    pub public_base_url: Option<String>,
}

/// Raised when a configured value cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("EDUMEETUP_DATABASE_URL is required")]
    MissingDatabaseUrl,
    #[error("invalid email API URL '{value}': {source}")]
    EmailApiUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("deletion grace period must be between 1 and {max} days, got {value}")]
    GraceDays { value: u32, max: u32 },
}

/// Provider credentials, present only when both URL and key are set.
#[derive(Debug, Clone)]
pub struct EmailApiSettings<'a> {
    pub endpoint: url::Url,
    pub api_key: &'a str,
    pub from: &'a str,
}

impl AppSettings {
    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| SettingsError::BindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    /// The database URL, which has no default.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    #[must_use]
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
            .max(1)
    }

    #[must_use]
    pub fn email_from(&self) -> &str {
        self.email_from.as_deref().unwrap_or(DEFAULT_EMAIL_FROM)
    }

    /// Email provider settings, or `None` when mail should only be logged.
    pub fn email_api(&self) -> Result<Option<EmailApiSettings<'_>>, SettingsError> {
        let (Some(url), Some(api_key)) = (
            self.email_api_url.as_deref().filter(|v| !v.trim().is_empty()),
            self.email_api_key.as_deref().filter(|v| !v.trim().is_empty()),
        ) else {
            return Ok(None);
        };
        let endpoint = url::Url::parse(url).map_err(|source| SettingsError::EmailApiUrl {
            value: url.to_owned(),
            source,
        })?;
        Ok(Some(EmailApiSettings {
            endpoint,
            api_key,
            from: self.email_from(),
        }))
    }

    #[must_use]
    pub fn cron_secret(&self) -> Option<&str> {
        self.cron_secret.as_deref()
    }

    #[must_use]
    pub fn upload_dir(&self) -> &Path {
        self.upload_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_UPLOAD_DIR))
    }

    /// Days between a deletion request and the hard delete.
    pub fn deletion_grace_days(&self) -> Result<u32, SettingsError> {
        match self.deletion_grace_days.unwrap_or(DEFAULT_GRACE_DAYS) {
            value @ 1..=MAX_GRACE_DAYS => Ok(value),
            value => Err(SettingsError::GraceDays {
                value,
                max: MAX_GRACE_DAYS,
            }),
        }
    }

    #[must_use]
    pub fn public_base_url(&self) -> &str {
        self.public_base_url
            .as_deref()
            .unwrap_or(DEFAULT_PUBLIC_BASE_URL)
            .trim_end_matches('/')
    }

    /// Service tunables derived from these settings.
    pub fn service_settings(&self) -> Result<ServiceSettings, SettingsError> {
        Ok(ServiceSettings {
            grace_days: self.deletion_grace_days()?,
            public_base_url: self.public_base_url().to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Settings loading through the environment layer.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 10] = [
        "EDUMEETUP_BIND_ADDR",
        "EDUMEETUP_DATABASE_URL",
        "EDUMEETUP_DB_MAX_CONNECTIONS",
        "EDUMEETUP_EMAIL_API_URL",
        "EDUMEETUP_EMAIL_API_KEY",
        "EDUMEETUP_EMAIL_FROM",
        "EDUMEETUP_CRON_SECRET",
        "EDUMEETUP_UPLOAD_DIR",
        "EDUMEETUP_DELETION_GRACE_DAYS",
        "EDUMEETUP_PUBLIC_BASE_URL",
    ];

    fn env_with(overrides: &[(&'static str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    fn load() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("edumeetup")]).expect("settings load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(env_with(&[]));
        let settings = load();

        assert_eq!(
            settings.bind_addr().expect("default addr"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("literal")
        );
        assert!(matches!(
            settings.database_url(),
            Err(SettingsError::MissingDatabaseUrl)
        ));
        assert_eq!(settings.db_max_connections(), DEFAULT_DB_MAX_CONNECTIONS);
        assert!(settings.email_api().expect("no email").is_none());
        assert!(settings.cron_secret().is_none());
        assert_eq!(settings.upload_dir(), Path::new(DEFAULT_UPLOAD_DIR));
        assert_eq!(settings.deletion_grace_days().expect("grace"), DEFAULT_GRACE_DAYS);
        assert_eq!(settings.public_base_url(), DEFAULT_PUBLIC_BASE_URL);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("EDUMEETUP_BIND_ADDR", "127.0.0.1:9000"),
            ("EDUMEETUP_DATABASE_URL", "postgres://db/edumeetup"),
            ("EDUMEETUP_EMAIL_API_URL", "https://mail.example.com/emails"),
            ("EDUMEETUP_EMAIL_API_KEY", "key"),
            ("EDUMEETUP_DELETION_GRACE_DAYS", "7"),
            ("EDUMEETUP_PUBLIC_BASE_URL", "https://edumeetup.example/"),
        ]));
        let settings = load();

        assert_eq!(
            settings.bind_addr().expect("addr").to_string(),
            "127.0.0.1:9000"
        );
        assert_eq!(
            settings.database_url().expect("url"),
            "postgres://db/edumeetup"
        );
        let email = settings.email_api().expect("valid").expect("configured");
        assert_eq!(email.endpoint.as_str(), "https://mail.example.com/emails");
        assert_eq!(email.from, DEFAULT_EMAIL_FROM);

        let services = settings.service_settings().expect("service settings");
        assert_eq!(services.grace_days, 7);
        assert_eq!(services.public_base_url, "https://edumeetup.example");
    }

    #[rstest]
    fn email_needs_both_url_and_key() {
        let _guard = lock_env(env_with(&[(
            "EDUMEETUP_EMAIL_API_URL",
            "https://mail.example.com/emails",
        )]));
        assert!(load().email_api().expect("valid").is_none());
    }

    #[rstest]
    #[case("EDUMEETUP_BIND_ADDR", "not an address")]
    #[case("EDUMEETUP_EMAIL_API_URL", "::nope::")]
    fn invalid_values_are_reported(#[case] name: &'static str, #[case] value: &str) {
        let _guard = lock_env(env_with(&[(name, value), ("EDUMEETUP_EMAIL_API_KEY", "key")]));
        let settings = load();
        let failed = if name == "EDUMEETUP_BIND_ADDR" {
            settings.bind_addr().is_err()
        } else {
            settings.email_api().is_err()
        };
        assert!(failed, "{name}={value} should be rejected");
    }

    #[rstest]
    #[case("0")]
    #[case("3651")]
    #[case("100000000")]
    fn out_of_range_grace_periods_are_rejected(#[case] value: &str) {
        let _guard = lock_env(env_with(&[("EDUMEETUP_DELETION_GRACE_DAYS", value)]));
        let settings = load();
        assert!(matches!(
            settings.deletion_grace_days(),
            Err(SettingsError::GraceDays { .. })
        ));
        assert!(settings.service_settings().is_err());
    }
}
