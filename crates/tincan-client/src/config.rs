use std::collections::BTreeMap;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tincan_model::Version;
use url::Url;

use crate::error::{LrsError, LrsResult};

/// Settings for one record store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LrsConfig {
    pub endpoint: Option<String>,
    /// Version token; the newest supported version when absent.
    pub version: Option<String>,
    /// Raw `Authorization` header value. Wins over `username`/`password`.
    pub auth: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Skip statements that cannot be rendered for the store version instead
    /// of failing the call.
    pub allow_fail: bool,
    /// Query parameters merged into every request.
    pub extended: BTreeMap<String, String>,
}

impl Default for LrsConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            version: None,
            auth: None,
            username: None,
            password: None,
            allow_fail: true,
            extended: BTreeMap::new(),
        }
    }
}

impl LrsConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_auth(mut self, auth: impl Into<String>) -> Self {
        self.auth = Some(auth.into());
        self
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_allow_fail(mut self, allow_fail: bool) -> Self {
        self.allow_fail = allow_fail;
        self
    }

    pub fn with_extended(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extended.insert(key.into(), value.into());
        self
    }

    pub fn from_env() -> Self {
        let mut config = Self {
            endpoint: env_value("TINCAN_LRS_ENDPOINT"),
            version: env_value("TINCAN_LRS_VERSION"),
            auth: env_value("TINCAN_LRS_AUTH"),
            username: env_value("TINCAN_LRS_USERNAME"),
            password: env_value("TINCAN_LRS_PASSWORD"),
            ..Self::default()
        };
        if let Some(allow_fail) = env_value("TINCAN_LRS_ALLOW_FAIL") {
            config.allow_fail = !matches!(allow_fail.to_ascii_lowercase().as_str(), "0" | "false" | "no");
        }
        config
    }

    /// Check the settings and derive what requests need.
    pub fn resolve(&self) -> LrsResult<StoreSettings> {
        let raw = self
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|endpoint| !endpoint.is_empty())
            .ok_or_else(|| LrsError::InvalidEndpoint("no endpoint configured".to_string()))?;
        let with_slash = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{raw}/")
        };
        let endpoint = Url::parse(&with_slash)
            .map_err(|err| LrsError::InvalidEndpoint(format!("{raw}: {err}")))?;
        if endpoint.cannot_be_a_base() {
            return Err(LrsError::InvalidEndpoint(raw.to_string()));
        }

        let version = match self.version.as_deref() {
            None => Version::LATEST,
            Some(token) => Version::from_str(token)
                .map_err(|_| LrsError::UnsupportedVersion(token.to_string()))?,
        };

        let auth = match (&self.auth, &self.username, &self.password) {
            (Some(auth), _, _) => Some(auth.clone()),
            (None, Some(username), Some(password)) => Some(basic_auth(username, password)),
            _ => None,
        };

        Ok(StoreSettings {
            endpoint,
            version,
            auth,
            allow_fail: self.allow_fail,
            extended: self.extended.clone(),
        })
    }
}

/// Validated store settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreSettings {
    /// Always ends with `/`.
    pub endpoint: Url,
    pub version: Version,
    pub auth: Option<String>,
    pub allow_fail: bool,
    pub extended: BTreeMap<String, String>,
}

pub fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
