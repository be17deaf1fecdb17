//! Endpoint configuration: base URL, credential and HTTP knobs.
//!
//! Resolution order for each setting: explicit builder value, then the
//! environment (`<SERVICE>_URL`, `<SERVICE>_USERNAME` / `<SERVICE>_PASSWORD`,
//! `<SERVICE>_API_KEY`), then the OS keyring for an API key, then defaults.

use crate::{Error, Result};
use keyring::Entry;
use std::env;
use std::fmt;
use std::time::Duration;

const KEYRING_SERVICE: &str = "cognitive-sdk";

/// Opaque authentication material. Only the transport applies it.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    None,
    Basic { username: String, password: String },
    Bearer(String),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::None => f.write_str("None"),
            Credential::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credential::Bearer(_) => f.write_str("Bearer(<redacted>)"),
        }
    }
}

/// Immutable per-client endpoint configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    pub credential: Credential,
    pub timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub proxy: Option<String>,
}

impl ServiceConfig {
    pub fn builder(service_id: impl Into<String>) -> ServiceConfigBuilder {
        ServiceConfigBuilder::new(service_id)
    }
}

pub struct ServiceConfigBuilder {
    service_id: String,
    base_url: Option<String>,
    credential: Option<Credential>,
    default_url: Option<String>,
    timeout_secs: Option<u64>,
    use_keyring: bool,
}

impl ServiceConfigBuilder {
    pub fn new(service_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            base_url: None,
            credential: None,
            default_url: None,
            timeout_secs: None,
            use_keyring: true,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Fallback URL used when neither the builder nor the environment sets one.
    pub fn default_url(mut self, url: impl Into<String>) -> Self {
        self.default_url = Some(url.into());
        self
    }

    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn basic_auth(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credential(Credential::Basic {
            username: username.into(),
            password: password.into(),
        })
    }

    pub fn api_key(self, key: impl Into<String>) -> Self {
        self.credential(Credential::Bearer(key.into()))
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Skip the OS keyring lookup (headless hosts, tests).
    pub fn without_keyring(mut self) -> Self {
        self.use_keyring = false;
        self
    }

    pub fn build(self) -> Result<ServiceConfig> {
        let prefix = env_prefix(&self.service_id);

        let base_url = self
            .base_url
            .or_else(|| env::var(format!("{}_URL", prefix)).ok())
            .or(self.default_url)
            .ok_or_else(|| {
                Error::configuration(format!(
                    "no base URL for service '{}' (set {}_URL)",
                    self.service_id, prefix
                ))
            })?;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::configuration(format!(
                "base URL must be http(s): {}",
                base_url
            )));
        }

        let credential = match self.credential {
            Some(c) => c,
            None => Self::credential_from_env(&prefix)
                .or_else(|| {
                    if self.use_keyring {
                        Self::credential_from_keyring(&self.service_id)
                    } else {
                        None
                    }
                })
                .unwrap_or(Credential::None),
        };

        let timeout_secs = self
            .timeout_secs
            .or_else(|| {
                env::var("COGNITIVE_HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
            })
            .unwrap_or(60);

        Ok(ServiceConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            credential,
            timeout: Duration::from_secs(timeout_secs.max(1)),
            pool_max_idle_per_host: env::var("COGNITIVE_HTTP_POOL_MAX_IDLE_PER_HOST")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(32),
            proxy: env::var("COGNITIVE_PROXY_URL").ok(),
        })
    }

    fn credential_from_env(prefix: &str) -> Option<Credential> {
        let username = env::var(format!("{}_USERNAME", prefix)).ok();
        let password = env::var(format!("{}_PASSWORD", prefix)).ok();
        if let (Some(username), Some(password)) = (username, password) {
            return Some(Credential::Basic { username, password });
        }
        env::var(format!("{}_API_KEY", prefix))
            .ok()
            .map(Credential::Bearer)
    }

    fn credential_from_keyring(service_id: &str) -> Option<Credential> {
        let entry = Entry::new(KEYRING_SERVICE, service_id).ok()?;
        entry.get_password().ok().map(Credential::Bearer)
    }
}

fn env_prefix(service_id: &str) -> String {
    service_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}
