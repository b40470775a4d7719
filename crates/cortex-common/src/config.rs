//! Exporter configuration and validation.
//!
//! The configuration mirrors the remote-write section of a Prometheus-style
//! settings file. Durations are written in whole seconds.
//!
//! ## Example Configuration
//!
//! ```toml
//! url = "https://cortex.example.com/api/prom/push"
//! remote_timeout = 30
//! push_interval = 10
//! proxy_url = "http://proxy.internal:3128"
//!
//! [basic_auth]
//! username = "tenant-1"
//! password_file = "/etc/cortex/password"
//!
//! [tls_config]
//! ca_file = "/etc/cortex/ca.pem"
//! cert_file = "/etc/cortex/client.pem"
//! key_file = "/etc/cortex/client-key.pem"
//! insecure_skip_verify = false
//!
//! [headers]
//! X-Scope-OrgID = "tenant-1"
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

use crate::error::{ConfigError, Result};
use crate::transport::{proxy, transport_builder};

/// Endpoint used when `url` is left empty.
pub const DEFAULT_ENDPOINT: &str = "/api/prom/push";

/// Remote timeout used when `remote_timeout` is unset or zero.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

/// Push interval used when `push_interval` is unset or zero.
pub const DEFAULT_PUSH_INTERVAL: Duration = Duration::from_secs(10);

/// HTTP basic authentication credentials.
///
/// Exactly one of `password` and `password_file` should be set; having both is
/// rejected by [`Config::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BasicAuth {
    /// Username sent with every request.
    pub username: String,

    /// Literal password (never serialized, redacted from debug output).
    pub password: Option<SecretString>,

    /// Path to a file holding the password.
    pub password_file: Option<PathBuf>,
}

impl BasicAuth {
    /// Creates basic auth credentials with only a username.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }

    /// Sets a literal password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::new(password.into().into()));
        self
    }

    /// Sets the path of a file holding the password.
    #[must_use]
    pub fn with_password_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.password_file = Some(path.into());
        self
    }

    /// The literal password, if one is set and non-empty.
    pub fn password(&self) -> Option<&SecretString> {
        non_empty_secret(self.password.as_ref())
    }

    /// The password file path, if one is set and non-empty.
    pub fn password_file(&self) -> Option<&Path> {
        non_empty_path(self.password_file.as_deref())
    }
}

/// TLS settings for the connection to the remote endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// PEM bundle of CA certificates trusted in addition to the system roots.
    pub ca_file: Option<PathBuf>,

    /// PEM client certificate presented for mutual TLS.
    pub cert_file: Option<PathBuf>,

    /// PKCS#8 PEM private key matching `cert_file`.
    pub key_file: Option<PathBuf>,

    /// Disables server certificate verification.
    pub insecure_skip_verify: bool,
}

impl TlsConfig {
    /// The CA bundle path, if set and non-empty.
    pub fn ca_file(&self) -> Option<&Path> {
        non_empty_path(self.ca_file.as_deref())
    }

    /// The client certificate path, if set and non-empty.
    pub fn cert_file(&self) -> Option<&Path> {
        non_empty_path(self.cert_file.as_deref())
    }

    /// The client key path, if set and non-empty.
    pub fn key_file(&self) -> Option<&Path> {
        non_empty_path(self.key_file.as_deref())
    }
}

/// Properties the exporter uses to push metrics to a remote-write endpoint.
///
/// Build one by deserializing a settings document with
/// [`Config::from_toml_str`] or programmatically with the `with_*` setters,
/// then call [`Config::validate`] before use.
///
/// # Security
///
/// Passwords and bearer tokens are held as `SecretString` and never appear in
/// debug output.
///
/// # Examples
///
/// ```
/// use cortex_common::{BasicAuth, Config};
///
/// let mut config = Config::default()
///     .with_endpoint("https://cortex.example.com/api/prom/push")
///     .with_basic_auth(BasicAuth::new("tenant-1").with_password("hunter2"));
///
/// config.validate()?;
/// assert!(config.client.is_some());
/// # Ok::<(), cortex_common::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote-write endpoint URL.
    #[serde(rename = "url")]
    pub endpoint: String,

    /// Whole-request timeout for a single push.
    #[serde(deserialize_with = "duration_from_secs")]
    pub remote_timeout: Duration,

    /// Exporter name, used only for logging.
    pub name: String,

    /// HTTP basic authentication.
    pub basic_auth: Option<BasicAuth>,

    /// Literal bearer token.
    pub bearer_token: Option<SecretString>,

    /// Path to a file holding the bearer token.
    pub bearer_token_file: Option<PathBuf>,

    /// TLS settings.
    pub tls_config: Option<TlsConfig>,

    /// Proxy every request is routed through.
    pub proxy_url: Option<String>,

    /// Interval between pushes, consumed by the caller's push loop.
    #[serde(deserialize_with = "duration_from_secs")]
    pub push_interval: Duration,

    /// Static headers added to every request.
    pub headers: HashMap<String, String>,

    /// HTTP client used to send requests. Filled in by [`Config::validate`]
    /// when not preset.
    #[serde(skip)]
    pub client: Option<reqwest::Client>,
}

impl Config {
    /// Parses a TOML settings document.
    ///
    /// The result is not validated; call [`Config::validate`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the document is malformed or a field
    /// has the wrong type.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Checks for conflicting properties and fills in defaults.
    ///
    /// Defaults are applied only to properties left unset: the endpoint
    /// becomes [`DEFAULT_ENDPOINT`], the remote timeout
    /// [`DEFAULT_REMOTE_TIMEOUT`] and the push interval
    /// [`DEFAULT_PUSH_INTERVAL`]. When no client is preset, a client routed
    /// through `proxy_url` is built if one is configured, and a plain client
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Both `bearer_token` and `bearer_token_file` are set
    /// - Both `basic_auth.password` and `basic_auth.password_file` are set
    /// - The proxy URL is invalid
    /// - The HTTP client cannot be constructed
    pub fn validate(&mut self) -> Result<()> {
        self.check_conflicts()?;
        self.apply_defaults();

        if self.client.is_none() {
            let client = match self.proxy_url() {
                Some(proxy_url) => {
                    debug!("Building proxy-aware HTTP client for exporter '{}'", self.name);
                    transport_builder().proxy(proxy(proxy_url)?).build()?
                }
                None => reqwest::Client::builder().build()?,
            };
            self.client = Some(client);
        }

        Ok(())
    }

    /// Checks that each credential is configured from at most one source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TwoBearerTokens`] or [`ConfigError::TwoPasswords`].
    pub fn check_conflicts(&self) -> Result<()> {
        if self.bearer_token().is_some() && self.bearer_token_file().is_some() {
            return Err(ConfigError::TwoBearerTokens);
        }
        if self
            .basic_auth
            .as_ref()
            .is_some_and(|auth| auth.password().is_some() && auth.password_file().is_some())
        {
            return Err(ConfigError::TwoPasswords);
        }
        Ok(())
    }

    /// Fills in the endpoint, remote timeout and push interval when unset.
    pub fn apply_defaults(&mut self) {
        if self.endpoint.is_empty() {
            self.endpoint = DEFAULT_ENDPOINT.to_string();
        }
        if self.remote_timeout.is_zero() {
            self.remote_timeout = DEFAULT_REMOTE_TIMEOUT;
        }
        if self.push_interval.is_zero() {
            self.push_interval = DEFAULT_PUSH_INTERVAL;
        }
    }

    /// The literal bearer token, if set and non-empty.
    pub fn bearer_token(&self) -> Option<&SecretString> {
        non_empty_secret(self.bearer_token.as_ref())
    }

    /// The bearer token file path, if set and non-empty.
    pub fn bearer_token_file(&self) -> Option<&Path> {
        non_empty_path(self.bearer_token_file.as_deref())
    }

    /// The proxy URL, if set and non-empty.
    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Sets the remote-write endpoint URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the exporter name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the whole-request timeout.
    #[must_use]
    pub const fn with_remote_timeout(mut self, remote_timeout: Duration) -> Self {
        self.remote_timeout = remote_timeout;
        self
    }

    /// Sets the push interval.
    #[must_use]
    pub const fn with_push_interval(mut self, push_interval: Duration) -> Self {
        self.push_interval = push_interval;
        self
    }

    /// Sets basic authentication credentials.
    #[must_use]
    pub fn with_basic_auth(mut self, basic_auth: BasicAuth) -> Self {
        self.basic_auth = Some(basic_auth);
        self
    }

    /// Sets a literal bearer token.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(SecretString::new(token.into().into()));
        self
    }

    /// Sets the path of a file holding the bearer token.
    #[must_use]
    pub fn with_bearer_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.bearer_token_file = Some(path.into());
        self
    }

    /// Sets the TLS settings.
    #[must_use]
    pub fn with_tls_config(mut self, tls_config: TlsConfig) -> Self {
        self.tls_config = Some(tls_config);
        self
    }

    /// Routes every request through the given proxy.
    #[must_use]
    pub fn with_proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }

    /// Adds a static header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Presets the HTTP client, bypassing client construction.
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }
}

fn duration_from_secs<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}

fn non_empty_secret(secret: Option<&SecretString>) -> Option<&SecretString> {
    secret.filter(|s| !s.expose_secret().is_empty())
}

fn non_empty_path(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_config_toml() -> &'static str {
        r#"
url = "https://cortex.example.com/api/prom/push"
remote_timeout = 45
name = "cortex"
bearer_token_file = "/etc/cortex/token"
proxy_url = "http://proxy.internal:3128"
push_interval = 5

[tls_config]
ca_file = "/etc/cortex/ca.pem"
insecure_skip_verify = true

[headers]
X-Scope-OrgID = "tenant-1"
        "#
    }

    #[test]
    fn test_parse_config() {
        let config = Config::from_toml_str(sample_config_toml()).unwrap();

        assert_eq!(config.endpoint, "https://cortex.example.com/api/prom/push");
        assert_eq!(config.remote_timeout, Duration::from_secs(45));
        assert_eq!(config.push_interval, Duration::from_secs(5));
        assert_eq!(config.name, "cortex");
        assert_eq!(
            config.bearer_token_file(),
            Some(Path::new("/etc/cortex/token"))
        );
        assert!(config.bearer_token().is_none());
        assert_eq!(config.proxy_url(), Some("http://proxy.internal:3128"));
        assert_eq!(config.headers.get("X-Scope-OrgID").unwrap(), "tenant-1");

        let tls = config.tls_config.unwrap();
        assert_eq!(tls.ca_file(), Some(Path::new("/etc/cortex/ca.pem")));
        assert!(tls.insecure_skip_verify);
        assert!(tls.cert_file().is_none());
    }

    #[test]
    fn test_parse_basic_auth() {
        let toml = r#"
url = "https://cortex.example.com/api/prom/push"

[basic_auth]
username = "tenant-1"
password = "hunter2"
        "#;

        let config = Config::from_toml_str(toml).unwrap();
        let auth = config.basic_auth.unwrap();
        assert_eq!(auth.username, "tenant-1");
        assert_eq!(auth.password().unwrap().expose_secret(), "hunter2");
        assert!(auth.password_file().is_none());
    }

    #[test]
    fn test_parse_rejects_negative_duration() {
        let err = Config::from_toml_str("remote_timeout = -1").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_defaults_applied_when_unset() {
        let mut config = Config::default();
        config.validate().unwrap();

        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.remote_timeout, DEFAULT_REMOTE_TIMEOUT);
        assert_eq!(config.push_interval, DEFAULT_PUSH_INTERVAL);
        assert!(config.client.is_some());
    }

    #[test]
    fn test_defaults_do_not_override_set_values() {
        let mut config = Config::default()
            .with_endpoint("https://cortex.example.com/push")
            .with_remote_timeout(Duration::from_secs(123))
            .with_push_interval(Duration::from_secs(60));
        config.validate().unwrap();

        assert_eq!(config.endpoint, "https://cortex.example.com/push");
        assert_eq!(config.remote_timeout, Duration::from_secs(123));
        assert_eq!(config.push_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_validate_two_passwords() {
        let mut config = Config::default().with_basic_auth(
            BasicAuth::new("user")
                .with_password("password")
                .with_password_file("passwordFile"),
        );

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::TwoPasswords));
        assert_eq!(err.to_string(), "Cannot have two passwords in the YAML file");
    }

    #[test]
    fn test_validate_two_bearer_tokens() {
        let mut config = Config::default()
            .with_bearer_token("token")
            .with_bearer_token_file("tokenFile");

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::TwoBearerTokens));
    }

    #[test]
    fn test_validate_empty_values_count_as_unset() {
        let mut config = Config::default()
            .with_bearer_token("")
            .with_bearer_token_file("tokenFile")
            .with_basic_auth(
                BasicAuth::new("user")
                    .with_password("")
                    .with_password_file("passwordFile"),
            );

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_conflict_leaves_defaults_unapplied() {
        let mut config = Config::default()
            .with_bearer_token("token")
            .with_bearer_token_file("tokenFile");

        assert!(config.validate().is_err());
        assert!(config.endpoint.is_empty());
        assert!(config.client.is_none());
    }

    #[test]
    fn test_apply_defaults_builds_no_client() {
        let mut config = Config::default().with_proxy_url("http://[not-a-host");

        assert!(config.check_conflicts().is_ok());
        config.apply_defaults();

        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.remote_timeout, DEFAULT_REMOTE_TIMEOUT);
        assert_eq!(config.push_interval, DEFAULT_PUSH_INTERVAL);
        assert!(config.client.is_none());
    }

    #[test]
    fn test_check_conflicts_two_passwords() {
        let config = Config::default().with_basic_auth(
            BasicAuth::new("user")
                .with_password("password")
                .with_password_file("passwordFile"),
        );

        assert!(matches!(
            config.check_conflicts(),
            Err(ConfigError::TwoPasswords)
        ));
    }

    #[test]
    fn test_validate_invalid_proxy_url() {
        let mut config = Config::default().with_proxy_url("http://[not-a-host");

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProxyUrl { .. }));
    }

    #[test]
    fn test_validate_keeps_preset_client_without_touching_proxy() {
        let mut config = Config::default()
            .with_client(reqwest::Client::new())
            .with_proxy_url("http://[not-a-host");

        // The proxy URL is only inspected when a client has to be built.
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::default()
            .with_bearer_token("super-secret-token")
            .with_basic_auth(BasicAuth::new("user").with_password("super-secret-password"));

        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(!debug.contains("super-secret-password"));
    }

    #[tokio::test]
    async fn test_validate_routes_client_through_proxy() {
        let proxy_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/prom/push"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&proxy_server)
            .await;

        let mut config = Config::default().with_proxy_url(proxy_server.uri());
        config.validate().unwrap();

        let client = config.client.clone().unwrap();
        let response = client
            .post("http://cortex.invalid/api/prom/push")
            .send()
            .await
            .unwrap();

        assert!(response.status().is_success());
    }
}
