//! Request authentication.
//!
//! An [`Authenticator`] is resolved once from a validated [`Config`]: password
//! and token files are read at that point, and the resulting `Authorization`
//! value is reused for every request. Basic auth takes precedence over a
//! bearer token when both are configured.

use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::debug;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use cortex_common::{BasicAuth, Config};

use crate::error::ClientError;

/// The kind of credentials an [`Authenticator`] attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// No `Authorization` header is added.
    None,
    /// `Authorization: Basic <base64(username:password)>`.
    Basic,
    /// `Authorization: Bearer <token>`.
    Bearer,
}

/// Adds the configured `Authorization` header to outgoing requests.
///
/// The header value is marked sensitive so it is redacted from debug output.
#[derive(Debug, Clone)]
pub struct Authenticator {
    scheme: AuthScheme,
    authorization: Option<HeaderValue>,
}

impl Authenticator {
    /// Resolves credentials from the configuration.
    ///
    /// Trailing line terminators are stripped from file contents, since a
    /// header value cannot carry a newline. Other whitespace is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Both a password and a password file, or both a bearer token and a
    ///   bearer token file, are set
    /// - Basic auth is configured with an empty username
    /// - Basic auth has neither a password nor a password file
    /// - A password or bearer token file cannot be read
    /// - A bearer token file is empty or holds only whitespace
    /// - The resulting credential is not a valid header value
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        config.check_conflicts()?;

        if let Some(basic_auth) = &config.basic_auth {
            debug!("Authenticating remote-write requests with basic auth");
            return Ok(Self {
                scheme: AuthScheme::Basic,
                authorization: Some(basic_authorization(basic_auth)?),
            });
        }

        let token = match config.bearer_token_file() {
            Some(path) => {
                let token = read_secret(path)?;
                if token.expose_secret().trim().is_empty() {
                    return Err(ClientError::EmptyBearerTokenFile {
                        path: path.to_path_buf(),
                    });
                }
                Some(token)
            }
            None => config.bearer_token().cloned(),
        };

        match token {
            Some(token) => {
                debug!("Authenticating remote-write requests with a bearer token");
                Ok(Self {
                    scheme: AuthScheme::Bearer,
                    authorization: Some(sensitive_header(&format!(
                        "Bearer {}",
                        token.expose_secret()
                    ))?),
                })
            }
            None => Ok(Self::none()),
        }
    }

    /// An authenticator that leaves requests untouched.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            scheme: AuthScheme::None,
            authorization: None,
        }
    }

    /// The kind of credentials this authenticator attaches.
    #[must_use]
    pub const fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    /// Sets the `Authorization` header, replacing any existing one.
    ///
    /// Does nothing when no credentials are configured.
    pub fn authenticate(&self, headers: &mut HeaderMap) {
        if let Some(value) = &self.authorization {
            headers.insert(AUTHORIZATION, value.clone());
        }
    }
}

fn basic_authorization(auth: &BasicAuth) -> Result<HeaderValue, ClientError> {
    if auth.username.is_empty() {
        return Err(ClientError::NoBasicAuthUsername);
    }

    let password = match (auth.password_file(), auth.password()) {
        (Some(path), _) => read_secret(path)?,
        (None, Some(password)) => password.clone(),
        (None, None) => return Err(ClientError::NoBasicAuthPassword),
    };

    let credentials = SecretString::new(
        format!("{}:{}", auth.username, password.expose_secret()).into(),
    );
    let encoded = STANDARD.encode(credentials.expose_secret());

    sensitive_header(&format!("Basic {encoded}"))
}

fn read_secret(path: &Path) -> Result<SecretString, ClientError> {
    let contents = fs::read_to_string(path).map_err(|source| ClientError::FailedToReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(SecretString::new(
        contents.trim_end_matches(['\r', '\n']).into(),
    ))
}

fn sensitive_header(value: &str) -> Result<HeaderValue, ClientError> {
    let mut header = HeaderValue::from_str(value)?;
    header.set_sensitive(true);
    Ok(header)
}
