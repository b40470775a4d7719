//! Error types for the client library.

use std::path::PathBuf;

use cortex_common::ConfigError;
use reqwest::StatusCode;
use reqwest::header::{InvalidHeaderName, InvalidHeaderValue};
use thiserror::Error;

/// Errors that can occur while building the client or pushing a payload.
///
/// Credential problems (missing username, missing password, unreadable files)
/// are reported when the exporter is constructed; transport and status errors
/// are reported per push.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Invalid configuration, including conflicting credential sources.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Basic auth is configured without a username.
    #[error("No username provided for basic authentication")]
    NoBasicAuthUsername,

    /// Basic auth is configured with neither a password nor a password file.
    #[error("No password or password file provided for basic authentication")]
    NoBasicAuthPassword,

    /// A password, bearer token, certificate or key file could not be read.
    #[error("Failed to read file '{}': {source}", path.display())]
    FailedToReadFile {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A bearer token file is empty or holds only whitespace.
    #[error("Bearer token file '{}' is empty", path.display())]
    EmptyBearerTokenFile {
        /// The token file.
        path: PathBuf,
    },

    /// A CA file holds no PEM certificate.
    #[error("No PEM certificates found in '{}'", path.display())]
    NoCertificates {
        /// The CA file.
        path: PathBuf,
    },

    /// A certificate or key file does not contain usable PEM data.
    #[error("Invalid TLS material in '{}': {source}", path.display())]
    Tls {
        /// File the material came from.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint is not an absolute URL.
    #[error("Invalid endpoint URL '{url}': {source}")]
    InvalidEndpoint {
        /// The endpoint as configured.
        url: String,
        /// Underlying parse failure.
        #[source]
        source: url::ParseError,
    },

    /// A static header name is not a valid HTTP header name.
    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] InvalidHeaderName),

    /// A static header or credential is not a valid HTTP header value.
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] InvalidHeaderValue),

    /// Network or HTTP request failure.
    ///
    /// Indicates issues like DNS resolution, connection failures, timeouts or
    /// a client that could not be built.
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("Remote write failed with status {status}: {body}")]
    RemoteWrite {
        /// Status returned by the endpoint.
        status: StatusCode,
        /// Response body, possibly empty.
        body: String,
    },
}

impl ClientError {
    /// Check if this error is potentially retryable.
    ///
    /// Returns `true` for network errors, rate limiting and server errors.
    /// The exporter itself never retries; this is for callers running their
    /// own push loop.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NetworkError(e) => !e.is_builder(),
            Self::RemoteWrite { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }

    /// Check if this error comes from credential handling.
    pub const fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            Self::NoBasicAuthUsername
                | Self::NoBasicAuthPassword
                | Self::FailedToReadFile { .. }
                | Self::EmptyBearerTokenFile { .. }
                | Self::Config(ConfigError::TwoPasswords | ConfigError::TwoBearerTokens)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_write_retryable_statuses() {
        let server_error = ClientError::RemoteWrite {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: String::new(),
        };
        let rate_limited = ClientError::RemoteWrite {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: String::new(),
        };
        let bad_request = ClientError::RemoteWrite {
            status: StatusCode::BAD_REQUEST,
            body: "out of order sample".to_string(),
        };

        assert!(server_error.is_retryable());
        assert!(rate_limited.is_retryable());
        assert!(!bad_request.is_retryable());
    }

    #[test]
    fn test_credential_errors_are_not_retryable() {
        assert!(!ClientError::NoBasicAuthUsername.is_retryable());
        assert!(ClientError::NoBasicAuthUsername.is_authentication_error());
        assert!(ClientError::Config(ConfigError::TwoPasswords).is_authentication_error());
        assert!(
            ClientError::EmptyBearerTokenFile {
                path: PathBuf::from("bearerTokenFile"),
            }
            .is_authentication_error()
        );
    }

    #[test]
    fn test_file_error_names_path() {
        let err = ClientError::FailedToReadFile {
            path: PathBuf::from("missingPasswordFile"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };

        assert!(err.to_string().contains("missingPasswordFile"));
    }
}
