//! Remote-write exporter.
//!
//! The [`Exporter`] owns a validated configuration, the HTTP client and the
//! resolved credentials. Each call to [`Exporter::send`] pushes one payload
//! that the caller has already encoded (snappy-compressed protobuf).
//!
//! # Examples
//!
//! ```no_run
//! use cortex_client::Exporter;
//! use cortex_common::{BasicAuth, Config};
//!
//! # async fn example(payload: Vec<u8>) -> Result<(), cortex_client::ClientError> {
//! let config = Config::default()
//!     .with_endpoint("https://cortex.example.com/api/prom/push")
//!     .with_basic_auth(BasicAuth::new("tenant-1").with_password_file("/etc/cortex/password"))
//!     .with_header("X-Scope-OrgID", "tenant-1");
//!
//! let exporter = Exporter::new(config)?;
//! exporter.send(payload).await?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, warn};
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use url::Url;

use cortex_common::Config;

use crate::auth::Authenticator;
use crate::client::build_client;
use crate::error::ClientError;

/// Header carrying the remote-write protocol version.
pub const REMOTE_WRITE_VERSION_HEADER: HeaderName =
    HeaderName::from_static("x-prometheus-remote-write-version");

/// Remote-write protocol version sent with every request.
pub const REMOTE_WRITE_VERSION: &str = "0.1.0";

/// Pushes authenticated remote-write requests to a single endpoint.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct Exporter {
    config: Arc<Config>,
    client: reqwest::Client,
    authenticator: Authenticator,
    endpoint: Url,
    headers: HeaderMap,
}

// Manual Debug so the configured endpoint is shown without dumping the client
impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("name", &self.config.name)
            .field("endpoint", &self.endpoint.as_str())
            .field("auth", &self.authenticator.scheme())
            .finish_non_exhaustive()
    }
}

impl Exporter {
    /// Creates an exporter from a configuration.
    ///
    /// The configuration is validated first: conflicting credential sources
    /// are rejected and defaults filled in. A client preset on the
    /// configuration is used as is; otherwise one is built once from the TLS,
    /// proxy and timeout settings. Credential files are read once, here.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid (conflicting credential sources, bad proxy URL)
    /// - The endpoint is not an absolute URL
    /// - A static header name or value is invalid
    /// - Credentials are incomplete or a credential file cannot be read
    /// - A TLS file cannot be read or parsed
    pub fn new(mut config: Config) -> Result<Self, ClientError> {
        config.check_conflicts()?;
        config.apply_defaults();

        let endpoint = Url::parse(&config.endpoint).map_err(|source| {
            ClientError::InvalidEndpoint {
                url: config.endpoint.clone(),
                source,
            }
        })?;
        let headers = static_headers(&config.headers)?;
        let authenticator = Authenticator::from_config(&config)?;

        let client = match config.client.clone() {
            Some(client) => client,
            None => {
                let client = build_client(&config)?;
                config.client = Some(client.clone());
                client
            }
        };

        debug!(
            "Created remote-write exporter '{}' for {}",
            config.name,
            endpoint.host_str().unwrap_or_default()
        );

        Ok(Self {
            config: Arc::new(config),
            client,
            authenticator,
            endpoint,
            headers,
        })
    }

    /// The validated configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Interval the caller's push loop should wait between pushes.
    #[must_use]
    pub fn push_interval(&self) -> Duration {
        self.config.push_interval
    }

    /// The HTTP client requests are sent with.
    #[must_use]
    pub const fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// The resolved credentials.
    #[must_use]
    pub const fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    /// Decorates a header map for a remote-write request.
    ///
    /// Sets the remote-write protocol headers, then the static headers from
    /// the configuration, then the `Authorization` header if credentials are
    /// configured.
    pub fn add_headers(&self, headers: &mut HeaderMap) {
        headers.insert(
            REMOTE_WRITE_VERSION_HEADER,
            HeaderValue::from_static(REMOTE_WRITE_VERSION),
        );
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static("snappy"));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-protobuf"),
        );

        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }

        self.authenticator.authenticate(headers);
    }

    /// Builds an authenticated POST request carrying `body`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be constructed.
    pub fn build_request(
        &self,
        body: impl Into<reqwest::Body>,
    ) -> Result<reqwest::Request, ClientError> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .body(body)
            .build()?;
        self.add_headers(request.headers_mut());
        Ok(request)
    }

    /// Sends one encoded payload to the remote endpoint.
    ///
    /// The request is attempted once; retrying is up to the caller (see
    /// [`ClientError::is_retryable`]).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NetworkError`] if the request fails to complete
    /// and [`ClientError::RemoteWrite`] if the endpoint answers with a
    /// non-2xx status.
    pub async fn send(&self, body: impl Into<reqwest::Body>) -> Result<(), ClientError> {
        let request = self.build_request(body)?;
        debug!("Pushing remote-write request for exporter '{}'", self.config.name);

        let response = self.client.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_else(|e| {
            warn!("Failed to read error response body: {e}");
            String::new()
        });

        error!(
            "Remote write for exporter '{}' failed with status {}: {}",
            self.config.name,
            status.as_u16(),
            body
        );

        Err(ClientError::RemoteWrite { status, body })
    }
}

fn static_headers(headers: &HashMap<String, String>) -> Result<HeaderMap, ClientError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        map.insert(
            HeaderName::from_bytes(name.as_bytes())?,
            HeaderValue::from_str(value)?,
        );
    }
    Ok(map)
}
