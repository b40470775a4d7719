//! Shared HTTP transport settings.
//!
//! Every client the exporter builds starts from [`transport_builder`], so the
//! proxy-only client created during validation and the fully configured client
//! built by `cortex-client` behave the same on the wire.

use std::time::Duration;

use reqwest::{ClientBuilder, Proxy};

use crate::error::{ConfigError, Result};

/// Maximum time to establish a connection, TLS handshake included.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Interval between TCP keep-alive probes.
pub const TCP_KEEPALIVE: Duration = Duration::from_secs(30);

/// How long an idle pooled connection is kept open.
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Maximum idle connections kept per host.
pub const POOL_MAX_IDLE_PER_HOST: usize = 100;

/// Returns a client builder preloaded with the standard transport timeouts.
#[must_use]
pub fn transport_builder() -> ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .tcp_keepalive(TCP_KEEPALIVE)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
}

/// Builds a proxy that routes every request, HTTP and HTTPS alike.
///
/// A bare `host:port` without a scheme is treated as `http://host:port`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidProxyUrl`] if the URL cannot be parsed.
pub fn proxy(url: &str) -> Result<Proxy> {
    Proxy::all(url).map_err(|source| ConfigError::InvalidProxyUrl {
        url: url.to_string(),
        source,
    })
}
