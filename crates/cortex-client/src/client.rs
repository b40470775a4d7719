//! HTTP client construction.
//!
//! [`build_client`] turns the TLS, proxy and timeout settings of a [`Config`]
//! into a `reqwest::Client`. Client certificates must be PEM with a PKCS#8
//! private key.

use std::fs;
use std::path::Path;

use log::{debug, warn};
use reqwest::{Certificate, ClientBuilder, Identity};

use cortex_common::{Config, TlsConfig, proxy, transport_builder};

use crate::error::ClientError;

/// Builds the HTTP client used to push to the remote endpoint.
///
/// The client starts from the standard transport settings, then:
/// - trusts the certificates in `tls_config.ca_file` in addition to the system roots
/// - skips server verification when `tls_config.insecure_skip_verify` is set
/// - presents `tls_config.cert_file`/`key_file` as a client identity when both are set
/// - routes every request through `proxy_url`
/// - applies `remote_timeout` to the whole request when non-zero
///
/// # Errors
///
/// Returns an error if a CA, certificate or key file cannot be read or parsed,
/// if the proxy URL is invalid, or if the client cannot be constructed.
pub fn build_client(config: &Config) -> Result<reqwest::Client, ClientError> {
    let mut builder = transport_builder();

    if let Some(tls) = &config.tls_config {
        builder = apply_tls(builder, tls)?;
    }

    if let Some(proxy_url) = config.proxy_url() {
        debug!("Routing remote-write requests through a proxy");
        builder = builder.proxy(proxy(proxy_url)?);
    }

    if !config.remote_timeout.is_zero() {
        builder = builder.timeout(config.remote_timeout);
    }

    Ok(builder.build()?)
}

fn apply_tls(mut builder: ClientBuilder, tls: &TlsConfig) -> Result<ClientBuilder, ClientError> {
    if let Some(ca_file) = tls.ca_file() {
        let pem = read_file(ca_file)?;
        let certificates = Certificate::from_pem_bundle(&pem).map_err(|source| ClientError::Tls {
            path: ca_file.to_path_buf(),
            source,
        })?;
        if certificates.is_empty() {
            return Err(ClientError::NoCertificates {
                path: ca_file.to_path_buf(),
            });
        }
        debug!(
            "Trusting {} CA certificate(s) from {}",
            certificates.len(),
            ca_file.display()
        );
        for certificate in certificates {
            builder = builder.add_root_certificate(certificate);
        }
    }

    if tls.insecure_skip_verify {
        warn!("TLS certificate verification is disabled for the remote-write endpoint");
        builder = builder.danger_accept_invalid_certs(true);
    }

    match (tls.cert_file(), tls.key_file()) {
        (Some(cert_file), Some(key_file)) => {
            let cert = read_file(cert_file)?;
            let key = read_file(key_file)?;
            let identity =
                Identity::from_pkcs8_pem(&cert, &key).map_err(|source| ClientError::Tls {
                    path: cert_file.to_path_buf(),
                    source,
                })?;
            builder = builder.identity(identity);
        }
        (Some(_), None) | (None, Some(_)) => {
            warn!("Ignoring client certificate: both cert_file and key_file are required");
        }
        (None, None) => {}
    }

    Ok(builder)
}

fn read_file(path: &Path) -> Result<Vec<u8>, ClientError> {
    fs::read(path).map_err(|source| ClientError::FailedToReadFile {
        path: path.to_path_buf(),
        source,
    })
}
