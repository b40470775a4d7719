//! # cortex-client
//!
//! Authenticated HTTP client for pushing metrics to a Cortex (Prometheus
//! remote-write) endpoint.
//!
//! This crate turns a [`cortex_common::Config`] into something that can send:
//! - Basic auth or bearer token credentials, literal or read from files
//! - TLS with a custom CA bundle, optional skip-verify and client certificates
//! - Proxy routing and remote timeouts
//! - The fixed remote-write protocol headers plus any static headers
//!
//! Encoding samples into the remote-write wire format and scheduling pushes
//! are left to the caller.
//!
//! ## Example
//!
//! ```no_run
//! use cortex_client::Exporter;
//! use cortex_common::Config;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_toml_str(r#"
//!     url = "https://cortex.example.com/api/prom/push"
//!     bearer_token_file = "/var/run/secrets/cortex/token"
//!     push_interval = 15
//! "#)?;
//!
//! let exporter = Exporter::new(config)?;
//!
//! // The payload is a snappy-compressed remote-write protobuf built elsewhere.
//! let payload: Vec<u8> = Vec::new();
//! exporter.send(payload).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod exporter;

pub use auth::{AuthScheme, Authenticator};
pub use client::build_client;
pub use error::ClientError;
pub use exporter::{Exporter, REMOTE_WRITE_VERSION, REMOTE_WRITE_VERSION_HEADER};
