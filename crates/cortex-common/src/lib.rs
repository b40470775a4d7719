//! # cortex-common
//!
//! Configuration types for the Cortex remote-write exporter.
//!
//! This crate holds everything the exporter knows before it sends a byte:
//! - The settings document shape (`url`, timeouts, auth, TLS, proxy, headers)
//! - Validation of mutually exclusive credential sources
//! - Default values for the endpoint, remote timeout and push interval
//! - The shared HTTP transport settings
//!
//! ## Example
//!
//! ```
//! use cortex_common::{Config, DEFAULT_PUSH_INTERVAL};
//!
//! let mut config = Config::from_toml_str(r#"
//!     url = "https://cortex.example.com/api/prom/push"
//!     bearer_token = "abc123"
//! "#)?;
//!
//! config.validate()?;
//! assert_eq!(config.push_interval, DEFAULT_PUSH_INTERVAL);
//! # Ok::<(), cortex_common::ConfigError>(())
//! ```

/// Exporter configuration, defaults and validation.
pub mod config;
/// Configuration error types.
pub mod error;
/// Standard transport timeouts and proxy construction.
pub mod transport;

pub use config::{
    BasicAuth, Config, DEFAULT_ENDPOINT, DEFAULT_PUSH_INTERVAL, DEFAULT_REMOTE_TIMEOUT, TlsConfig,
};
pub use error::ConfigError;
pub use transport::{proxy, transport_builder};
