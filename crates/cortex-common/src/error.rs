//! Error types for exporter configuration.

use thiserror::Error;

/// Errors raised while reading or validating a [`Config`](crate::Config).
///
/// All of these are configuration problems detected once at startup; none of
/// them are worth retrying.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Both `basic_auth.password` and `basic_auth.password_file` are set.
    #[error("Cannot have two passwords in the YAML file")]
    TwoPasswords,

    /// Both `bearer_token` and `bearer_token_file` are set.
    #[error("Cannot have two bearer tokens in the YAML file")]
    TwoBearerTokens,

    /// The proxy URL could not be turned into a proxy.
    #[error("Invalid proxy URL '{url}': {source}")]
    InvalidProxyUrl {
        /// The offending URL as written in the configuration.
        url: String,
        /// Underlying parse failure.
        #[source]
        source: reqwest::Error,
    },

    /// The fallback HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// The settings document is not valid TOML or has the wrong shape.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias using `ConfigError`.
pub type Result<T> = std::result::Result<T, ConfigError>;
