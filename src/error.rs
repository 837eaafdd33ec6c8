// src/error.rs

use thiserror::Error;

/// The primary error type for the `lumen-oidc` provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// RSA key generation or key material conversion failed. The process
    /// must not serve traffic without a signing key, so this is fatal at
    /// startup rather than a per-request error.
    #[error("Signing key generation failed: {0}")]
    KeyGeneration(String),

    /// A configuration value is invalid (e.g. a non-numeric PORT override).
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A required authorization request field is absent or blank.
    #[error("No value for: {0}")]
    MissingField(&'static str),

    /// A present authorization request field fails its semantic rule.
    #[error("{0}")]
    InvalidValue(&'static str),

    /// The request body could not be parsed. Reported only when no
    /// field-level error applies.
    #[error("Malformed request body: {0}")]
    Transport(String),

    /// The selected authentication capability could not confirm the subject,
    /// or no capability was able to handle the login hint.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// ID token signing failed. Logged internally and surfaced to the client
    /// as a generic server error, never with signing internals.
    #[error("Token signing failed: {0}")]
    Signing(String),
}

impl ProviderError {
    /// The machine-readable error kind used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::MissingField(_) => "missing_field",
            ProviderError::InvalidValue(_) => "invalid_value",
            ProviderError::Transport(_) => "transport_error",
            ProviderError::AuthenticationFailed(_) => "authentication_failed",
            ProviderError::KeyGeneration(_)
            | ProviderError::Configuration(_)
            | ProviderError::Signing(_) => "server_error",
        }
    }
}
