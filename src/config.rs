// src/config.rs

use crate::error::ProviderError;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use url::Url;

/// Environment variable that overrides the configured listening port.
/// Useful under process supervisors and PaaS runtimes that assign ports.
pub const PORT_ENV_VAR: &str = "PORT";

/// Process-wide provider configuration, constructed once at startup and
/// passed piecewise into the components that need it. Compiled-in defaults
/// only for now; a real config loader is a known gap.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// The issuer origin placed in discovery metadata and the `iss` claim.
    pub issuer: Url,
    /// The address the server binds to.
    pub address: IpAddr,
    /// The default listening port, overridable via `PORT`.
    pub port: u16,
    /// The lifetime of issued ID tokens (`exp` - `iat`).
    pub token_ttl: Duration,
    /// The upper bound on how long one identity check may run.
    pub auth_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            issuer: Url::parse("https://laoidc.example.com").expect("default issuer must parse"),
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3333,
            token_ttl: Duration::from_secs(10 * 60),
            auth_timeout: Duration::from_secs(2 * 60),
        }
    }
}

impl ProviderConfig {
    /// The issuer origin as a string, without a trailing slash, matching the
    /// `issuer` member of the discovery document.
    pub fn issuer_origin(&self) -> String {
        self.issuer.as_str().trim_end_matches('/').to_string()
    }

    /// The port to listen on: a present, non-empty `PORT` environment
    /// variable takes precedence over the configured default.
    pub fn effective_port(&self) -> Result<u16, ProviderError> {
        match std::env::var(PORT_ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => {
                value.trim().parse::<u16>().map_err(|_| {
                    ProviderError::Configuration(format!(
                        "{PORT_ENV_VAR} must be a port number, got {value:?}"
                    ))
                })
            }
            _ => Ok(self.port),
        }
    }
}
