// src/lib.rs

//! A minimal OpenID Connect provider implementing the implicit flow.
//!
//! The hard core is three tightly coupled pieces: the URI/origin validation
//! in [`uri`] that decides where a signed token may be delivered, the
//! process-lifetime signing key in [`keys`], and the request validation and
//! issuance pipeline in [`request`] and [`issuer`] that ties them together.

pub mod config;
pub mod discovery;
pub mod error;
pub mod issuer;
pub mod keys;
pub mod request;
pub mod server;
pub mod uri;

/// The public prelude for the `lumen-oidc` crate.
///
/// This module re-exports the most commonly used types for convenience.
pub mod prelude {
    pub use crate::config::ProviderConfig;
    pub use crate::discovery::DiscoveryDocument;
    pub use crate::error::ProviderError;
    pub use crate::issuer::{AuthCapability, IdTokenClaims, Subject, TokenIssuer};
    pub use crate::keys::SigningKey;
    pub use crate::request::{AuthParams, AuthorizationRequest};
    pub use crate::server::{AppState, AUTH_PATH, JWKS_PATH};
}
