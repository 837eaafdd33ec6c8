// src/issuer.rs

//! ID token construction, signing, and delivery preparation.
//!
//! A request that reaches the issuer has already passed validation. The
//! issuer selects an authentication capability for the login hint, drives
//! it to completion under a bounded timeout, and on success signs an ID
//! token scoped to the relying party.

use crate::error::ProviderError;
use crate::keys::SigningKey;
use crate::request::AuthorizationRequest;
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, Header};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, instrument, warn};

/// An identity confirmed by an authentication capability.
#[derive(Debug, Clone)]
pub struct Subject {
    /// Stable subject identifier, placed in the `sub` claim.
    pub id: String,
    pub email: String,
    pub email_verified: bool,
}

/// The external identity-check interface.
///
/// Concrete variants (email link, federated, password) live outside this
/// core; the issuer depends only on this trait, so tests can supply fakes.
/// `authenticate` may suspend while waiting on an external check; it must
/// hold no lock while doing so, and the issuer cancels it after a bounded
/// timeout.
#[async_trait]
pub trait AuthCapability: Send + Sync {
    /// Whether this capability can authenticate the given login hint.
    fn handles(&self, login_hint: &str) -> bool;

    /// Drives the identity check to completion, confirming the subject
    /// named by the login hint or refusing.
    async fn authenticate(&self, login_hint: &str) -> Result<Subject, ProviderError>;
}

/// Claims of an issued ID token.
#[derive(Debug, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub iss: String,
    pub sub: String,
    /// The relying party's client_id.
    pub aud: String,
    pub exp: u64,
    pub iat: u64,
    /// Copied verbatim from the request when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    pub email: String,
    pub email_verified: bool,
}

/// A signed token plus everything needed to deliver it to the relying party
/// over the browser redirect channel.
#[derive(Debug)]
pub struct IssuedToken {
    pub id_token: String,
    /// Echoed outside the token, next to it in the form post.
    pub state: Option<String>,
    pub redirect_uri: String,
    pub response_mode: String,
}

pub struct TokenIssuer {
    issuer: String,
    key: Arc<SigningKey>,
    capabilities: Vec<Arc<dyn AuthCapability>>,
    token_ttl: Duration,
    auth_timeout: Duration,
}

impl TokenIssuer {
    pub fn new(
        issuer: String,
        key: Arc<SigningKey>,
        capabilities: Vec<Arc<dyn AuthCapability>>,
        token_ttl: Duration,
        auth_timeout: Duration,
    ) -> Self {
        if capabilities.is_empty() {
            warn!("no authentication capabilities registered; every authorization will fail");
        }
        Self {
            issuer,
            key,
            capabilities,
            token_ttl,
            auth_timeout,
        }
    }

    /// Runs a validated request to one of its two terminal outcomes: a
    /// signed token ready for delivery, or a failure naming what went wrong.
    #[instrument(skip(self, request), fields(client_id = %request.client_id))]
    pub async fn authorize(
        &self,
        request: AuthorizationRequest,
    ) -> Result<IssuedToken, ProviderError> {
        let capability = self
            .capabilities
            .iter()
            .find(|c| c.handles(&request.login_hint))
            .ok_or_else(|| {
                ProviderError::AuthenticationFailed(format!(
                    "no authentication capability can handle '{}'",
                    request.login_hint
                ))
            })?;

        debug!(login_hint = %request.login_hint, "starting identity check");

        let subject = match tokio::time::timeout(
            self.auth_timeout,
            capability.authenticate(&request.login_hint),
        )
        .await
        {
            Ok(Ok(subject)) => subject,
            Ok(Err(e)) => {
                warn!(login_hint = %request.login_hint, error = %e, "identity check refused");
                return Err(ProviderError::AuthenticationFailed(e.to_string()));
            }
            Err(_) => {
                warn!(login_hint = %request.login_hint, "identity check timed out");
                return Err(ProviderError::AuthenticationFailed(
                    "the identity check did not complete in time".to_string(),
                ));
            }
        };

        let id_token = self.sign(&request, &subject)?;

        info!(aud = %request.client_id, sub = %subject.id, "issued id_token");

        Ok(IssuedToken {
            id_token,
            state: request.state,
            redirect_uri: request.redirect_uri,
            response_mode: request.response_mode,
        })
    }

    fn sign(
        &self,
        request: &AuthorizationRequest,
        subject: &Subject,
    ) -> Result<String, ProviderError> {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| ProviderError::Signing("system clock is before the Unix epoch".into()))?
            .as_secs();

        let claims = IdTokenClaims {
            iss: self.issuer.clone(),
            sub: subject.id.clone(),
            aud: request.client_id.clone(),
            exp: iat + self.token_ttl.as_secs(),
            iat,
            nonce: request.nonce.clone(),
            email: subject.email.clone(),
            email_verified: subject.email_verified,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.key.key_id().to_string());

        encode(&header, &claims, self.key.encoding_key())
            .map_err(|e| ProviderError::Signing(e.to_string()))
    }
}
