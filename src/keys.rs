// src/keys.rs

//! Process-lifetime signing key management.
//!
//! The provider holds exactly one ephemeral RSA keypair, generated at
//! startup and never persisted or rotated. The private half never leaves
//! this module; relying parties see only the JWK Set.

use crate::error::ProviderError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::EncodingKey;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::info;

/// The only signing algorithm this provider supports.
pub const SIGNING_ALG: &str = "RS256";

const KEY_BITS: usize = 2048;

/// The provider's identity: one RSA keypair held for the process lifetime.
pub struct SigningKey {
    encoding_key: EncodingKey,
    key_id: String,
    jwk_set: Value,
}

impl SigningKey {
    /// Generates a fresh 2048-bit keypair.
    ///
    /// Failure here is a startup precondition violation; callers must not
    /// serve traffic without a key.
    pub fn generate() -> Result<Self, ProviderError> {
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, KEY_BITS)
            .map_err(|e| ProviderError::KeyGeneration(e.to_string()))?;

        Self::from_private_key(private_key)
    }

    fn from_private_key(private_key: RsaPrivateKey) -> Result<Self, ProviderError> {
        // jsonwebtoken's PEM route has awkward trait bounds; converting to
        // PKCS#1 DER ourselves is the reliable path to an EncodingKey.
        let pkcs1_der = private_key.to_pkcs1_der().map_err(|e| {
            ProviderError::KeyGeneration(format!("converting key to PKCS#1 DER: {e}"))
        })?;
        let encoding_key = EncodingKey::from_rsa_der(pkcs1_der.as_bytes());

        let public_key = private_key.to_public_key();
        let key_id = key_id(&public_key);

        let n = URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be());
        let e = URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be());
        let jwk_set = json!({
            "keys": [{
                "kty": "RSA",
                "n": n,
                "e": e,
                "kid": key_id,
                "alg": SIGNING_ALG,
                "use": "sig",
            }]
        });

        info!(kid = %key_id, "generated ephemeral signing key");

        Ok(Self {
            encoding_key,
            key_id,
            jwk_set,
        })
    }

    /// The key identifier carried in JWT headers and the published JWK.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// The signing key in the form `jsonwebtoken` consumes.
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// The JWK Set containing exactly the current public key. Holds no
    /// private material; safe to serve verbatim to anyone.
    pub fn publishable_key_set(&self) -> &Value {
        &self.jwk_set
    }
}

/// Deterministic key identifier: lowercase hex SHA-256 of the big-endian
/// public modulus bytes. A pure function of the key, so JWKS consumers can
/// cache by key ID.
pub fn key_id(key: &RsaPublicKey) -> String {
    let digest = Sha256::digest(key.n().to_bytes_be());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
