// src/discovery.rs

use serde::Serialize;
use url::Url;

/// An OpenID Connect Discovery 1.0 document, per
/// <http://openid.net/specs/openid-connect-discovery-1_0.html>.
///
/// The `form_post` response mode comes from the extension spec at
/// <http://openid.net/specs/oauth-v2-form-post-response-mode-1_0.html>.
///
/// Fully determined by the configured issuer and the two endpoint paths;
/// built once at startup and served verbatim on every request.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryDocument {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub jwks_uri: String,
    pub scopes_supported: Vec<&'static str>,
    pub claims_supported: Vec<&'static str>,
    pub response_types_supported: Vec<&'static str>,
    pub response_modes_supported: Vec<&'static str>,
    pub grant_types_supported: Vec<&'static str>,
    pub subject_types_supported: Vec<&'static str>,
    pub id_token_signing_alg_values_supported: Vec<&'static str>,
}

impl DiscoveryDocument {
    /// Pure construction from the issuer origin and endpoint paths; no I/O.
    pub fn new(issuer: &Url, jwks_path: &str, auth_path: &str) -> Self {
        let origin = issuer.as_str().trim_end_matches('/').to_string();

        Self {
            authorization_endpoint: format!("{origin}{auth_path}"),
            jwks_uri: format!("{origin}{jwks_path}"),
            issuer: origin,
            scopes_supported: vec!["openid", "email"],
            claims_supported: vec![
                "aud",
                "email",
                "email_verified",
                "exp",
                "iat",
                "iss",
                "sub",
            ],
            response_types_supported: vec!["id_token"],
            response_modes_supported: vec!["form_post"],
            grant_types_supported: vec!["implicit"],
            subject_types_supported: vec!["public"],
            id_token_signing_alg_values_supported: vec![crate::keys::SIGNING_ALG],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_is_determined_by_issuer_and_paths() {
        let issuer = Url::parse("https://id.example.com").unwrap();
        let doc = DiscoveryDocument::new(&issuer, "/jwks.json", "/authorize");

        assert_eq!(doc.issuer, "https://id.example.com");
        assert_eq!(doc.authorization_endpoint, "https://id.example.com/authorize");
        assert_eq!(doc.jwks_uri, "https://id.example.com/jwks.json");
        assert_eq!(doc.scopes_supported, ["openid", "email"]);
        assert_eq!(doc.response_types_supported, ["id_token"]);
        assert_eq!(doc.response_modes_supported, ["form_post"]);
        assert_eq!(doc.grant_types_supported, ["implicit"]);
        assert_eq!(doc.id_token_signing_alg_values_supported, ["RS256"]);
    }

    #[test]
    fn serializes_with_standard_member_names() {
        let issuer = Url::parse("https://id.example.com").unwrap();
        let doc = DiscoveryDocument::new(&issuer, "/jwks.json", "/authorize");
        let value = serde_json::to_value(&doc).unwrap();

        for member in [
            "issuer",
            "authorization_endpoint",
            "jwks_uri",
            "scopes_supported",
            "claims_supported",
            "response_types_supported",
            "response_modes_supported",
            "grant_types_supported",
            "subject_types_supported",
            "id_token_signing_alg_values_supported",
        ] {
            assert!(value.get(member).is_some(), "missing member {member:?}");
        }
    }
}
