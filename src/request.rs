// src/request.rs

//! Authorization request parsing and validation.
//!
//! Validation runs in two phases: a completeness pass over the required
//! fields in a fixed order, then value-level checks. Later checks assume
//! non-blank values, so the order is load-bearing.

use crate::error::ProviderError;
use crate::uri;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

/// The only scope combination this provider issues tokens for.
pub const REQUIRED_SCOPE: &str = "openid email";

/// The only response type: implicit flow, ID token only.
pub const RESPONSE_TYPE_ID_TOKEN: &str = "id_token";

/// The only supported delivery mode for issued tokens.
pub const RESPONSE_MODE_FORM_POST: &str = "form_post";

/// Syntactic sanity check for login hints. This is not a deliverability
/// guarantee and may exclude some legitimate addresses.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9+\-_.]*@[A-Za-z0-9.-]+$").expect("email regex must compile")
});

/// Raw authorization request parameters, as deserialized from the form body.
#[derive(Debug, Default, Deserialize)]
pub struct AuthParams {
    pub scope: Option<String>,
    pub response_type: Option<String>,
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub login_hint: Option<String>,
    pub response_mode: Option<String>,
    pub state: Option<String>,
    pub nonce: Option<String>,
}

/// A fully validated authorization request. Construction goes through
/// [`AuthParams::validate`]; every field has already passed its rule.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub scope: String,
    pub response_type: String,
    /// The relying party identifier, an origin-only URL that also scopes
    /// where the token may be delivered.
    pub client_id: String,
    pub redirect_uri: String,
    pub login_hint: String,
    /// Defaults to `form_post` when the request omits it.
    pub response_mode: String,
    /// Opaque; echoed back outside the token.
    pub state: Option<String>,
    /// Opaque; echoed back inside the token's claims.
    pub nonce: Option<String>,
}

fn required<'a>(
    name: &'static str,
    value: &'a Option<String>,
) -> Result<&'a str, ProviderError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ProviderError::MissingField(name)),
    }
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

impl AuthParams {
    /// Validates the request, yielding an [`AuthorizationRequest`] with
    /// trimmed fields, or the first failing check.
    pub fn validate(&self) -> Result<AuthorizationRequest, ProviderError> {
        // Phase 1: completeness, in fixed order. A blank required field is
        // reported before any value-level rule runs.
        let scope = required("scope", &self.scope)?;
        let response_type = required("response_type", &self.response_type)?;
        let client_id = required("client_id", &self.client_id)?;
        let redirect_uri = required("redirect_uri", &self.redirect_uri)?;
        let login_hint = required("login_hint", &self.login_hint)?;

        let response_mode = optional(&self.response_mode);

        // Phase 2: value-level checks, each independently falsifiable. The
        // first failing check's description is surfaced.
        let checks: [(bool, &'static str); 8] = [
            (
                scope == REQUIRED_SCOPE,
                "scope must be exactly 'openid email'",
            ),
            (
                response_type == RESPONSE_TYPE_ID_TOKEN,
                "response_type must be exactly 'id_token'",
            ),
            (
                uri::valid_uri(client_id),
                "client_id must be a valid url: absolute, http or https, \
                 without userinfo or default ports",
            ),
            (
                uri::only_origin(client_id),
                "client_id must not include paths, query values, or fragments",
            ),
            (
                uri::valid_uri(redirect_uri),
                "redirect_uri must be a valid url: absolute, http or https, \
                 without userinfo or default ports",
            ),
            (
                uri::contained_by(redirect_uri, client_id),
                "redirect_uri must be an absolute url that falls within client_id's origin",
            ),
            (
                response_mode
                    .as_deref()
                    .is_none_or(|mode| mode == RESPONSE_MODE_FORM_POST),
                "the only supported response_mode is 'form_post'",
            ),
            (
                EMAIL_RE.is_match(login_hint),
                "login_hint does not look like an email address",
            ),
        ];

        for (pass, description) in checks {
            if !pass {
                return Err(ProviderError::InvalidValue(description));
            }
        }

        Ok(AuthorizationRequest {
            scope: scope.to_owned(),
            response_type: response_type.to_owned(),
            client_id: client_id.to_owned(),
            redirect_uri: redirect_uri.to_owned(),
            login_hint: login_hint.to_owned(),
            response_mode: response_mode.unwrap_or_else(|| RESPONSE_MODE_FORM_POST.to_owned()),
            state: optional(&self.state),
            nonce: optional(&self.nonce),
        })
    }

    // Best-effort recovery of known fields from a body the strict parser
    // rejected, so validation can still name a specific problem. First
    // occurrence of each field wins; unknown fields are skipped.
    fn from_lenient(body: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
            let slot = match key.as_ref() {
                "scope" => &mut params.scope,
                "response_type" => &mut params.response_type,
                "client_id" => &mut params.client_id,
                "redirect_uri" => &mut params.redirect_uri,
                "login_hint" => &mut params.login_hint,
                "response_mode" => &mut params.response_mode,
                "state" => &mut params.state,
                "nonce" => &mut params.nonce,
                _ => continue,
            };
            slot.get_or_insert_with(|| value.into_owned());
        }
        params
    }
}

/// Parses and validates a form-encoded authorization request body.
///
/// Field-level errors take priority over transport errors: when the strict
/// parse fails, whatever fields did arrive are still validated, and only a
/// request with no more specific problem is reported as malformed.
pub fn parse_form(body: &str) -> Result<AuthorizationRequest, ProviderError> {
    let (params, parse_err) = match serde_urlencoded::from_str::<AuthParams>(body) {
        Ok(params) => (params, None),
        Err(e) => (AuthParams::from_lenient(body), Some(e.to_string())),
    };

    let request = params.validate()?;

    match parse_err {
        Some(detail) => Err(ProviderError::Transport(detail)),
        None => Ok(request),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn good_params() -> AuthParams {
        AuthParams {
            scope: Some("openid email".into()),
            response_type: Some("id_token".into()),
            client_id: Some("http://example.com".into()),
            redirect_uri: Some("http://example.com/cb".into()),
            login_hint: Some("a@example.com".into()),
            ..AuthParams::default()
        }
    }

    #[test]
    fn accepts_a_complete_valid_request() {
        let request = good_params().validate().unwrap();
        assert_eq!(request.client_id, "http://example.com");
        assert_eq!(request.redirect_uri, "http://example.com/cb");
        assert_eq!(request.response_mode, RESPONSE_MODE_FORM_POST);
        assert_eq!(request.state, None);
        assert_eq!(request.nonce, None);
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let mut params = good_params();
        params.scope = Some("  openid email \n".into());
        params.login_hint = Some(" a@example.com ".into());
        params.state = Some("   ".into());

        let request = params.validate().unwrap();
        assert_eq!(request.scope, "openid email");
        assert_eq!(request.login_hint, "a@example.com");
        // Blank optional fields are treated as absent.
        assert_eq!(request.state, None);
    }

    #[test]
    fn missing_login_hint_is_reported_before_value_checks() {
        let mut params = good_params();
        params.login_hint = None;
        // Even with an invalid scope, the completeness failure wins.
        params.scope = Some("openid profile".into());

        match params.validate() {
            Err(ProviderError::MissingField(name)) => assert_eq!(name, "login_hint"),
            other => panic!("expected MissingField(login_hint), got {other:?}"),
        }
    }

    #[test]
    fn blank_required_field_counts_as_missing() {
        let mut params = good_params();
        params.redirect_uri = Some("   ".into());

        match params.validate() {
            Err(ProviderError::MissingField(name)) => assert_eq!(name, "redirect_uri"),
            other => panic!("expected MissingField(redirect_uri), got {other:?}"),
        }
    }

    #[test]
    fn rejects_wrong_scope_and_response_type() {
        let mut params = good_params();
        params.scope = Some("openid".into());
        assert!(matches!(
            params.validate(),
            Err(ProviderError::InvalidValue(d)) if d.contains("scope")
        ));

        let mut params = good_params();
        params.response_type = Some("code".into());
        assert!(matches!(
            params.validate(),
            Err(ProviderError::InvalidValue(d)) if d.contains("response_type")
        ));
    }

    #[test]
    fn rejects_non_origin_client_id() {
        let mut params = good_params();
        params.client_id = Some("http://example.com/app".into());
        assert!(matches!(
            params.validate(),
            Err(ProviderError::InvalidValue(d)) if d.contains("client_id")
        ));
    }

    #[test]
    fn rejects_redirect_outside_client_origin() {
        let mut params = good_params();
        params.redirect_uri = Some("http://evil.com/cb".into());

        match params.validate() {
            Err(ProviderError::InvalidValue(description)) => {
                assert!(
                    description.contains("falls within client_id's origin"),
                    "unexpected description: {description}"
                );
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn response_mode_must_be_form_post_when_present() {
        let mut params = good_params();
        params.response_mode = Some("form_post".into());
        assert!(params.validate().is_ok());

        let mut params = good_params();
        params.response_mode = Some("params_post".into());
        assert!(matches!(
            params.validate(),
            Err(ProviderError::InvalidValue(d)) if d.contains("response_mode")
        ));

        let mut params = good_params();
        params.response_mode = Some("fragment".into());
        assert!(params.validate().is_err());
    }

    #[test]
    fn login_hint_grammar() {
        let valid = ["foo@example.com", "foo@example", "foo+bar123@example.com", "f.o.o@example.com"];
        let invalid = ["@example.com", "foo@", "foo", "+foo@example.com"];

        for hint in valid {
            let mut params = good_params();
            params.login_hint = Some(hint.into());
            assert!(params.validate().is_ok(), "expected {hint:?} to validate");
        }

        for hint in invalid {
            let mut params = good_params();
            params.login_hint = Some(hint.into());
            assert!(params.validate().is_err(), "expected {hint:?} to fail");
        }
    }

    #[test]
    fn passes_state_and_nonce_through() {
        let mut params = good_params();
        params.state = Some("abc123".into());
        params.nonce = Some("n-0S6_WzA2Mj".into());

        let request = params.validate().unwrap();
        assert_eq!(request.state.as_deref(), Some("abc123"));
        assert_eq!(request.nonce.as_deref(), Some("n-0S6_WzA2Mj"));
    }

    #[test]
    fn parse_form_accepts_a_valid_body() {
        let body = "scope=openid%20email&response_type=id_token\
                    &client_id=http%3A%2F%2Fexample.com\
                    &redirect_uri=http%3A%2F%2Fexample.com%2Fcb\
                    &login_hint=a%40example.com&nonce=xyz";
        let request = parse_form(body).unwrap();
        assert_eq!(request.login_hint, "a@example.com");
        assert_eq!(request.nonce.as_deref(), Some("xyz"));
    }

    #[test]
    fn semantic_errors_beat_transport_errors() {
        // Duplicate keys fail the strict parse, and the body is also
        // missing login_hint; the field-level error must win.
        let body = "scope=openid%20email&scope=other&response_type=id_token\
                    &client_id=http%3A%2F%2Fexample.com\
                    &redirect_uri=http%3A%2F%2Fexample.com%2Fcb";
        match parse_form(body) {
            Err(ProviderError::MissingField(name)) => assert_eq!(name, "login_hint"),
            other => panic!("expected MissingField(login_hint), got {other:?}"),
        }
    }

    #[test]
    fn transport_error_reported_when_fields_are_otherwise_fine() {
        let body = "scope=openid%20email&scope=openid%20email&response_type=id_token\
                    &client_id=http%3A%2F%2Fexample.com\
                    &redirect_uri=http%3A%2F%2Fexample.com%2Fcb\
                    &login_hint=a%40example.com";
        assert!(matches!(parse_form(body), Err(ProviderError::Transport(_))));
    }
}
