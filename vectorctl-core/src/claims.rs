//! Informational claims read from an access token.
//!
//! The access token arrives directly from the identity provider over TLS, so
//! its payload is decoded without verifying the signature. Claims are only
//! used for display and to keep the active organization across refreshes.

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{AuthError, Result};

/// Claims carried by a vectorctl access token.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Claims {
    /// Authenticated user's email.
    pub email: String,
    /// Active organization id.
    pub org_id: String,
    /// Granted scopes, space separated.
    pub scope: String,
    /// Expiry from the `exp` claim.
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct RawClaims {
    #[serde(default, rename = "https://vectorctl.dev/email")]
    namespaced_email: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default, rename = "https://vectorctl.dev/orgId")]
    namespaced_org_id: Option<String>,
    #[serde(default, rename = "orgId")]
    org_id: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    // NumericDate may carry a fractional part.
    #[serde(default)]
    exp: Option<f64>,
}

/// Prefer the namespaced claim unless it is blank.
fn prefer(namespaced: Option<String>, plain: Option<String>) -> String {
    namespaced
        .filter(|value| !value.trim().is_empty())
        .or(plain)
        .unwrap_or_default()
}

impl Claims {
    /// Decode the payload segment of a JWT without verifying its signature.
    pub fn decode_unverified(token: &str) -> Result<Self> {
        let mut segments = token.split('.');
        let payload = match (segments.next(), segments.next(), segments.next()) {
            (Some(_), Some(payload), Some(_)) if !payload.is_empty() => payload,
            _ => return Err(AuthError::InvalidClaims("not a JWT".to_string())),
        };
        let bytes = general_purpose::URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|err| AuthError::InvalidClaims(format!("payload base64: {err}")))?;
        let raw: RawClaims = serde_json::from_slice(&bytes)
            .map_err(|err| AuthError::InvalidClaims(format!("payload json: {err}")))?;
        Ok(Self {
            email: prefer(raw.namespaced_email, raw.email),
            org_id: prefer(raw.namespaced_org_id, raw.org_id),
            scope: raw.scope.unwrap_or_default(),
            expires_at: raw
                .exp
                .filter(|exp| exp.is_finite())
                .and_then(|exp| DateTime::<Utc>::from_timestamp(exp.trunc() as i64, 0)),
        })
    }

    /// Organization id, if the token names one.
    pub fn org(&self) -> Option<&str> {
        let org = self.org_id.trim();
        if org.is_empty() { None } else { Some(org) }
    }
}

/// Build an unsigned JWT from a JSON payload, for tests in this workspace.
#[doc(hidden)]
pub fn unsigned_jwt(payload: &str) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let body = general_purpose::URL_SAFE_NO_PAD.encode(payload);
    format!("{header}.{body}.sig")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_namespaced_claims() {
        let jwt = unsigned_jwt(
            r#"{"https://vectorctl.dev/email":"pilot@example.com","https://vectorctl.dev/orgId":"org-1","scope":"openid email","exp":1700000000}"#,
        );
        let claims = Claims::decode_unverified(&jwt).expect("claims");
        assert_eq!(claims.email, "pilot@example.com");
        assert_eq!(claims.org(), Some("org-1"));
        assert_eq!(claims.scope, "openid email");
        assert_eq!(
            claims.expires_at.map(|at| at.timestamp()),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn decodes_plain_claim_names() {
        let jwt = unsigned_jwt(r#"{"email":"a@b.c","orgId":"org-2"}"#);
        let claims = Claims::decode_unverified(&jwt).expect("claims");
        assert_eq!(claims.email, "a@b.c");
        assert_eq!(claims.org_id, "org-2");
        assert_eq!(claims.expires_at, None);
    }

    #[test]
    fn namespaced_and_plain_claims_coexist() {
        let jwt = unsigned_jwt(
            r#"{"email":"plain@b.c","https://vectorctl.dev/email":"a@b.c","orgId":"org-plain","https://vectorctl.dev/orgId":"org-1"}"#,
        );
        let claims = Claims::decode_unverified(&jwt).expect("claims");
        assert_eq!(claims.email, "a@b.c");
        assert_eq!(claims.org(), Some("org-1"));
    }

    #[test]
    fn blank_namespaced_claim_falls_back_to_plain() {
        let jwt = unsigned_jwt(r#"{"email":"a@b.c","https://vectorctl.dev/email":""}"#);
        let claims = Claims::decode_unverified(&jwt).expect("claims");
        assert_eq!(claims.email, "a@b.c");
    }

    #[test]
    fn fractional_exp_is_truncated() {
        let jwt = unsigned_jwt(r#"{"https://vectorctl.dev/orgId":"org-1","exp":1700000000.5}"#);
        let claims = Claims::decode_unverified(&jwt).expect("claims");
        assert_eq!(claims.org(), Some("org-1"));
        assert_eq!(
            claims.expires_at.map(|at| at.timestamp()),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn blank_org_is_none() {
        let jwt = unsigned_jwt(r#"{"orgId":"  "}"#);
        let claims = Claims::decode_unverified(&jwt).expect("claims");
        assert_eq!(claims.org(), None);
    }

    #[test]
    fn rejects_non_jwt() {
        let err = Claims::decode_unverified("opaque-token").unwrap_err();
        assert!(err.to_string().contains("not a JWT"));
        let err = Claims::decode_unverified("a.!!!.c").unwrap_err();
        assert!(err.to_string().contains("base64"));
    }
}
