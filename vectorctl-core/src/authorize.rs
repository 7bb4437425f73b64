//! Authorize endpoint URL construction.

use crate::config::AuthConfig;
use crate::pkce::CHALLENGE_METHOD;

/// Per-attempt inputs for the authorize URL.
#[derive(Clone, Debug)]
pub struct AuthorizeRequest<'a> {
    /// CSRF state issued for this attempt.
    pub state: &'a str,
    /// PKCE challenge for this attempt.
    pub code_challenge: &'a str,
    /// Redirect URI the listener serves.
    pub redirect_uri: &'a str,
    /// Organization to log into, when the user asked for one.
    pub org_id: Option<&'a str>,
}

/// Build the full authorize URL for the browser.
pub fn build_authorize_url(config: &AuthConfig, request: &AuthorizeRequest<'_>) -> String {
    let scope = config.scope();
    let mut params: Vec<(&str, &str)> = vec![
        ("response_type", "code"),
        ("client_id", config.client_id.as_str()),
        ("redirect_uri", request.redirect_uri),
    ];
    if !config.audience.is_empty() {
        params.push(("audience", config.audience.as_str()));
    }
    params.push(("scope", scope.as_str()));
    params.push(("state", request.state));
    params.push(("code_challenge", request.code_challenge));
    params.push(("code_challenge_method", CHALLENGE_METHOD));
    if let Some(org_id) = request.org_id.map(str::trim).filter(|org| !org.is_empty()) {
        params.push(("orgId", org_id));
    }

    let query = params
        .into_iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{query}", config.authorize_url())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(org_id: Option<&'a str>) -> AuthorizeRequest<'a> {
        AuthorizeRequest {
            state: "state-123",
            code_challenge: "challenge-abc",
            redirect_uri: "http://127.0.0.1:59049/auth-callback",
            org_id,
        }
    }

    #[test]
    fn includes_all_pkce_parameters() {
        let url = build_authorize_url(&AuthConfig::default(), &request(None));
        assert!(url.starts_with("https://login.vectorctl.dev/oauth/authorize?response_type=code&"));
        assert!(url.contains("client_id=vectorctl-cli"));
        assert!(url.contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A59049%2Fauth-callback"));
        assert!(url.contains("audience=https%3A%2F%2Fapi.vectorctl.dev%2F"));
        assert!(url.contains("scope=openid%20profile%20email%20offline_access"));
        assert!(url.contains("state=state-123"));
        assert!(url.contains("code_challenge=challenge-abc"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(!url.contains("orgId"));
    }

    #[test]
    fn appends_org_hint_when_present() {
        let url = build_authorize_url(&AuthConfig::default(), &request(Some("org-42")));
        assert!(url.ends_with("&orgId=org-42"));
    }

    #[test]
    fn skips_blank_org_and_audience() {
        let config = AuthConfig {
            audience: String::new(),
            ..AuthConfig::default()
        };
        let url = build_authorize_url(&config, &request(Some("  ")));
        assert!(!url.contains("audience="));
        assert!(!url.contains("orgId"));
    }
}
