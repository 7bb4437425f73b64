//! Token endpoint client backed by reqwest.

use chrono::{Duration, Utc};
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use vectorctl_core::{
    AuthConfig, AuthError, Token, TokenError, TokenExchanger, TokenOperation,
};

use crate::CliResult;

const AUTHORIZATION_CODE_GRANT: &str = "authorization_code";
const REFRESH_TOKEN_GRANT: &str = "refresh_token";

/// Successful token endpoint payload.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    token_type: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    expires_in: i64,
    #[serde(default)]
    scope: String,
}

impl TokenResponse {
    /// Convert the payload into a token, computing the absolute expiry.
    fn into_token(self) -> vectorctl_core::Result<Token> {
        if self.access_token.is_empty() {
            return Err(AuthError::MissingAccessToken);
        }
        if !self.scope.is_empty() {
            debug!("token issued with scope: {}", self.scope);
        }
        let expiry = if self.expires_in > 0 {
            let expiry = Duration::try_seconds(self.expires_in)
                .and_then(|lifetime| Utc::now().checked_add_signed(lifetime));
            if expiry.is_none() {
                warn!("ignoring out of range expires_in: {}", self.expires_in);
            }
            expiry
        } else {
            None
        };
        let token_type = if self.token_type.is_empty() {
            "Bearer".to_string()
        } else {
            self.token_type
        };
        Ok(Token {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type,
            expiry,
        })
    }
}

/// Reqwest-backed token endpoint client.
#[derive(Clone, Debug)]
pub struct ReqwestExchanger {
    client: Client,
    config: AuthConfig,
}

impl ReqwestExchanger {
    /// Build a client for the configured provider.
    pub fn new(config: AuthConfig) -> CliResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("vectorctl/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }
}

impl TokenExchanger for ReqwestExchanger {
    fn exchange_code<'a>(
        &'a self,
        code: &'a str,
        verifier: &'a str,
        redirect_uri: &'a str,
    ) -> Pin<Box<dyn Future<Output = vectorctl_core::Result<Token>> + Send + 'a>> {
        Box::pin(async move {
            let form = [
                ("grant_type", AUTHORIZATION_CODE_GRANT),
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("code_verifier", verifier),
                ("redirect_uri", redirect_uri),
            ];
            post_token_form(
                &self.client,
                &self.config.token_url(),
                &form,
                TokenOperation::CodeExchange,
            )
            .await
        })
    }

    fn refresh<'a>(
        &'a self,
        refresh_token: &'a str,
        org_id: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = vectorctl_core::Result<Token>> + Send + 'a>> {
        Box::pin(async move {
            let mut form = vec![
                ("grant_type", REFRESH_TOKEN_GRANT),
                ("refresh_token", refresh_token),
                ("client_id", self.config.client_id.as_str()),
            ];
            if let Some(org_id) = org_id {
                form.push(("orgId", org_id));
            }
            if !self.config.audience.is_empty() {
                form.push(("audience", self.config.audience.as_str()));
            }
            post_token_form(
                &self.client,
                &self.config.token_url(),
                &form,
                TokenOperation::Refresh,
            )
            .await
        })
    }
}

/// POST a form to the token endpoint and decode the token bundle.
async fn post_token_form(
    client: &Client,
    token_url: &str,
    form: &[(&str, &str)],
    operation: TokenOperation,
) -> vectorctl_core::Result<Token> {
    debug!("token endpoint request: {operation}");
    let response = client
        .post(token_url)
        .header("Accept", "application/json")
        .form(form)
        .send()
        .await
        .map_err(|err| AuthError::Transport(err.to_string()))?;
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|err| AuthError::Transport(err.to_string()))?;
    if !status.is_success() {
        return Err(TokenError::from_response(status.as_u16(), &body, operation).into());
    }
    let payload: TokenResponse = serde_json::from_slice(&body)?;
    payload.into_token()
}
