//! `vectorctl login`: the authorization code flow with PKCE.

use clap::Args;
use log::{debug, info};
use std::time::Duration;
use vectorctl_callback::{CallbackListener, LOGIN_TIMEOUT};
use vectorctl_core::{
    AuthConfig, AuthError, AuthorizeRequest, Claims, CsrfState, PkcePair, SecretStore,
    TokenExchanger, TokenManager, build_authorize_url,
};

use crate::CliResult;
use crate::prompt::{AuthorizePrompt, TerminalPrompt};

/// Arguments for `vectorctl login`.
#[derive(Args, Clone, Debug, Default)]
pub struct LoginArgs {
    /// Organization to make active for this session.
    #[arg(long)]
    pub org_id: Option<String>,
}

/// Identity recorded by a successful login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Email from the new access token.
    pub email: String,
    /// Active organization from the new access token.
    pub org_id: Option<String>,
}

/// Run the interactive login and report who is now logged in.
pub async fn run_login<S, E>(
    manager: &TokenManager<S, E>,
    config: &AuthConfig,
    args: &LoginArgs,
) -> CliResult<()>
where
    S: SecretStore,
    E: TokenExchanger,
{
    let outcome = login_with(
        manager,
        config,
        args.org_id.as_deref(),
        &TerminalPrompt,
        LOGIN_TIMEOUT,
    )
    .await?;
    let email = if outcome.email.is_empty() {
        "unknown user"
    } else {
        outcome.email.as_str()
    };
    match outcome.org_id {
        Some(org) => println!("Logged in as {email}. Default organization: {org}."),
        None => println!("Logged in as {email}."),
    }
    Ok(())
}

/// Drive one login attempt.
///
/// The listener is bound before the URL is shown, so a busy port fails the
/// attempt before the user is sent to the browser. Nothing is written to the
/// store unless the code exchange succeeds.
pub(crate) async fn login_with<S, E>(
    manager: &TokenManager<S, E>,
    config: &AuthConfig,
    org_id: Option<&str>,
    prompt: &dyn AuthorizePrompt,
    timeout: Duration,
) -> CliResult<LoginOutcome>
where
    S: SecretStore,
    E: TokenExchanger,
{
    let pkce = PkcePair::generate()?;
    let state = CsrfState::generate()?;

    let listener = CallbackListener::bind(config, &state)?;
    let redirect_uri = config.redirect_uri_for_port(listener.port());
    let authorize_url = build_authorize_url(
        config,
        &AuthorizeRequest {
            state: state.as_str(),
            code_challenge: &pkce.challenge,
            redirect_uri: &redirect_uri,
            org_id,
        },
    );
    debug!("waiting for authorization redirect on {redirect_uri}");
    prompt.present(&authorize_url);

    let callback = listener.wait(timeout).await?;
    if callback.code.is_empty() {
        return Err(AuthError::AuthorizationDenied(callback.failure_reason()).into());
    }

    let token = manager
        .exchanger()
        .exchange_code(&callback.code, &pkce.verifier, &redirect_uri)
        .await?;
    manager.replace(token.clone()).await?;
    info!("login complete; token stored");

    let claims = Claims::decode_unverified(&token.access_token).unwrap_or_else(|err| {
        debug!("access token claims unavailable: {err}");
        Claims::default()
    });
    Ok(LoginOutcome {
        org_id: claims.org().map(str::to_string),
        email: claims.email,
    })
}
