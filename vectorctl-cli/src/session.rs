//! Commands that read or drop the stored session.

use chrono::SecondsFormat;
use log::debug;
use vectorctl_core::{Claims, SecretStore, Token, TokenExchanger, TokenManager};

use crate::CliResult;

const NOT_LOGGED_IN: &str = "Not logged in. Run `vectorctl login` to authenticate.";

/// `vectorctl whoami`
pub async fn run_whoami<S, E>(manager: &TokenManager<S, E>) -> CliResult<()>
where
    S: SecretStore,
    E: TokenExchanger,
{
    let token = manager.token().await?;
    println!("{}", render_whoami(&token));
    Ok(())
}

/// `vectorctl token`: print a valid access token for scripting.
pub async fn run_token<S, E>(manager: &TokenManager<S, E>) -> CliResult<()>
where
    S: SecretStore,
    E: TokenExchanger,
{
    println!("{}", current_access_token(manager).await?);
    Ok(())
}

/// `vectorctl logout`
pub async fn run_logout<S, E>(manager: &TokenManager<S, E>) -> CliResult<()>
where
    S: SecretStore,
    E: TokenExchanger,
{
    manager.logout().await?;
    println!("Logged out.");
    Ok(())
}

async fn current_access_token<S, E>(manager: &TokenManager<S, E>) -> CliResult<String>
where
    S: SecretStore,
    E: TokenExchanger,
{
    let token = manager.token().await?;
    if token.access_token.is_empty() {
        return Err(NOT_LOGGED_IN.into());
    }
    Ok(token.access_token)
}

fn render_whoami(token: &Token) -> String {
    if token.access_token.is_empty() {
        return NOT_LOGGED_IN.to_string();
    }
    let claims = Claims::decode_unverified(&token.access_token).unwrap_or_else(|err| {
        debug!("access token claims unavailable: {err}");
        Claims::default()
    });
    let expires = token
        .expiry
        .or(claims.expires_at)
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        "Email:        {}\nOrganization: {}\nScope:        {}\nExpires:      {}",
        or_unknown(&claims.email),
        claims.org().unwrap_or("none"),
        or_unknown(&claims.scope),
        expires,
    )
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() { "unknown" } else { value }
}
